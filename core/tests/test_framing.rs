// Coverage for the PX frame codec:
//
// * `pack` / `pack_versioned` / `pack_with`
// * `parse_frame_header`
// * `validate_frame`
// * `iter_records` / `decode_frame`

#[cfg(test)]
mod tests {
    use pxstream_core::constants::{CHECKSUM_LEN, FRAME_MAGIC, HEADER_LEN, MIN_FRAME_LEN, RECORD_LEN};
    use pxstream_core::framing::decode::{parse_frame_header, validate_frame};
    use pxstream_core::framing::encode::{append_checksum, encode_header};
    use pxstream_core::framing::{
        decode_frame, iter_records, pack, pack_versioned, FrameError, FrameHeader, RangeError,
        Record, RecordField, ValidatedFrame,
    };

    fn sample() -> Vec<(i64, i64)> {
        vec![(1, 120), (2, -50), (3, 999), (4, 0)]
    }

    /// Rewrite part of a frame body and recompute the trailer so only the
    /// header/length checks can reject it.
    fn resealed(blob: &[u8], edit: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut body = blob[..blob.len() - CHECKSUM_LEN].to_vec();
        edit(&mut body);
        append_checksum(&mut body);
        body
    }

// # 1. Canonical scenario round-trips in order

    #[test]
    fn sample_records_roundtrip() {
        let blob = pack(sample()).unwrap();
        let decoded: Vec<(u32, i16)> = iter_records(&blob)
            .unwrap()
            .map(|r| r.as_tuple())
            .collect();

        assert_eq!(decoded, vec![(1, 120), (2, -50), (3, 999), (4, 0)]);
    }

    #[test]
    fn sample_wire_layout_is_exact() {
        let blob = pack(sample()).unwrap();

        assert_eq!(blob.len(), HEADER_LEN + 4 * RECORD_LEN + CHECKSUM_LEN);
        assert_eq!(&blob[0..2], b"PX");
        assert_eq!(blob[2], 1);
        assert_eq!(&blob[3..7], &[4, 0, 0, 0]);
        // (1, 120)
        assert_eq!(&blob[7..13], &[1, 0, 0, 0, 120, 0]);
        // (2, -50): i16 little-endian 0xFFCE
        assert_eq!(&blob[13..19], &[2, 0, 0, 0, 0xCE, 0xFF]);

        let crc = crc32fast::hash(&blob[..blob.len() - 4]);
        assert_eq!(&blob[blob.len() - 4..], &crc.to_le_bytes());
    }

    #[test]
    fn pack_is_deterministic() {
        assert_eq!(pack(sample()).unwrap(), pack(sample()).unwrap());
        assert_eq!(pack_versioned(sample(), 1).unwrap(), pack(sample()).unwrap());
    }

    #[test]
    fn accepts_records_and_narrow_pairs() {
        let as_records: Vec<Record> = sample()
            .into_iter()
            .map(|(t, v)| Record::checked(t, v).unwrap())
            .collect();
        let as_narrow: Vec<(u32, i16)> = vec![(1, 120), (2, -50), (3, 999), (4, 0)];

        let a = pack(&as_records).unwrap();
        let b = pack(as_narrow.iter()).unwrap();
        let c = pack(vec![(1, 120), (2, -50), (3, 999), (4, 0)]).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

// # 2. Empty frames

    #[test]
    fn empty_frame_is_header_plus_trailer() {
        let blob = pack(Vec::<Record>::new()).unwrap();
        assert_eq!(blob.len(), MIN_FRAME_LEN);

        let mut iter = iter_records(&blob).unwrap();
        assert_eq!(iter.header().count, 0);
        assert!(iter.is_done());
        assert_eq!(iter.next(), None);
    }

// # 3. Encode-time range checks

    #[test]
    fn bounds_are_inclusive() {
        let blob = pack(vec![(0i64, -32768i64), (u32::MAX as i64, 32767)]).unwrap();
        let records: Vec<Record> = iter_records(&blob).unwrap().collect();

        assert_eq!(records, vec![Record::new(0, i16::MIN), Record::new(u32::MAX, i16::MAX)]);
    }

    #[test]
    fn negative_timestamp_is_rejected_with_index() {
        let err = pack(vec![(0i64, 0i64), (-1, 0)]).unwrap_err();
        assert_eq!(
            err,
            FrameError::ValueOutOfRange {
                index: 1,
                source: RangeError { field: RecordField::Timestamp, value: -1 },
            }
        );
    }

    #[test]
    fn oversized_timestamp_is_rejected() {
        let err = pack(vec![(1i64 << 32, 0i64)]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ValueOutOfRange {
                index: 0,
                source: RangeError { field: RecordField::Timestamp, .. },
            }
        ));
    }

    #[test]
    fn value_outside_i16_is_rejected() {
        for bad in [32768i64, -32769] {
            let err = pack(vec![(5i64, 1i64), (6, 2), (7, bad)]).unwrap_err();
            assert_eq!(
                err,
                FrameError::ValueOutOfRange {
                    index: 2,
                    source: RangeError { field: RecordField::Value, value: i128::from(bad) },
                }
            );
        }
    }

    #[test]
    fn wide_and_pointer_sized_pairs_are_checked() {
        let narrow = pack(vec![(1u32, 120i16), (2, -50)]).unwrap();

        assert_eq!(pack(vec![(1u64, 120i64), (2, -50)]).unwrap(), narrow);
        assert_eq!(pack(vec![(1usize, 120isize), (2, -50)]).unwrap(), narrow);
        assert_eq!(pack(vec![(1i128, 120u8 as i128), (2, -50)]).unwrap(), narrow);

        let err = pack(vec![(u64::MAX, 0i64)]).unwrap_err();
        assert_eq!(
            err,
            FrameError::ValueOutOfRange {
                index: 0,
                source: RangeError { field: RecordField::Timestamp, value: i128::from(u64::MAX) },
            }
        );

        let err = pack(vec![(0usize, 0u8), (1usize << 40, 0u8)]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::ValueOutOfRange {
                index: 1,
                source: RangeError { field: RecordField::Timestamp, .. },
            }
        ));

        let err = pack(vec![(0u64, i128::MIN)]).unwrap_err();
        assert_eq!(err.to_string(), format!("record 0: value {} does not fit i16", i128::MIN));
    }

    #[test]
    fn range_error_message_names_field() {
        let err = pack(vec![(0i64, 40_000i64)]).unwrap_err();
        assert_eq!(err.to_string(), "record 0: value 40000 does not fit i16");
    }

// # 4. Checksum is verified first

    #[test]
    fn single_bit_flips_in_every_field_are_detected() {
        let blob = pack(sample()).unwrap();

        // magic, version, count, a timestamp, a value, the checksum itself
        for offset in [0, 1, 2, 3, 6, 7, 11, 12, blob.len() - 1] {
            for bit in 0..8 {
                let mut corrupt = blob.clone();
                corrupt[offset] ^= 1 << bit;
                assert!(
                    matches!(iter_records(&corrupt), Err(FrameError::ChecksumMismatch { .. })),
                    "offset {offset} bit {bit} not detected"
                );
            }
        }
    }

    #[test]
    fn checksum_mismatch_reports_both_values() {
        let mut blob = pack(sample()).unwrap();
        let n = blob.len();
        blob[n - 1] ^= 0xFF;

        match iter_records(&blob) {
            Err(FrameError::ChecksumMismatch { stored, computed }) => {
                assert_ne!(stored, computed);
                assert_eq!(computed, crc32fast::hash(&blob[..n - 4]));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

// # 5. Magic and version gating

    #[test]
    fn bad_magic_is_rejected() {
        let blob = resealed(&pack(sample()).unwrap(), |b| b[0..2].copy_from_slice(b"QX"));

        match iter_records(&blob) {
            Err(FrameError::BadMagic { expected, actual }) => {
                assert_eq!(expected, FRAME_MAGIC);
                assert_eq!(&actual, b"QX");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn bad_magic_message_is_readable() {
        let blob = resealed(&pack(sample()).unwrap(), |b| b[0..2].copy_from_slice(&[0, 0xFF]));
        let err = iter_records(&blob).unwrap_err();
        assert_eq!(err.to_string(), "bad magic: expected b\"PX\", got 0x00ff");
    }

    #[test]
    fn unsupported_versions_are_rejected() {
        let blob = pack(sample()).unwrap();
        for v in [0u8, 2, 7, 255] {
            let edited = resealed(&blob, |b| b[2] = v);
            assert!(matches!(
                iter_records(&edited),
                Err(FrameError::UnsupportedVersion(got)) if got == v
            ));
        }
    }

    #[test]
    fn encoder_writes_any_version_decoder_gates_it() {
        let blob = pack_versioned(sample(), 2).unwrap();
        assert_eq!(blob[2], 2);
        assert_eq!(iter_records(&blob).unwrap_err(), FrameError::UnsupportedVersion(2));
    }

// # 6. Truncation

    #[test]
    fn shorter_than_empty_frame_is_truncated() {
        let blob = pack(sample()).unwrap();
        for len in 0..MIN_FRAME_LEN {
            assert_eq!(
                iter_records(&blob[..len]).unwrap_err(),
                FrameError::TruncatedFrame { need: MIN_FRAME_LEN, have: len }
            );
        }
    }

    #[test]
    fn count_larger_than_body_is_truncated() {
        let blob = pack(sample()).unwrap();
        // Drop the last record but keep count = 4, then re-checksum.
        let edited = resealed(&blob, |b| b.truncate(b.len() - RECORD_LEN));

        assert_eq!(
            iter_records(&edited).unwrap_err(),
            FrameError::TruncatedFrame { need: blob.len(), have: blob.len() - RECORD_LEN }
        );
    }

    #[test]
    fn huge_declared_count_is_truncated_not_panicking() {
        let header = encode_header(&FrameHeader::new(1, u32::MAX));
        let mut blob = header.to_vec();
        append_checksum(&mut blob);

        assert!(matches!(
            iter_records(&blob),
            Err(FrameError::TruncatedFrame { have: MIN_FRAME_LEN, .. })
        ));
    }

    #[test]
    fn trailing_bytes_before_checksum_are_ignored() {
        let blob = pack(sample()).unwrap();
        let padded = resealed(&blob, |b| b.extend_from_slice(&[0xAA, 0xBB]));

        let records: Vec<Record> = iter_records(&padded).unwrap().collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3], Record::new(4, 0));
    }

// # 7. Laziness and iterator contract

    #[test]
    fn records_are_yielded_one_at_a_time() {
        let blob = pack(sample()).unwrap();
        let mut iter = iter_records(&blob).unwrap();

        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(Record::new(1, 120)));
        assert_eq!(iter.next(), Some(Record::new(2, -50)));
        assert_eq!(iter.remaining(), 2);
        assert!(!iter.is_done());

        assert_eq!(iter.by_ref().count(), 2);
        assert!(iter.is_done());
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn decoding_does_not_mutate_input() {
        let blob = pack(sample()).unwrap();
        let before = blob.clone();
        let _ = iter_records(&blob).unwrap().count();
        assert_eq!(blob, before);
    }

// # 8. Owned frames and raw headers

    #[test]
    fn decode_frame_then_encode_is_identity() {
        let blob = pack(sample()).unwrap();
        let frame = decode_frame(&blob).unwrap();

        assert_eq!(frame.header, FrameHeader::new(1, 4));
        assert_eq!(frame.records.len(), 4);
        assert_eq!(frame.encode().unwrap(), blob);
    }

    #[test]
    fn validated_frame_matches_iter_records() {
        let blob = pack(sample()).unwrap();
        let frame = ValidatedFrame::new(blob.clone()).unwrap();

        assert_eq!(frame.header(), iter_records(&blob).unwrap().header());
        assert!(frame.records().eq(iter_records(&blob).unwrap()));
    }

    #[test]
    fn validated_frame_refuses_corrupt_blob() {
        let mut blob = pack(sample()).unwrap();
        blob[9] ^= 0x01;

        assert!(matches!(
            ValidatedFrame::new(blob),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn parse_frame_header_reads_raw_fields() {
        let blob = pack_versioned(sample(), 9).unwrap();
        let header = parse_frame_header(&blob).unwrap();

        assert_eq!(header.magic, FRAME_MAGIC);
        assert_eq!(header.version, 9);
        assert_eq!(header.count, 4);
        assert_eq!(header.frame_len(), Some(blob.len()));
        assert!(matches!(
            parse_frame_header(&blob[..HEADER_LEN - 1]),
            Err(FrameError::TruncatedFrame { need: HEADER_LEN, .. })
        ));
    }

    #[test]
    fn validate_frame_returns_header() {
        let blob = pack(sample()).unwrap();
        assert_eq!(validate_frame(&blob).unwrap(), FrameHeader::new(1, 4));
    }
}
