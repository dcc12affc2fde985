use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::config::FrameOptions;
use crate::constants::{CHECKSUM_LEN, DEFAULT_MAX_RECORDS, HEADER_LEN, RECORD_LEN};
use crate::framing::types::{FrameError, FrameHeader, IntoRecord, RangeError, Record, RecordField};
use crate::utils::compute_checksum;

/// Encode a header into its canonical 7-byte wire form.
///
/// Layout:
///
/// ```text
/// [ magic (2) ]
/// [ version (1) ]
/// [ count (4) ]
/// ```
pub fn encode_header(header: &FrameHeader) -> [u8; HEADER_LEN] {
    let mut out = [0u8; HEADER_LEN];
    out[0..2].copy_from_slice(&header.magic);
    out[2] = header.version;
    LittleEndian::write_u32(&mut out[3..7], header.count);
    out
}

#[inline]
fn put_record(out: &mut Vec<u8>, record: &Record) {
    let mut slot = [0u8; RECORD_LEN];
    LittleEndian::write_u32(&mut slot[0..4], record.timestamp);
    LittleEndian::write_i16(&mut slot[4..6], record.value);
    out.extend_from_slice(&slot);
}

/// Append the CRC-32 of everything already in `buf` as a little-endian trailer.
pub fn append_checksum(buf: &mut Vec<u8>) {
    let crc = compute_checksum(buf);
    let mut trailer = [0u8; CHECKSUM_LEN];
    LittleEndian::write_u32(&mut trailer, crc);
    buf.extend_from_slice(&trailer);
}

/// Pack records into a version-1 frame.
pub fn pack<I>(records: I) -> Result<Vec<u8>, FrameError>
where
    I: IntoIterator,
    I::Item: IntoRecord,
{
    pack_with(records, &FrameOptions::default())
}

/// Pack records with an explicit version byte.
pub fn pack_versioned<I>(records: I, version: u8) -> Result<Vec<u8>, FrameError>
where
    I: IntoIterator,
    I::Item: IntoRecord,
{
    pack_with(records, &FrameOptions::with_version(version))
}

/// Pack records into a complete frame: header, fixed-width records, CRC-32.
///
/// Every record is range-checked as it is reached. The first failure aborts
/// the whole call; no partial frame is ever returned.
///
/// Output is deterministic: equal records and options give identical bytes.
pub fn pack_with<I>(records: I, opts: &FrameOptions) -> Result<Vec<u8>, FrameError>
where
    I: IntoIterator,
    I::Item: IntoRecord,
{
    let iter = records.into_iter();
    let (hint, _) = iter.size_hint();
    let hint = hint.min(DEFAULT_MAX_RECORDS as usize);

    let mut out = Vec::with_capacity(HEADER_LEN + hint * RECORD_LEN + CHECKSUM_LEN);
    // Header is written once the count is known.
    out.resize(HEADER_LEN, 0);

    let mut count: u32 = 0;
    for (index, item) in iter.enumerate() {
        let record = item
            .into_record()
            .map_err(|source| FrameError::ValueOutOfRange { index, source })?;

        count = count.checked_add(1).ok_or(FrameError::ValueOutOfRange {
            index,
            source: RangeError {
                field: RecordField::Count,
                value: index as i128 + 1,
            },
        })?;

        put_record(&mut out, &record);
    }

    let header = FrameHeader::new(opts.version, count);
    out[..HEADER_LEN].copy_from_slice(&encode_header(&header));
    append_checksum(&mut out);

    debug_assert_eq!(Some(out.len()), header.frame_len());
    debug!("packed frame: {} len={}", header.summary(), out.len());

    Ok(out)
}
