//! Frame decoding.
//!
//! A blob moves through `Unvalidated -> SizeChecked -> ChecksumVerified ->
//! HeaderValidated` inside [`validate_frame`]; only then does [`iter_records`]
//! hand out a [`RecordIter`] (`Streaming -> Done`). Any failed check is
//! terminal and nothing has been yielded at that point.

use std::iter::FusedIterator;
use std::slice::ChunksExact;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::constants::{CHECKSUM_LEN, FRAME_MAGIC, HEADER_LEN, MIN_FRAME_LEN, RECORD_LEN};
use crate::framing::types::{Frame, FrameError, FrameHeader, FrameVersion, Record};
use crate::utils::compute_checksum;

/// Read the raw header fields at the front of `wire`.
///
/// No checksum, magic or version checks happen here; callers that trust
/// the result must run [`validate_frame`] on the whole blob.
#[inline]
pub fn parse_frame_header(wire: &[u8]) -> Result<FrameHeader, FrameError> {
    if wire.len() < FrameHeader::LEN {
        return Err(FrameError::TruncatedFrame {
            need: FrameHeader::LEN,
            have: wire.len(),
        });
    }

    let mut magic = [0u8; 2];
    magic.copy_from_slice(&wire[0..2]);
    let version = wire[2];
    let count = LittleEndian::read_u32(&wire[3..7]);

    Ok(FrameHeader { magic, version, count })
}

/// Run every integrity and header check on a complete blob.
///
/// Order matters: the checksum is verified before any header field is
/// trusted, so a corrupted magic byte reports `ChecksumMismatch`.
pub fn validate_frame(blob: &[u8]) -> Result<FrameHeader, FrameError> {
    // --- SizeChecked ---
    if blob.len() < MIN_FRAME_LEN {
        return Err(FrameError::TruncatedFrame {
            need: MIN_FRAME_LEN,
            have: blob.len(),
        });
    }

    // --- ChecksumVerified ---
    let (payload, trailer) = blob.split_at(blob.len() - CHECKSUM_LEN);
    let stored = LittleEndian::read_u32(trailer);
    let computed = compute_checksum(payload);
    if stored != computed {
        warn!(
            "frame checksum mismatch: stored {:#010x}, computed {:#010x} ({} bytes)",
            stored,
            computed,
            blob.len()
        );
        return Err(FrameError::ChecksumMismatch { stored, computed });
    }

    // --- HeaderValidated ---
    let header = parse_frame_header(payload)?;
    if !header.has_valid_magic() {
        return Err(FrameError::BadMagic {
            expected: FRAME_MAGIC,
            actual: header.magic,
        });
    }
    FrameVersion::verify(header.version)?;

    let records_end = header
        .records_len()
        .and_then(|n| n.checked_add(HEADER_LEN));
    match records_end {
        Some(end) if end <= payload.len() => {}
        _ => {
            return Err(FrameError::TruncatedFrame {
                need: header.frame_len().unwrap_or(usize::MAX),
                have: blob.len(),
            });
        }
    }

    Ok(header)
}

/// Validate `blob` and return a lazy iterator over its records.
///
/// All checks run before this returns; the iterator itself cannot fail.
pub fn iter_records(blob: &[u8]) -> Result<RecordIter<'_>, FrameError> {
    let header = validate_frame(blob)?;
    debug!("decoding frame: {} len={}", header.summary(), blob.len());
    Ok(RecordIter::over(blob, header))
}

/// Validate and fully materialise a frame.
pub fn decode_frame(blob: &[u8]) -> Result<Frame, FrameError> {
    let iter = iter_records(blob)?;
    let header = iter.header();
    Ok(Frame {
        header,
        records: iter.collect(),
    })
}

/// An owned blob that has passed [`validate_frame`].
///
/// Holding one means the checksum and header checks already ran, so
/// [`records`](ValidatedFrame::records) streams without repeating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFrame {
    header: FrameHeader,
    blob: Vec<u8>,
}

impl ValidatedFrame {
    pub fn new(blob: Vec<u8>) -> Result<Self, FrameError> {
        let header = validate_frame(&blob)?;
        Ok(Self { header, blob })
    }

    pub fn header(&self) -> FrameHeader {
        self.header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.blob
    }

    pub fn records(&self) -> RecordIter<'_> {
        RecordIter::over(&self.blob, self.header)
    }
}

#[inline]
fn decode_record(slot: &[u8]) -> Record {
    Record {
        timestamp: LittleEndian::read_u32(&slot[0..4]),
        value: LittleEndian::read_i16(&slot[4..6]),
    }
}

/// Lazy view over the records of a validated frame.
///
/// Borrows the blob read-only; each `next()` decodes one 6-byte slot.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    header: FrameHeader,
    slots: ChunksExact<'a, u8>,
}

impl<'a> RecordIter<'a> {
    /// `header` must be the result of `validate_frame(blob)`.
    fn over(blob: &'a [u8], header: FrameHeader) -> Self {
        let end = HEADER_LEN + header.count as usize * RECORD_LEN;
        Self {
            header,
            slots: blob[HEADER_LEN..end].chunks_exact(RECORD_LEN),
        }
    }

    /// Header of the frame being streamed.
    pub fn header(&self) -> FrameHeader {
        self.header
    }

    /// Records not yet yielded.
    pub fn remaining(&self) -> usize {
        self.slots.len()
    }

    pub fn is_done(&self) -> bool {
        self.slots.len() == 0
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.slots.next().map(decode_record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}

impl<'a> FusedIterator for RecordIter<'a> {}
