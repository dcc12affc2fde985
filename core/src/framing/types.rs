use std::fmt;
use num_enum::TryFromPrimitive;
use thiserror::Error;

use crate::constants::{CHECKSUM_LEN, FRAME_MAGIC, HEADER_LEN, RECORD_LEN};
use crate::utils::fmt_bytes;

/// Frame versions this decoder understands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
pub enum FrameVersion {
    V1 = 1,
}

impl FrameVersion {
    pub fn verify(raw: u8) -> Result<Self, FrameError> {
        Self::try_from_primitive(raw).map_err(|_| FrameError::UnsupportedVersion(raw))
    }
}

/// Which fixed-width field a value failed to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Timestamp,
    Value,
    Count,
}

impl RecordField {
    /// Wire type the field is encoded as.
    pub const fn wire_type(self) -> &'static str {
        match self {
            RecordField::Timestamp => "u32",
            RecordField::Value => "i16",
            RecordField::Count => "u32",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordField::Timestamp => "timestamp",
            RecordField::Value => "value",
            RecordField::Count => "record count",
        };
        f.write_str(name)
    }
}

/// A field value that does not fit its wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {value} does not fit {}", .field.wire_type())]
pub struct RangeError {
    pub field: RecordField,
    /// Offending value, widened so any input integer is reported exactly.
    pub value: i128,
}

/// One `(timestamp, value)` sample at its wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Record {
    pub timestamp: u32,
    pub value: i16,
}

impl Record {
    pub const LEN: usize = RECORD_LEN;

    pub const fn new(timestamp: u32, value: i16) -> Self {
        Self { timestamp, value }
    }

    /// Checked narrowing from wide integers.
    pub fn checked(timestamp: i64, value: i64) -> Result<Self, RangeError> {
        Self::checked_wide(i128::from(timestamp), i128::from(value))
    }

    /// Checked narrowing from the widest integer any [`RecordInt`] maps to.
    pub fn checked_wide(timestamp: i128, value: i128) -> Result<Self, RangeError> {
        let timestamp = u32::try_from(timestamp).map_err(|_| RangeError {
            field: RecordField::Timestamp,
            value: timestamp,
        })?;
        let value = i16::try_from(value).map_err(|_| RangeError {
            field: RecordField::Value,
            value,
        })?;
        Ok(Self { timestamp, value })
    }

    pub fn as_tuple(&self) -> (u32, i16) {
        (self.timestamp, self.value)
    }
}

impl From<Record> for (u32, i16) {
    fn from(r: Record) -> Self {
        r.as_tuple()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.timestamp, self.value)
    }
}

/// Primitive integers accepted as record fields.
///
/// Every implementor widens losslessly to `i128`; the narrowing to the wire
/// width is checked in [`Record::checked_wide`].
pub trait RecordInt: Copy {
    fn widen(self) -> i128;
}

macro_rules! impl_record_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl RecordInt for $t {
                #[inline]
                fn widen(self) -> i128 {
                    self as i128
                }
            }
        )*
    };
}

impl_record_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, i128);

/// Anything the encoder can turn into a [`Record`], with range checks.
///
/// Implemented for `Record` itself and for pairs of any [`RecordInt`]
/// (`(u32, i16)`, `(u64, i64)`, `(usize, i32)`, ...).
pub trait IntoRecord {
    fn into_record(self) -> Result<Record, RangeError>;
}

impl IntoRecord for Record {
    fn into_record(self) -> Result<Record, RangeError> {
        Ok(self)
    }
}

impl IntoRecord for &Record {
    fn into_record(self) -> Result<Record, RangeError> {
        Ok(*self)
    }
}

impl<T: RecordInt, V: RecordInt> IntoRecord for (T, V) {
    fn into_record(self) -> Result<Record, RangeError> {
        Record::checked_wide(self.0.widen(), self.1.widen())
    }
}

impl<T: RecordInt, V: RecordInt> IntoRecord for &(T, V) {
    fn into_record(self) -> Result<Record, RangeError> {
        Record::checked_wide(self.0.widen(), self.1.widen())
    }
}

/// Canonical frame header (fixed size)
///
/// All fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: [u8; 2],
    pub version: u8,
    /// Number of fixed-width records that follow.
    pub count: u32,
}

impl FrameHeader {
    pub const LEN: usize = HEADER_LEN;

    pub fn new(version: u8, count: u32) -> Self {
        Self { magic: FRAME_MAGIC, version, count }
    }

    /// Bytes occupied by the declared records.
    pub fn records_len(&self) -> Option<usize> {
        (self.count as usize).checked_mul(RECORD_LEN)
    }

    /// Total frame length implied by the header, checksum included.
    pub fn frame_len(&self) -> Option<usize> {
        self.records_len()?
            .checked_add(HEADER_LEN)?
            .checked_add(CHECKSUM_LEN)
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == FRAME_MAGIC
    }

    /// Human-readable one-liner, used by diagnostics.
    pub fn summary(&self) -> String {
        format!(
            "magic={} version={} count={}",
            fmt_bytes(&self.magic),
            self.version,
            self.count
        )
    }
}

/// A fully decoded, owned frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub records: Vec<Record>,
}

impl Frame {
    /// Re-encode with the same version byte.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        crate::framing::encode::pack_versioned(&self.records, self.header.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A record field (or the record count) does not fit its wire width.
    #[error("record {index}: {source}")]
    ValueOutOfRange { index: usize, source: RangeError },

    /// Fewer bytes than the header/trailer or the declared count require.
    #[error("truncated frame: need {need} bytes, have {have}")]
    TruncatedFrame { need: usize, have: usize },

    /// Stored CRC-32 differs from the one recomputed over the frame.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("bad magic: expected {}, got {}", fmt_bytes(.expected), fmt_bytes(.actual))]
    BadMagic { expected: [u8; 2], actual: [u8; 2] },

    #[error("unsupported frame version: {0}")]
    UnsupportedVersion(u8),

    /// Declared count above the reader's configured ceiling.
    #[error("record count {count} exceeds limit {max}")]
    RecordLimitExceeded { count: u32, max: u32 },
}
