//! config.rs
//! Caller-tunable options for encoding and reading frames.
//!
//! Design notes:
//! - Wire constants stay in `constants.rs`; only knobs a caller may change live here.
//! - Every struct has a `Default` matching the canonical format.

use crate::constants::{DEFAULT_MAX_RECORDS, FRAME_VERSION};

/// Options applied by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// Version byte written into the header. The encoder does not gate this;
    /// only the decoder restricts which versions it accepts.
    pub version: u8,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self { version: FRAME_VERSION }
    }
}

impl FrameOptions {
    pub fn with_version(version: u8) -> Self {
        Self { version }
    }
}

/// Limits applied when a frame is pulled from a reader of unknown origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Largest declared record count the reader will allocate for.
    pub max_records: u32,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self { max_records: DEFAULT_MAX_RECORDS }
    }
}

impl ReadLimits {
    /// No ceiling beyond what the `u32` count field can express.
    pub fn unbounded() -> Self {
        Self { max_records: u32::MAX }
    }
}
