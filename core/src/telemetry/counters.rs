//! telemetry/counters.rs
//! Mutable counters collected while frames are packed, read and windowed.
//!
//! Converted into an immutable `TelemetrySnapshot` at the end of a run.
use bincode::{Decode, Encode};
use std::ops::AddAssign;

#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq)]
pub struct TelemetryCounters {
    pub frames_encoded: u64,
    pub frames_decoded: u64,
    pub records_encoded: u64,
    pub records_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub checksum_failures: u64,
    pub windows_emitted: u64,
}

impl TelemetryCounters {
    /// Record one packed frame.
    ///
    /// - `records`: record count written into the header
    /// - `frame_len`: total encoded length, checksum included
    pub fn add_encoded_frame(&mut self, records: usize, frame_len: usize) {
        self.frames_encoded += 1;
        self.records_encoded += records as u64;
        self.bytes_encoded += frame_len as u64;
    }

    /// Record one validated frame that was read back.
    pub fn add_decoded_frame(&mut self, records: usize, frame_len: usize) {
        self.frames_decoded += 1;
        self.records_decoded += records as u64;
        self.bytes_decoded += frame_len as u64;
    }

    pub fn add_checksum_failure(&mut self) {
        self.checksum_failures += 1;
    }

    pub fn add_windows(&mut self, n: usize) {
        self.windows_emitted += n as u64;
    }

    pub fn total_records(&self) -> u64 {
        self.records_encoded + self.records_decoded
    }

    // Per-run counters are merged at the end instead of shared.
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.frames_encoded += other.frames_encoded;
        self.frames_decoded += other.frames_decoded;
        self.records_encoded += other.records_encoded;
        self.records_decoded += other.records_decoded;
        self.bytes_encoded += other.bytes_encoded;
        self.bytes_decoded += other.bytes_decoded;
        self.checksum_failures += other.checksum_failures;
        self.windows_emitted += other.windows_emitted;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
