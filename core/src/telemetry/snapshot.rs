use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

/// Immutable end-of-run view of counters and timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub frames_encoded: u64,
    pub frames_decoded: u64,
    pub records_encoded: u64,
    pub records_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub checksum_failures: u64,
    pub windows_emitted: u64,
    /// Framing bytes (header + checksum) per encoded record byte.
    pub overhead_ratio: f64,
    pub throughput_records_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        use crate::constants::{MIN_FRAME_LEN, RECORD_LEN};

        let elapsed = timer.elapsed();

        let record_bytes = counters.records_encoded * RECORD_LEN as u64;
        let overhead_ratio = if record_bytes > 0 {
            (counters.frames_encoded * MIN_FRAME_LEN as u64) as f64 / record_bytes as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.total_records() as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            frames_encoded: counters.frames_encoded,
            frames_decoded: counters.frames_decoded,
            records_encoded: counters.records_encoded,
            records_decoded: counters.records_decoded,
            bytes_encoded: counters.bytes_encoded,
            bytes_decoded: counters.bytes_decoded,
            checksum_failures: counters.checksum_failures,
            windows_emitted: counters.windows_emitted,
            overhead_ratio,
            throughput_records_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    /// Internal invariants:
    /// - stage times never exceed the wall clock
    /// - encoded bytes cover at least the fixed framing of each frame
    pub fn sanity_check(&self) -> bool {
        use crate::constants::MIN_FRAME_LEN;

        self.total_stage_time() <= self.elapsed
            && self.bytes_encoded >= self.frames_encoded * MIN_FRAME_LEN as u64
            && self.bytes_decoded >= self.frames_decoded * MIN_FRAME_LEN as u64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
