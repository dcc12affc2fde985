//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for codec runs.
//!
//! The codec functions stay pure; callers that want numbers thread a
//! `TelemetryCounters` and a `TelemetryTimer` through their own loop.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
