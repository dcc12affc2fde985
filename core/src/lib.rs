//! pxstream-core
//!
//! Lazy, bounded-memory processing of numeric sequences:
//! - `framing`: the PX record frame (header, fixed-width records, CRC-32)
//! - `window`: sliding windows and moving averages
//! - `io`: moving whole frames across `Read`/`Write`
//! - `telemetry`: counters, stage timers, snapshots

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;
pub mod types;
pub mod utils;

pub mod framing;
pub mod window;
pub mod io;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{FrameOptions, ReadLimits};
    pub use crate::framing::{
        decode_frame, iter_records, pack, pack_versioned, pack_with, Frame, FrameError,
        FrameHeader, IntoRecord, Record, RecordIter, ValidatedFrame,
    };
    pub use crate::types::StreamError;
    pub use crate::window::{moving_average, sliding_window, Window, WindowError, WindowExt};
}
