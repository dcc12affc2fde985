//! Wire framing for PX record streams.
//!
//! Responsibilities:
//! - Define records, frame headers and errors
//! - Encode records into the canonical byte layout
//! - Decode frames with strict, validate-first checks
//!
//! Non-responsibilities:
//! - IO
//! - Windowing

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{
    Frame,
    FrameError,
    FrameHeader,
    FrameVersion,
    IntoRecord,
    RangeError,
    Record,
    RecordField,
    RecordInt,
};
pub use encode::{pack, pack_versioned, pack_with};
pub use decode::{decode_frame, iter_records, RecordIter, ValidatedFrame};
