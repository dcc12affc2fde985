use std::io;
use thiserror::Error;

use crate::framing::FrameError;
use crate::window::WindowError;

/// Unified error covering I/O, framing and windowing.
/// - `From<T>` impls enable `?` across the io layer and adapters.
/// - Messages aim to be stable and contextual for logs.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("window error: {0}")]
    Window(#[from] WindowError),
}

impl StreamError {
    /// The framing error underneath, if any.
    pub fn as_frame_error(&self) -> Option<&FrameError> {
        match self {
            StreamError::Frame(e) => Some(e),
            _ => None,
        }
    }
}
