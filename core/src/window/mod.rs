//! Lazy windowing over numeric sequences.
//!
//! Responsibilities:
//! - Fixed-width sliding windows with `O(k)` memory
//! - Moving averages derived from those windows
//!
//! Both generators validate their width eagerly and then pull input one
//! value at a time; neither is restartable.

pub mod types;
pub mod sliding;
pub mod average;

pub use types::{Window, WindowError};
pub use sliding::{sliding_window, SlidingWindow};
pub use average::{moving_average, MovingAverage};

/// Adapter methods on any iterator of values convertible to `f64`.
///
/// ```
/// use pxstream_core::window::WindowExt;
///
/// let avg: Vec<f64> = [1, 2, 3, 4].into_iter().moving_average(2).unwrap().collect();
/// assert_eq!(avg, vec![1.5, 2.5, 3.5]);
/// ```
pub trait WindowExt: Iterator + Sized {
    fn sliding_window(self, width: usize) -> Result<SlidingWindow<Self>, WindowError>
    where
        Self::Item: Into<f64>,
    {
        SlidingWindow::new(self, width)
    }

    fn moving_average(self, width: usize) -> Result<MovingAverage<Self>, WindowError>
    where
        Self::Item: Into<f64>,
    {
        MovingAverage::new(self, width)
    }
}

impl<I: Iterator> WindowExt for I {}
