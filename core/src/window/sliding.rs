use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::window::types::{Window, WindowError};

/// Largest buffer reserved up front; wider windows grow as input arrives.
const PREALLOC_LIMIT: usize = 1024;

/// Check the width eagerly so a bad `k` surfaces before iteration starts.
pub(crate) fn check_width(width: usize) -> Result<(), WindowError> {
    if width == 0 {
        return Err(WindowError::InvalidParameter {
            name: "k",
            value: width,
            reason: "window width must be > 0",
        });
    }
    Ok(())
}

/// Sliding windows of fixed width over any numeric sequence.
///
/// - Holds at most `width` values (FIFO).
/// - Yields the first window when the buffer fills, then one per input value.
/// - An input of length `n` gives `max(0, n - width + 1)` windows.
/// - Works over unbounded input; memory stays `O(width)`.
pub fn sliding_window<I>(seq: I, width: usize) -> Result<SlidingWindow<I::IntoIter>, WindowError>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    SlidingWindow::new(seq.into_iter(), width)
}

#[derive(Debug, Clone)]
pub struct SlidingWindow<I> {
    inner: I,
    width: usize,
    buf: VecDeque<f64>,
}

impl<I> SlidingWindow<I>
where
    I: Iterator,
    I::Item: Into<f64>,
{
    pub fn new(inner: I, width: usize) -> Result<Self, WindowError> {
        check_width(width)?;
        Ok(Self {
            inner,
            width,
            buf: VecDeque::with_capacity(width.min(PREALLOC_LIMIT)),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl<I> Iterator for SlidingWindow<I>
where
    I: Iterator,
    I::Item: Into<f64>,
{
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        loop {
            let x: f64 = self.inner.next()?.into();
            if self.buf.len() == self.width {
                self.buf.pop_front();
            }
            self.buf.push_back(x);
            if self.buf.len() == self.width {
                return Some(Window::snapshot(&self.buf));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.inner.size_hint();
        // Values still missing before the next window can be emitted, minus one.
        let deficit = (self.width - self.buf.len()).saturating_sub(1);
        (lo.saturating_sub(deficit), hi.map(|h| h.saturating_sub(deficit)))
    }
}

impl<I> FusedIterator for SlidingWindow<I>
where
    I: FusedIterator,
    I::Item: Into<f64>,
{
}
