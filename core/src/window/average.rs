use std::iter::FusedIterator;

use crate::window::sliding::SlidingWindow;
use crate::window::types::WindowError;

/// Streaming moving average: the mean of each sliding window, in order.
///
/// Delegates the width check to [`SlidingWindow`], so `k == 0` fails here
/// too, before any input is read.
pub fn moving_average<I>(seq: I, width: usize) -> Result<MovingAverage<I::IntoIter>, WindowError>
where
    I: IntoIterator,
    I::Item: Into<f64>,
{
    MovingAverage::new(seq.into_iter(), width)
}

#[derive(Debug, Clone)]
pub struct MovingAverage<I> {
    windows: SlidingWindow<I>,
}

impl<I> MovingAverage<I>
where
    I: Iterator,
    I::Item: Into<f64>,
{
    pub fn new(inner: I, width: usize) -> Result<Self, WindowError> {
        Ok(Self {
            windows: SlidingWindow::new(inner, width)?,
        })
    }

    pub fn width(&self) -> usize {
        self.windows.width()
    }
}

impl<I> Iterator for MovingAverage<I>
where
    I: Iterator,
    I::Item: Into<f64>,
{
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.windows.next().map(|w| w.mean())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl<I> FusedIterator for MovingAverage<I>
where
    I: FusedIterator,
    I::Item: Into<f64>,
{
}
