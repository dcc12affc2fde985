use std::collections::VecDeque;
use std::ops::Deref;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A structural precondition failed before any input was read.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },
}

/// Owned snapshot of the most recent values, oldest first.
///
/// Each window is copied out of the generator's buffer when it is yielded,
/// so later iteration never changes a window the caller already holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    values: Box<[f64]>,
}

impl Window {
    pub(crate) fn snapshot(buf: &VecDeque<f64>) -> Self {
        Self {
            values: buf.iter().copied().collect(),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Arithmetic mean. Windows are never empty once yielded.
    pub fn mean(&self) -> f64 {
        self.sum() / self.values.len() as f64
    }

    /// Oldest value in the window.
    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    /// Newest value in the window.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values.into_vec()
    }
}

impl Deref for Window {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}

impl<const N: usize> PartialEq<[f64; N]> for Window {
    fn eq(&self, other: &[f64; N]) -> bool {
        self.values.as_ref() == other.as_slice()
    }
}
