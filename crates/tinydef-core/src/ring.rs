//! Circular view over a slice.

use std::ops::{Index, IndexMut};

use crate::math::circ_idx;

/// Treats a slice as a ring buffer: any signed index wraps into range.
///
/// `ring[-1]` is the last element, `ring[len]` the first.
#[derive(Debug)]
pub struct RingSlice<'a, T> {
    data: &'a mut [T],
}

impl<'a, T> RingSlice<'a, T> {
    /// Wrap `data`.
    pub fn new(data: &'a mut [T]) -> Self {
        Self { data }
    }

    /// Number of elements in one lap of the ring.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the ring has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at the wrapped index, or `None` for an empty ring.
    pub fn get(&self, i: i64) -> Option<&T> {
        if self.data.is_empty() {
            return None;
        }
        Some(&self.data[circ_idx(i, self.data.len())])
    }

    /// The underlying slice.
    pub fn as_slice(&self) -> &[T] {
        self.data
    }
}

impl<T> Index<i64> for RingSlice<'_, T> {
    type Output = T;

    fn index(&self, i: i64) -> &T {
        &self.data[circ_idx(i, self.data.len())]
    }
}

impl<T> IndexMut<i64> for RingSlice<'_, T> {
    fn index_mut(&mut self, i: i64) -> &mut T {
        let len = self.data.len();
        &mut self.data[circ_idx(i, len)]
    }
}
