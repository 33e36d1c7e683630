//! Flat, fixed-size bit set.

use std::ops::Index;

/// A bit set of `BYTES * 8` bits stored inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitSet<const BYTES: usize> {
    data: [u8; BYTES],
}

impl<const BYTES: usize> BitSet<BYTES> {
    /// Number of addressable bits.
    pub const BITS: usize = BYTES * 8;

    /// An all-clear bit set.
    pub const fn new() -> Self {
        Self { data: [0; BYTES] }
    }

    /// Clear every bit.
    pub fn reset(&mut self) {
        self.data = [0; BYTES];
    }

    /// Set bit `i` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= BITS`.
    pub fn set(&mut self, i: usize, value: bool) {
        let (byte, mask) = Self::locate(i);
        if value {
            self.data[byte] |= mask;
        } else {
            self.data[byte] &= !mask;
        }
    }

    /// Value of bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= BITS`.
    pub fn get(&self, i: usize) -> bool {
        let (byte, mask) = Self::locate(i);
        self.data[byte] & mask != 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.data.iter().map(|b| b.count_ones()).sum()
    }

    /// Raw little-endian bit storage.
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.data
    }

    fn locate(i: usize) -> (usize, u8) {
        assert!(i < Self::BITS, "bit {i} out of range for {} bits", Self::BITS);
        (i / 8, 1 << (i % 8))
    }
}

impl<const BYTES: usize> Default for BitSet<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const BYTES: usize> Index<usize> for BitSet<BYTES> {
    type Output = bool;

    fn index(&self, i: usize) -> &bool {
        if self.get(i) {
            &true
        } else {
            &false
        }
    }
}
