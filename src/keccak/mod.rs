//! Keccak-f\[1600\] state and the sponge construction built on it.

mod sponge;

pub use sponge::{absorb, absorb_multi, squeeze_blocks, Absorbing, Sponge, SpongeParams, Squeezing};

use core::marker::PhantomData;

use zeroize::Zeroize;

use crate::backend::{Backend, DefaultBackend};

/// Width of the permutation in bytes.
pub const STATE_BYTES: usize = 200;

/// 1600-bit Keccak state, 25 lanes of 64 bits.
///
/// Byte `i` of the sponge lives in lane `i / 8` at bit offset `8 * (i % 8)`.
pub struct KeccakState<B: Backend = DefaultBackend> {
    lanes: [u64; 25],
    _backend: PhantomData<B>,
}

impl<B: Backend> KeccakState<B> {
    pub const fn new() -> Self {
        Self {
            lanes: [0; 25],
            _backend: PhantomData,
        }
    }

    pub fn lanes(&self) -> &[u64; 25] {
        &self.lanes
    }

    /// Apply Keccak-f\[1600\] with the backend's permutation engine.
    #[inline]
    pub fn permute(&mut self) {
        B::keccak_f1600(&mut self.lanes);
    }

    /// XOR `bytes` into the state starting at byte `offset`.
    pub fn xor_bytes(&mut self, offset: usize, bytes: &[u8]) {
        debug_assert!(offset + bytes.len() <= STATE_BYTES);

        for (i, b) in (offset..).zip(bytes) {
            self.lanes[i >> 3] ^= (*b as u64) << (8 * (i & 7));
        }
    }

    /// Copy `out.len()` bytes out of the state starting at byte `offset`.
    pub fn extract_bytes(&self, offset: usize, out: &mut [u8]) {
        debug_assert!(offset + out.len() <= STATE_BYTES);

        for (i, b) in (offset..).zip(out.iter_mut()) {
            *b = (self.lanes[i >> 3] >> (8 * (i & 7))) as u8;
        }
    }

    pub fn reset(&mut self) {
        self.lanes = [0; 25];
    }
}

impl<B: Backend> Default for KeccakState<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Clone for KeccakState<B> {
    fn clone(&self) -> Self {
        Self {
            lanes: self.lanes,
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> Drop for KeccakState<B> {
    fn drop(&mut self) {
        self.lanes.zeroize();
    }
}
