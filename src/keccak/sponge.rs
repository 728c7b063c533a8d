use core::{fmt, marker::PhantomData, mem};

use super::KeccakState;
use crate::backend::{Backend, DefaultBackend};

/// Fixed parameterization of the sponge: rate in bytes and domain separation byte.
pub trait SpongeParams {
    const RATE: usize;
    const DOMAIN: u8;
}

/// Absorb the whole of `msg` into a fresh state and pad it.
///
/// The state is zeroed first. Full blocks are XORed in and permuted, the
/// final partial block gets `domain` right after the message and `0x80` in
/// its last byte. No permutation follows the padding, the first squeeze
/// performs it.
pub fn absorb<B: Backend>(state: &mut KeccakState<B>, rate: usize, msg: &[u8], domain: u8) {
    state.reset();

    let mut blocks = msg.chunks_exact(rate);
    for block in blocks.by_ref() {
        state.xor_bytes(0, block);
        state.permute();
    }

    let tail = blocks.remainder();
    state.xor_bytes(0, tail);
    pad(state, rate, tail.len(), domain);
}

/// Like [`absorb`], for a message given as consecutive parts.
pub fn absorb_multi<B: Backend>(
    state: &mut KeccakState<B>,
    rate: usize,
    parts: &[&[u8]],
    domain: u8,
) {
    state.reset();

    let pos = parts
        .iter()
        .fold(0, |pos, part| absorb_at(state, rate, pos, part));

    pad(state, rate, pos, domain);
}

/// Permute and extract `rate` bytes for every block of `out`.
///
/// `out.len()` must be a multiple of `rate`.
pub fn squeeze_blocks<B: Backend>(state: &mut KeccakState<B>, rate: usize, out: &mut [u8]) {
    debug_assert_eq!(out.len() % rate, 0);

    for block in out.chunks_exact_mut(rate) {
        state.permute();
        state.extract_bytes(0, block);
    }
}

/// XOR `input` into the state with `pos` bytes of the current block already
/// filled, permuting whenever a block is completed. Returns the new fill level.
fn absorb_at<B: Backend>(
    state: &mut KeccakState<B>,
    rate: usize,
    mut pos: usize,
    mut input: &[u8],
) -> usize {
    while pos + input.len() >= rate {
        let (block, rest) = input.split_at(rate - pos);
        state.xor_bytes(pos, block);
        state.permute();

        input = rest;
        pos = 0;
    }

    state.xor_bytes(pos, input);

    pos + input.len()
}

fn pad<B: Backend>(state: &mut KeccakState<B>, rate: usize, pos: usize, domain: u8) {
    state.xor_bytes(pos, &[domain]);
    state.xor_bytes(rate - 1, &[0x80]);
}

/// Incremental sponge that still accepts input.
pub struct Absorbing;

/// Incremental sponge that has been padded and produces output.
pub struct Squeezing;

/// Incremental sponge context.
///
/// `Sponge<P, Absorbing>` accepts input through [`Sponge::absorb`];
/// [`Sponge::finalize`] pads it and turns it into a `Sponge<P, Squeezing>`
/// that only produces output. Squeezing before finalizing, or absorbing after,
/// does not type check.
///
/// `pos` counts the bytes of the current block that were absorbed but not yet
/// permuted while absorbing, and the bytes of the last squeezed block that
/// were not yet handed out while squeezing. It stays below the rate.
///
/// `initial` is the state absorbing started from, all zero for plain sponges
/// and the absorbed preamble for customized ones. [`Sponge::reset`] goes back
/// to it.
pub struct Sponge<P: SpongeParams, S = Absorbing, B: Backend = DefaultBackend> {
    state: KeccakState<B>,
    initial: KeccakState<B>,
    pos: usize,
    domain: u8,
    _marker: PhantomData<(P, S)>,
}

impl<P: SpongeParams, B: Backend> Sponge<P, Absorbing, B> {
    pub fn init() -> Self {
        Self::with_domain(KeccakState::new(), P::DOMAIN)
    }

    /// Start from a prepared state with a different padding byte.
    pub(crate) fn with_domain(state: KeccakState<B>, domain: u8) -> Self {
        Self {
            initial: state.clone(),
            state,
            pos: 0,
            domain,
            _marker: PhantomData,
        }
    }

    pub fn absorb(&mut self, input: &[u8]) {
        self.pos = absorb_at(&mut self.state, P::RATE, self.pos, input);
    }

    pub fn absorb_multi(&mut self, parts: &[&[u8]]) {
        for part in parts {
            self.absorb(part);
        }
    }

    /// Apply padding and switch to squeezing.
    pub fn finalize(mut self) -> Sponge<P, Squeezing, B> {
        pad(&mut self.state, P::RATE, self.pos, self.domain);

        Sponge {
            state: self.state,
            initial: self.initial,
            pos: 0,
            domain: self.domain,
            _marker: PhantomData,
        }
    }
}

impl<P: SpongeParams, B: Backend> Sponge<P, Squeezing, B> {
    /// Fill `out`, continuing where the previous call stopped.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        let r = P::RATE;

        let n = out.len().min(self.pos);
        let (head, mut out) = out.split_at_mut(n);
        self.state.extract_bytes(r - self.pos, head);
        self.pos -= n;

        while !out.is_empty() {
            self.state.permute();

            let n = out.len().min(r);
            let (block, rest) = mem::take(&mut out).split_at_mut(n);
            self.state.extract_bytes(0, block);

            self.pos = r - n;
            out = rest;
        }
    }

    pub fn squeeze_array<const L: usize>(&mut self) -> [u8; L] {
        let mut out = [0u8; L];
        self.squeeze(&mut out);
        out
    }

    /// Squeeze whole blocks.
    ///
    /// Must be called on a block boundary with `out.len()` a multiple of the
    /// rate, the output is then exactly that of [`squeeze_blocks`].
    pub fn squeeze_blocks(&mut self, out: &mut [u8]) {
        debug_assert_eq!(self.pos, 0);
        squeeze_blocks(&mut self.state, P::RATE, out);
    }
}

impl<P: SpongeParams, S, B: Backend> Sponge<P, S, B> {
    /// Forget everything absorbed or squeezed and start absorbing again, from
    /// the state and domain the context was created with.
    pub fn reset(self) -> Sponge<P, Absorbing, B> {
        Sponge::with_domain(self.initial, self.domain)
    }
}

impl<P: SpongeParams, S, B: Backend> Clone for Sponge<P, S, B> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            initial: self.initial.clone(),
            pos: self.pos,
            domain: self.domain,
            _marker: PhantomData,
        }
    }
}

impl<P: SpongeParams, S, B: Backend> fmt::Debug for Sponge<P, S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sponge")
            .field("rate", &P::RATE)
            .field("pos", &self.pos)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, RngCore};

    use super::*;
    use crate::backend::{Accelerated, Reference};

    struct Shake128Like;

    impl SpongeParams for Shake128Like {
        const RATE: usize = 168;
        const DOMAIN: u8 = 0x1F;
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let mut rng = rand::rng();
        let mut msg = [0u8; 1000];
        rng.fill_bytes(&mut msg);

        for len in [0, 1, 167, 168, 169, 335, 336, 337, 1000] {
            let msg = &msg[..len];

            let mut state = KeccakState::<Reference>::new();
            absorb(&mut state, 168, msg, 0x1F);
            let mut expected = [0u8; 3 * 168];
            squeeze_blocks(&mut state, 168, &mut expected);

            // absorb in uneven parts, squeeze in uneven parts
            let mut sponge = Sponge::<Shake128Like, Absorbing, Reference>::init();
            let split = rng.random_range(0..=len);
            sponge.absorb(&msg[..split]);
            sponge.absorb(&[]);
            sponge.absorb(&msg[split..]);
            let mut sponge = sponge.finalize();

            let mut out = [0u8; 3 * 168];
            let (a, rest) = out.split_at_mut(5);
            let (b, c) = rest.split_at_mut(200);
            sponge.squeeze(a);
            sponge.squeeze(b);
            sponge.squeeze(c);

            assert_eq!(out, expected, "length {len}");
        }
    }

    #[test]
    fn test_absorb_multi() {
        let parts: [&[u8]; 3] = [&[7; 32], &[1], &[2]];
        let joined = parts.concat();

        let mut a = KeccakState::<Accelerated>::new();
        let mut b = KeccakState::<Accelerated>::new();
        absorb(&mut a, 136, &joined, 0x1F);
        absorb_multi(&mut b, 136, &parts, 0x1F);

        assert_eq!(a.lanes(), b.lanes());
    }

    #[test]
    fn test_squeeze_blocks_continues() {
        let mut sponge = Sponge::<Shake128Like>::init();
        sponge.absorb(b"continue");
        let mut sponge = sponge.finalize();

        let mut whole = [0u8; 2 * 168];
        sponge.clone().squeeze(&mut whole);

        let mut first = [0u8; 168];
        let mut second = [0u8; 168];
        sponge.squeeze_blocks(&mut first);
        sponge.squeeze_blocks(&mut second);

        assert_eq!(whole[..168], first);
        assert_eq!(whole[168..], second);
    }

    #[test]
    fn test_reset() {
        let mut sponge = Sponge::<Shake128Like>::init();
        sponge.absorb(b"garbage");
        let mut sponge = sponge.finalize().reset();
        sponge.absorb(b"abc");
        let a: [u8; 32] = sponge.finalize().squeeze_array();

        let mut fresh = Sponge::<Shake128Like>::init();
        fresh.absorb(b"abc");
        let b: [u8; 32] = fresh.finalize().squeeze_array();

        assert_eq!(a, b);
    }
}
