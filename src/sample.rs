//! Noise and uniform samplers shared by the lattice schemes.
//!
//! Both samplers are pure functions of a byte buffer. The ring modules decide
//! where the bytes come from and how the result is represented.

use crate::{backend::Backend, kyber, newhope};

mod sealed {
    pub trait Sealed {}
}

const fn lanes(k: usize) -> u64 {
    let mut m = 0u64;

    let mut i = 0;
    while i < 8 {
        m |= 1 << (i * k);
        i += 1;
    }

    m
}

/// Width `k` of a centered binomial distribution: a sample is the difference
/// of the Hamming weights of two `k`-bit fields, so four samples take exactly
/// `k` bytes.
pub trait CbdWidth: sealed::Sealed {
    const K: usize;

    /// lowest bit of each of the eight `K`-bit fields in a `8 * K` bit word
    const LANES: u64 = lanes(Self::K);

    /// mask of a single `K`-bit field
    const FIELD: u64 = (1 << Self::K) - 1;
}

/// Kyber, eta = 2.
pub struct Cbd2;
/// FireSaber, mu = 6.
pub struct Cbd3;
/// Saber, mu = 8.
pub struct Cbd4;
/// LightSaber, mu = 10.
pub struct Cbd5;
/// NewHope, k = 8.
pub struct Cbd8;

impl sealed::Sealed for Cbd2 {}
impl sealed::Sealed for Cbd3 {}
impl sealed::Sealed for Cbd4 {}
impl sealed::Sealed for Cbd5 {}
impl sealed::Sealed for Cbd8 {}

impl CbdWidth for Cbd2 {
    const K: usize = 2;
}

impl CbdWidth for Cbd3 {
    const K: usize = 3;
}

impl CbdWidth for Cbd4 {
    const K: usize = 4;
}

impl CbdWidth for Cbd5 {
    const K: usize = 5;
}

impl CbdWidth for Cbd8 {
    const K: usize = 8;
}

/// Centered binomial sampling of `out.len()` coefficients in `[-K, K]`.
///
/// Every group of `W::K` input bytes, read little endian, yields four
/// coefficients, so `buf.len() * 4 == out.len() * W::K` must hold.
pub fn cbd<B: Backend, W: CbdWidth>(out: &mut [i16], buf: &[u8]) {
    debug_assert_eq!(buf.len() * 4, out.len() * W::K);

    for (r, bytes) in out.chunks_exact_mut(4).zip(buf.chunks_exact(W::K)) {
        let mut t = [0u8; 8];
        t[..W::K].copy_from_slice(bytes);

        r.copy_from_slice(&B::cbd4::<W>(u64::from_le_bytes(t)));
    }
}

/// Modulus a uniform sampler can target.
pub trait UniformModulus: sealed::Sealed {
    type Coeff: Copy;

    const Q: u16;

    /// Acceptance bound, the largest multiple of `Q` that fits the sampled
    /// 16-bit values.
    const BOUND: u16;

    /// Map an accepted value to its representative in `[0, Q)`.
    fn fold(val: u16) -> Self::Coeff;
}

pub struct KyberModulus;
pub struct NewHopeModulus;

impl sealed::Sealed for KyberModulus {}
impl sealed::Sealed for NewHopeModulus {}

impl UniformModulus for KyberModulus {
    type Coeff = i16;

    const Q: u16 = kyber::Q as u16;
    const BOUND: u16 = 19 * Self::Q;

    fn fold(val: u16) -> i16 {
        // 2^12 = 767 (mod Q)
        let t = val - (val >> 12) * Self::Q;
        kyber::reduce::freeze(t as i16)
    }
}

impl UniformModulus for NewHopeModulus {
    type Coeff = u16;

    const Q: u16 = newhope::Q;
    const BOUND: u16 = 5 * Self::Q;

    fn fold(val: u16) -> u16 {
        newhope::reduce::freeze(val)
    }
}

/// Rejection sampling of 16-bit little endian values below `M::BOUND`.
///
/// Stops when `out` is full or fewer than two bytes are left, and returns
/// `(accepted, consumed)`: the number of coefficients written to the front of
/// `out` and the number of bytes of `buf` read.
pub fn rej_uniform<M: UniformModulus>(out: &mut [M::Coeff], buf: &[u8]) -> (usize, usize) {
    let mut ctr = 0;
    let mut pos = 0;

    while ctr < out.len() && pos + 2 <= buf.len() {
        let val = u16::from_le_bytes([buf[pos], buf[pos + 1]]);
        pos += 2;

        if val < M::BOUND {
            out[ctr] = M::fold(val);
            ctr += 1;
        }
    }

    (ctr, pos)
}
