use core::ops::{AddAssign, SubAssign};

use zeroize::Zeroize;

use super::{ntt, reduce, Zeta, Q, SYMBYTES};
use crate::{
    backend::{Backend, DefaultBackend},
    encode,
    hash::{Shake128, Shake256, SHAKE128_RATE},
    sample::{self, Cbd8, NewHopeModulus},
};

/// Element of Z_Q\[X\]/(X^N + 1).
///
/// [`Poly::ntt`] reads its input in bit reversed order, while [`Poly::invntt`]
/// returns coefficients in natural order. Sampled noise has no meaningful
/// order, so only the message and the decrypted value care. Use
/// [`Poly::bitrev`] to switch layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly<const N: usize> {
    f: [u16; N],
}

impl<const N: usize> Drop for Poly<N> {
    fn drop(&mut self) {
        self.f.zeroize();
    }
}

impl<const N: usize> Poly<N> {
    /// Bytes of a polynomial with 14-bit coefficients.
    pub const BYTES: usize = encode::packed_bytes(N, 14);

    /// Bytes of a polynomial compressed to 3 bits per coefficient.
    pub const COMPRESSED_BYTES: usize = encode::packed_bytes(N, 3);

    /// Number of coefficients carrying each message bit.
    const COPIES: usize = N / 256;

    pub const fn zero() -> Self {
        Self { f: [0; N] }
    }

    /// Coefficients are reduced mod Q.
    pub fn from_coeffs(mut f: [u16; N]) -> Self {
        for a in f.iter_mut() {
            *a = reduce::freeze(*a);
        }

        Self { f }
    }

    pub fn coeffs(&self) -> &[u16; N] {
        &self.f
    }

    pub fn ntt(&mut self) {
        self.ntt_with::<DefaultBackend>();
    }

    pub fn ntt_with<B: Backend>(&mut self) {
        ntt::ntt::<B, N>(&mut self.f);
    }

    pub fn invntt(&mut self) {
        self.invntt_with::<DefaultBackend>();
    }

    /// Inverse transform with natural order output, so that
    /// `invntt(ntt(x))` is `x` bit reversed.
    pub fn invntt_with<B: Backend>(&mut self) {
        ntt::invntt::<B, N>(&mut self.f);
        self.bitrev();
    }

    /// Coefficient-wise product, for polynomials in the NTT domain.
    pub fn pointwise(&self, rhs: &Self) -> Self {
        self.pointwise_with::<DefaultBackend>(rhs)
    }

    pub fn pointwise_with<B: Backend>(&self, rhs: &Self) -> Self {
        let mut r = Poly::zero();

        for (c, (a, b)) in r.f.iter_mut().zip(self.f.iter().zip(rhs.f.iter())) {
            *c = B::newhope_fqmul(*a, Zeta::new(reduce::to_mont(*b)));
        }

        r
    }

    /// Map every coefficient to [0, Q).
    pub fn freeze(&mut self) {
        for a in self.f.iter_mut() {
            *a = reduce::freeze(*a);
        }
    }

    /// Swap coefficients i and bitrev(i).
    pub fn bitrev(&mut self) {
        let log_n = N.trailing_zeros();

        for i in 0..N {
            let r = ntt::bitrev(i, log_n);
            if i < r {
                self.f.swap(i, r);
            }
        }
    }

    /// Expand the public polynomial, 64 coefficients per SHAKE128(seed || i).
    pub(crate) fn uniform(seed: &[u8; SYMBYTES]) -> Self {
        let mut poly = Poly::zero();

        for (i, coeffs) in poly.f.chunks_exact_mut(64).enumerate() {
            let mut xof = Shake128::<DefaultBackend>::init();
            xof.absorb_multi(&[seed, &[i as u8]]);
            let mut xof = xof.finalize();

            let mut ctr = 0;
            let mut blocks = 0;
            while ctr < 64 {
                let mut buf = [0u8; SHAKE128_RATE];
                xof.squeeze_blocks(&mut buf);
                blocks += 1;

                ctr += sample::rej_uniform::<NewHopeModulus>(&mut coeffs[ctr..], &buf).0;
            }

            if blocks > 1 {
                log::trace!("uniform block {} squeezed {} blocks", i, blocks);
            }
        }

        poly
    }

    /// Centered binomial noise with k = 8, 64 coefficients per
    /// SHAKE256(seed || nonce || i).
    pub(crate) fn sample(seed: &[u8; SYMBYTES], nonce: u8) -> Self {
        let mut poly = Poly::zero();

        let mut buf = [0u8; 128];
        let mut noise = [0i16; 64];

        for (i, coeffs) in poly.f.chunks_exact_mut(64).enumerate() {
            let mut prf = Shake256::<DefaultBackend>::init();
            prf.absorb_multi(&[seed, &[nonce, i as u8]]);
            prf.finalize().squeeze(&mut buf);

            sample::cbd::<DefaultBackend, Cbd8>(&mut noise, &buf);

            for (a, e) in coeffs.iter_mut().zip(noise.iter()) {
                *a = reduce::csubq((Q as i16 + e) as u16);
            }
        }

        buf.zeroize();
        noise.zeroize();

        poly
    }

    pub fn to_bytes(&self, bytes: &mut [u8]) {
        encode::pack::<14>(bytes, self.f.iter().map(|&a| reduce::freeze(a)));
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut poly = Poly::zero();

        for (a, t) in poly.f.iter_mut().zip(encode::unpack::<14>(bytes)) {
            *a = reduce::freeze(t);
        }

        poly
    }

    pub fn compress(&self, bytes: &mut [u8]) {
        let q = Q as u32;

        encode::pack::<3>(
            bytes,
            self.f
                .iter()
                .map(|&a| ((((reduce::freeze(a) as u32) << 3) + q / 2) / q) as u16),
        );
    }

    pub fn decompress(bytes: &[u8]) -> Self {
        let mut poly = Poly::zero();

        for (a, t) in poly.f.iter_mut().zip(encode::unpack::<3>(bytes)) {
            *a = ((t as u32 * Q as u32 + 4) >> 3) as u16;
        }

        poly
    }

    /// Every message bit is spread over `N / 256` coefficients, 256 apart.
    pub fn from_msg(m: &[u8; SYMBYTES]) -> Self {
        let mut poly = Poly::zero();

        for copy in poly.f.chunks_exact_mut(256) {
            for (coeffs, byte) in copy.chunks_exact_mut(8).zip(m.iter()) {
                for (j, a) in coeffs.iter_mut().enumerate() {
                    if (byte >> j) & 1 == 1 {
                        *a = Q / 2;
                    }
                }
            }
        }

        poly
    }

    pub fn to_msg(&self, m: &mut [u8; SYMBYTES]) {
        m.fill(0);

        let threshold = (Self::COPIES * Q as usize / 4) as u32;

        for i in 0..256 {
            let t: u32 = (0..Self::COPIES)
                .map(|c| reduce::flipabs(reduce::freeze(self.f[i + 256 * c])) as u32)
                .sum();

            if t < threshold {
                m[i >> 3] |= 1 << (i & 7);
            }
        }
    }
}

impl<const N: usize> AddAssign<&Poly<N>> for Poly<N> {
    fn add_assign(&mut self, rhs: &Poly<N>) {
        for (a, b) in self.f.iter_mut().zip(rhs.f.iter()) {
            *a = reduce::add(*a, *b);
        }
    }
}

impl<const N: usize> SubAssign<&Poly<N>> for Poly<N> {
    fn sub_assign(&mut self, rhs: &Poly<N>) {
        for (a, b) in self.f.iter_mut().zip(rhs.f.iter()) {
            *a = reduce::sub(*a, *b);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::backend::{Accelerated, Reference};

    fn random_poly<const N: usize>(rng: &mut impl Rng) -> Poly<N> {
        Poly::from_coeffs(core::array::from_fn(|_| rng.random_range(0..Q)))
    }

    /// a * b in Z_Q[X]/(X^N + 1), natural layout
    fn schoolbook<const N: usize>(a: &[u16; N], b: &[u16; N]) -> [u16; N] {
        let mut c = [0i64; N];

        for i in 0..N {
            for j in 0..N {
                let t = a[i] as i64 * b[j] as i64;
                if i + j < N {
                    c[i + j] += t;
                } else {
                    c[i + j - N] -= t;
                }
            }
        }

        c.map(|x| x.rem_euclid(Q as i64) as u16)
    }

    fn ntt_roundtrip<const N: usize>() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let x = random_poly::<N>(&mut rng);

            let mut p = x.clone();
            p.ntt();
            assert!(p.f.iter().all(|&a| a < Q));
            p.invntt();

            let mut x = x;
            x.bitrev();
            assert_eq!(p, x);
        }
    }

    fn ntt_multiplication<const N: usize>() {
        let mut rng = rand::rng();

        for _ in 0..5 {
            let a = random_poly::<N>(&mut rng);
            let b = random_poly::<N>(&mut rng);

            let mut a_hat = a.clone();
            let mut b_hat = b.clone();
            a_hat.ntt();
            b_hat.ntt();

            let mut c = a_hat.pointwise(&b_hat);
            c.invntt();

            let (mut a, mut b) = (a, b);
            a.bitrev();
            b.bitrev();

            assert_eq!(c.f, schoolbook(&a.f, &b.f));
        }
    }

    #[test]
    fn test_ntt() {
        ntt_roundtrip::<512>();
        ntt_roundtrip::<1024>();
        ntt_multiplication::<512>();
        ntt_multiplication::<1024>();
    }

    #[test]
    fn test_ntt_backends_agree() {
        let mut rng = rand::rng();

        for _ in 0..20 {
            let x = random_poly::<1024>(&mut rng);

            let mut a = x.clone();
            let mut b = x.clone();
            a.ntt_with::<Reference>();
            b.ntt_with::<Accelerated>();
            assert_eq!(a, b);

            assert_eq!(
                a.pointwise_with::<Reference>(&x),
                b.pointwise_with::<Accelerated>(&x)
            );

            a.invntt_with::<Reference>();
            b.invntt_with::<Accelerated>();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_invntt_values() {
        let mut p = Poly::<1024>::from_coeffs(core::array::from_fn(|i| i as u16));
        p.invntt();
        assert_eq!(p.f[..4], [6656, 1792, 1234, 5882]);
        assert_eq!(p.f[1023], 1792);

        let mut p = Poly::<512>::from_coeffs(core::array::from_fn(|i| i as u16));
        p.invntt();
        assert_eq!(p.f[..4], [6400, 6805, 4608, 3461]);
        assert_eq!(p.f[511], 6805);
    }

    #[test]
    fn test_add_sub() {
        let mut rng = rand::rng();
        let a = random_poly::<512>(&mut rng);
        let b = random_poly::<512>(&mut rng);

        let mut c = a.clone();
        c += &b;
        assert!(c.f.iter().all(|&x| x < Q));
        c -= &b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_bitrev() {
        let mut p = Poly::<512>::from_coeffs(core::array::from_fn(|i| i as u16));
        p.bitrev();
        assert_eq!(p.f[1], 256);
        assert_eq!(p.f[256], 1);
        p.bitrev();
        assert!(p.f.iter().enumerate().all(|(i, &a)| a == i as u16));
    }

    #[test]
    fn test_serialization() {
        let mut rng = rand::rng();
        let a = random_poly::<1024>(&mut rng);

        let mut bytes = [0u8; Poly::<1024>::BYTES];
        a.to_bytes(&mut bytes);
        assert_eq!(Poly::<1024>::from_bytes(&bytes), a);

        // compression error is at most Q / 16
        let mut bytes = [0u8; Poly::<1024>::COMPRESSED_BYTES];
        a.compress(&mut bytes);
        let b = Poly::<1024>::decompress(&bytes);
        for (&x, &y) in a.f.iter().zip(b.f.iter()) {
            let d = reduce::sub(x, y).min(reduce::sub(y, x));
            assert!(d <= Q / 16 + 1, "{x} {y}");
        }
    }

    #[test]
    fn test_msg() {
        let mut rng = rand::rng();
        let mut m = [0u8; 32];
        rng.fill(&mut m);

        let mut out = [0u8; 32];
        Poly::<512>::from_msg(&m).to_msg(&mut out);
        assert_eq!(out, m);

        // tolerates noise below Q / 4 on every copy
        let mut p = Poly::<1024>::from_msg(&m);
        let noise = Poly::<1024>::from_coeffs(core::array::from_fn(|i| {
            if i % 2 == 0 {
                3000
            } else {
                Q - 3000
            }
        }));
        p += &noise;
        p.to_msg(&mut out);
        assert_eq!(out, m);
    }

    #[test]
    fn test_samplers() {
        let seed = [3u8; 32];

        let a = Poly::<1024>::uniform(&seed);
        assert!(a.f.iter().all(|&x| x < Q));
        assert_eq!(a, Poly::<1024>::uniform(&seed));

        // the first half of a 1024 polynomial matches the 512 one
        let b = Poly::<512>::uniform(&seed);
        assert_eq!(a.f[..512], b.f);

        let e = Poly::<512>::sample(&seed, 0);
        assert!(e.f.iter().all(|&x| x <= 8 || x >= Q - 8));
        assert_ne!(e, Poly::<512>::sample(&seed, 1));
    }
}
