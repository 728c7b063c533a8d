use zeroize::Zeroize;

use super::{
    poly_mul::{poly_mul_acc, Wrap},
    EP, EQ, H1, N, Q,
};
use crate::{
    backend::DefaultBackend,
    encode,
    hash::{Shake128, Shake128Reader},
    sample::{self, CbdWidth},
};

/// Element of Z_{2^13}\[X\]/(X^256 + 1), or of one of its power-of-two
/// quotients. Coefficients are stored as u16 and only reduced on packing or
/// by explicit masking.
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    f: [u16; N],
}

impl Drop for Poly {
    fn drop(&mut self) {
        self.f.zeroize();
    }
}

impl Poly {
    pub const fn zero() -> Self {
        Self { f: [0; N] }
    }

    pub const fn from_coeffs(f: [u16; N]) -> Self {
        Self { f }
    }

    pub fn coeffs(&self) -> &[u16; N] {
        &self.f
    }

    pub(crate) fn coeffs_mut(&mut self) -> &mut [u16; N] {
        &mut self.f
    }

    /// Keep the low `log2(p)` bits of every coefficient.
    pub fn mask(&mut self, p: u16) {
        for a in self.f.iter_mut() {
            *a &= p - 1;
        }
    }

    /// Round from Z_Q to Z_P: a -> (a + h1) >> (EQ - EP)
    pub fn round_to_p(&mut self) {
        for a in self.f.iter_mut() {
            *a = a.wrapping_add(H1) >> (EQ - EP);
        }
    }

    /// Centered binomial noise stored modulo Q.
    fn sample<W: CbdWidth>(xof: &mut Shake128Reader) -> Self {
        // room for the widest sampler, Cbd8
        let mut buf = [0u8; 8 * N / 4];
        let buf = &mut buf[..W::K * N / 4];
        xof.squeeze(buf);

        let mut noise = [0i16; N];
        sample::cbd::<DefaultBackend, W>(&mut noise, buf);
        buf.zeroize();

        let mut poly = Poly::zero();
        for (a, e) in poly.f.iter_mut().zip(noise.iter()) {
            *a = (*e as u16) & (Q - 1);
        }
        noise.zeroize();

        poly
    }

    /// Pack the low `D` bits of every coefficient.
    pub fn to_bytes<const D: usize>(&self, bytes: &mut [u8]) {
        encode::pack::<D>(bytes, self.f.iter().copied());
    }

    pub fn from_bytes<const D: usize>(bytes: &[u8]) -> Self {
        let mut poly = Poly::zero();

        for (a, t) in poly.f.iter_mut().zip(encode::unpack::<D>(bytes)) {
            *a = t;
        }

        poly
    }

    /// One message bit per coefficient.
    pub fn from_msg(m: &[u8; 32]) -> Self {
        Self::from_bytes::<1>(m)
    }

    /// Lowest bit of every coefficient.
    pub fn to_msg(&self, m: &mut [u8; 32]) {
        self.to_bytes::<1>(m);
    }
}

/// Vector of `L` polynomials.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyVec<const L: usize> {
    pub(crate) vec: [Poly; L],
}

impl<const L: usize> PolyVec<L> {
    pub const fn zero() -> Self {
        Self {
            vec: [const { Poly::zero() }; L],
        }
    }

    /// Secret vector from SHAKE128(seed), `W::K * N / 4` bytes per polynomial.
    pub fn secret<W: CbdWidth>(seed: &[u8; 32]) -> Self {
        let mut xof = Shake128::<DefaultBackend>::init();
        xof.absorb(seed);
        let mut xof = xof.finalize();

        let mut s = Self::zero();
        for p in s.vec.iter_mut() {
            *p = Poly::sample::<W>(&mut xof);
        }

        s
    }

    pub fn round_to_p(&mut self) {
        for p in self.vec.iter_mut() {
            p.round_to_p();
        }
    }

    /// Inner product modulo `p`.
    pub fn inner(&self, rhs: &PolyVec<L>, p: u16) -> Poly {
        let mut acc = Poly::zero();

        for (a, b) in self.vec.iter().zip(rhs.vec.iter()) {
            poly_mul_acc(&a.f, &b.f, &mut acc.f, Wrap::Negacyclic);
        }

        acc.mask(p);
        acc
    }

    pub fn to_bytes<const D: usize>(&self, bytes: &mut [u8]) {
        let len = encode::packed_bytes(N, D);

        for (p, b) in self.vec.iter().zip(bytes.chunks_exact_mut(len)) {
            p.to_bytes::<D>(b);
        }
    }

    pub fn from_bytes<const D: usize>(bytes: &[u8]) -> Self {
        let len = encode::packed_bytes(N, D);
        let mut pvec = Self::zero();

        for (p, b) in pvec.vec.iter_mut().zip(bytes.chunks_exact(len)) {
            *p = Poly::from_bytes::<D>(b);
        }

        pvec
    }
}

/// Public `L x L` matrix over Z_Q.
#[derive(Debug)]
pub struct PolyMatrix<const L: usize> {
    m: [PolyVec<L>; L],
}

impl<const L: usize> PolyMatrix<L> {
    /// Rows of 13-bit coefficients read from SHAKE128(seed) in order.
    pub fn generate(seed: &[u8; 32]) -> Self {
        let mut xof = Shake128::<DefaultBackend>::init();
        xof.absorb(seed);
        let mut xof = xof.finalize();

        let mut m = [const { PolyVec::zero() }; L];
        let mut buf = [0u8; encode::packed_bytes(N, EQ)];

        for row in m.iter_mut() {
            for p in row.vec.iter_mut() {
                xof.squeeze(&mut buf);
                *p = Poly::from_bytes::<EQ>(&buf);
            }
        }

        Self { m }
    }

    /// A * s, or A^T * s, modulo Q.
    pub fn mul(&self, s: &PolyVec<L>, transpose: bool) -> PolyVec<L> {
        let mut r = PolyVec::zero();

        for (i, acc) in r.vec.iter_mut().enumerate() {
            for (j, sj) in s.vec.iter().enumerate() {
                let a = match transpose {
                    false => &self.m[i].vec[j],
                    true => &self.m[j].vec[i],
                };
                poly_mul_acc(&a.f, &sj.f, &mut acc.f, Wrap::Negacyclic);
            }

            acc.mask(Q);
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::Reference,
        sample::{Cbd3, Cbd4, Cbd5, Cbd8},
        saber::poly_mul::schoolbook,
    };

    fn secret_bounds<W: CbdWidth>() {
        let s = PolyVec::<3>::secret::<W>(&[1u8; 32]);
        let k = W::K as u16;

        for p in s.vec.iter() {
            assert!(p.f.iter().all(|&x| x <= k || x >= Q - k));
        }

        assert_ne!(s.vec[0], s.vec[1]);
        assert_eq!(s, PolyVec::<3>::secret::<W>(&[1u8; 32]));
    }

    #[test]
    fn test_secret() {
        secret_bounds::<Cbd3>();
        secret_bounds::<Cbd4>();
        secret_bounds::<Cbd5>();
        secret_bounds::<Cbd8>();

        // the noise is read straight off the XOF: 2 * 256 bytes per polynomial
        let s = PolyVec::<2>::secret::<Cbd8>(&[9u8; 32]);
        let mut xof = Shake128::<DefaultBackend>::init();
        xof.absorb(&[9u8; 32]);
        let mut buf = [0u8; 2 * 512];
        xof.finalize().squeeze(&mut buf);

        let mut noise = [0i16; N];
        sample::cbd::<Reference, Cbd8>(&mut noise, &buf[512..]);
        let expected: [u16; N] = noise.map(|e| (e as u16) & (Q - 1));
        assert_eq!(s.vec[1].f, expected);
    }

    #[test]
    fn test_generate() {
        let a = PolyMatrix::<2>::generate(&[7u8; 32]);

        for row in a.m.iter() {
            for p in row.vec.iter() {
                assert!(p.f.iter().all(|&x| x < Q));
            }
        }

        // one continuous XOF stream
        let mut xof = Shake128::<DefaultBackend>::init();
        xof.absorb(&[7u8; 32]);
        let mut buf = [0u8; 4 * 416];
        xof.finalize().squeeze(&mut buf);
        assert_eq!(a.m[1].vec[0], Poly::from_bytes::<13>(&buf[2 * 416..3 * 416]));
    }

    #[test]
    fn test_mul() {
        let a = PolyMatrix::<2>::generate(&[2u8; 32]);
        let s = PolyVec::<2>::secret::<Cbd4>(&[3u8; 32]);

        let r = a.mul(&s, false);
        let rt = a.mul(&s, true);

        let mut expected = [0u16; N];
        for j in 0..2 {
            let t = schoolbook(&a.m[1].vec[j].f, &s.vec[j].f, Q, Wrap::Negacyclic);
            for (e, t) in expected.iter_mut().zip(t) {
                *e = (*e + t) & (Q - 1);
            }
        }
        assert_eq!(r.vec[1].f, expected);

        let mut expected = [0u16; N];
        for j in 0..2 {
            let t = schoolbook(&a.m[j].vec[1].f, &s.vec[j].f, Q, Wrap::Negacyclic);
            for (e, t) in expected.iter_mut().zip(t) {
                *e = (*e + t) & (Q - 1);
            }
        }
        assert_eq!(rt.vec[1].f, expected);

        assert!(r.vec[0].f.iter().all(|&x| x < Q));
    }

    #[test]
    fn test_rounding_and_msg() {
        let mut p = Poly::from_coeffs(core::array::from_fn(|i| (i as u16 * 37) & (Q - 1)));
        let orig = p.clone();
        p.round_to_p();

        for (r, a) in p.f.iter().zip(orig.f.iter()) {
            assert_eq!(*r, (a + 4) >> 3);
        }

        let m = [0xA5u8; 32];
        let mut out = [0u8; 32];
        Poly::from_msg(&m).to_msg(&mut out);
        assert_eq!(out, m);
    }
}
