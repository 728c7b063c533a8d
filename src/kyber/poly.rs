use core::{
    fmt::Display,
    ops::{AddAssign, Mul, SubAssign},
};

use zeroize::Zeroize;

use super::{
    compress::{compress, decompress},
    reduce, Zeta, N, Q, ZETAS,
};
use crate::{
    backend::{Backend, DefaultBackend},
    encode,
    hash::{PrfSeed, XofSeed, SHAKE128_RATE},
    sample::{self, Cbd2, KyberModulus},
};

/// Bytes of a polynomial with 12-bit coefficients.
pub const POLY_BYTES: usize = encode::packed_bytes(N, 12);

/// Bytes of PRF output consumed by one eta = 2 noise polynomial.
const NOISE_BYTES: usize = 2 * N / 4;

/// Expected bytes needed for a uniform polynomial, rounded up to whole blocks.
const UNIFORM_NBLOCKS: usize = (530 + SHAKE128_RATE) / SHAKE128_RATE;

/// Element of Z_Q\[X\]/(X^256 + 1).
#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
    f: [i16; N],
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

    pub const fn from_coeffs(f: [i16; N]) -> Self {
        Self { f }
    }

    pub fn coeffs(&self) -> &[i16; N] {
        &self.f
    }

    /// Forward NTT: normal order in, bit reversed order out. Output reduced.
    pub fn ntt(&mut self) {
        self.ntt_with::<DefaultBackend>()
    }

    pub fn ntt_with<B: Backend>(&mut self) {
        let f = &mut self.f;

        let mut k = 1;

        for len in (0..7).map(|n| 128 >> n) {
            for start in (0..N).step_by(len << 1) {
                let zeta = ZETAS[k];
                k += 1;
                for j in start..start + len {
                    let t = B::kyber_fqmul(f[j + len], zeta);
                    f[j + len] = f[j] - t;
                    f[j] += t;
                }
            }
        }

        self.reduce();
    }

    /// Inverse NTT: bit reversed order in, normal order out.
    ///
    /// The output carries an extra factor R: applied to the result of
    /// [`Poly::basemul_acc`] it yields the plain product.
    pub fn invntt(&mut self) {
        self.invntt_with::<DefaultBackend>()
    }

    pub fn invntt_with<B: Backend>(&mut self) {
        let f = &mut self.f;

        let mut k = 127;

        for len in (0..7).map(|n| 2 << n) {
            for start in (0..N).step_by(len << 1) {
                let zeta = ZETAS[k];
                k -= 1;
                for j in start..start + len {
                    let t = f[j];
                    f[j] = reduce::barrett_reduce(t + f[j + len]);
                    f[j + len] = B::kyber_fqmul(f[j + len] - t, zeta);
                }
            }
        }

        // (2^16)^2 / 128 = 2^{25}
        const DIV_128_MONT: Zeta = Zeta::new(((1 << 25) % Q as i32) as i16);

        for a in f.iter_mut() {
            // a = (a * R) / 128 (mod Q)
            *a = B::kyber_fqmul(*a, DIV_128_MONT);
        }
    }

    /// Accumulate the product of `a` and `b` in the NTT domain.
    ///
    /// The product of each pair of degree one residues carries a factor R^-1.
    pub fn basemul_acc(&mut self, a: &Poly, b: &Poly) {
        let h = &mut self.f;
        let f = &a.f;
        let g = &b.f;

        for i in (0..N).step_by(4) {
            let zeta = ZETAS[64 + (i >> 2)].value();

            let a = basemul(f[i], f[i + 1], g[i], g[i + 1], zeta);
            let b = basemul(f[i + 2], f[i + 3], g[i + 2], g[i + 3], -zeta);

            h[i] += a.0;
            h[i + 1] += a.1;
            h[i + 2] += b.0;
            h[i + 3] += b.1;
        }
    }

    /// Map every coefficient to (-Q, Q).
    pub fn reduce(&mut self) {
        for a in self.f.iter_mut() {
            *a = reduce::barrett_reduce(*a);
        }
    }

    /// Map every coefficient to [0, Q).
    pub fn freeze(&mut self) {
        for a in self.f.iter_mut() {
            *a = reduce::freeze(*a);
        }
    }

    /// a -> aR
    pub fn to_mont(&mut self) {
        for a in self.f.iter_mut() {
            *a = reduce::to_mont(*a);
        }
    }

    /// a -> aR^-1
    pub fn from_mont(&mut self) {
        for a in self.f.iter_mut() {
            *a = reduce::redc(*a as i32);
        }
    }

    /// Sample in the NTT domain from SHAKE128(seed || col || row).
    pub(crate) fn uniform(seed: XofSeed) -> Self {
        let mut xof = seed.xof();
        let mut poly = Poly::zero();

        let mut buf = [0u8; UNIFORM_NBLOCKS * SHAKE128_RATE];
        xof.squeeze_blocks(&mut buf);

        let (mut ctr, _) = sample::rej_uniform::<KyberModulus>(&mut poly.f, &buf);

        let mut extra = 0;
        while ctr < N {
            let block = &mut buf[..SHAKE128_RATE];
            xof.squeeze_blocks(block);

            ctr += sample::rej_uniform::<KyberModulus>(&mut poly.f[ctr..], block).0;
            extra += 1;
        }

        if extra > 0 {
            log::trace!(
                "uniform sampling of ({}, {}) squeezed {} extra block(s)",
                seed.row,
                seed.col,
                extra
            );
        }

        poly
    }

    /// Centered binomial noise, eta = 2, from SHAKE256(seed || nonce).
    pub(crate) fn getnoise(seed: &[u8; 32], nonce: u8) -> Self {
        let mut buf = [0u8; NOISE_BYTES];
        PrfSeed { key: seed, nonce }.prf(&mut buf);

        let mut poly = Poly::zero();
        sample::cbd::<DefaultBackend, Cbd2>(&mut poly.f, &buf);
        buf.zeroize();

        poly
    }

    pub fn to_bytes(&self, bytes: &mut [u8]) {
        encode::pack::<12>(bytes, self.f.iter().map(|&a| reduce::freeze(a) as u16));
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut poly = Poly::zero();

        for (a, t) in poly.f.iter_mut().zip(encode::unpack::<12>(bytes)) {
            *a = reduce::barrett_reduce(t as i16);
        }

        poly
    }

    pub fn compress<const D: usize>(&self, bytes: &mut [u8]) {
        encode::pack::<D>(bytes, self.f.iter().map(|&a| compress::<D>(a)));
    }

    pub fn decompress<const D: usize>(bytes: &[u8]) -> Self {
        let mut poly = Poly::zero();

        for (a, t) in poly.f.iter_mut().zip(encode::unpack::<D>(bytes)) {
            *a = decompress::<D>(t);
        }

        poly
    }

    pub fn from_msg(m: &[u8; 32]) -> Self {
        let mut poly = Poly::zero();

        for (coeffs, byte) in poly.f.chunks_exact_mut(8).zip(m.iter()) {
            for (a, bit) in coeffs.iter_mut().zip((0..8).map(|n| *byte >> n)) {
                *a = decompress::<1>((bit & 1) as u16);
            }
        }

        poly
    }

    pub fn to_msg(&self, m: &mut [u8; 32]) {
        m.fill(0);

        for (byte, coeffs) in m.iter_mut().zip(self.f.chunks_exact(8)) {
            for (i, a) in coeffs.iter().enumerate() {
                *byte |= (compress::<1>(*a) as u8) << i;
            }
        }
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, rhs: &Poly) {
        for (a, b) in self.f.iter_mut().zip(rhs.f.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, rhs: &Poly) {
        for (a, b) in self.f.iter_mut().zip(rhs.f.iter()) {
            *a -= b;
        }
    }
}

impl Display for Poly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut coeffs = self.f.iter().enumerate().filter(|&(_, &a)| a != 0);

        match coeffs.next() {
            Some((i, a)) => write!(f, "f(X) = {}X^{}", a, i)?,
            None => return write!(f, "f(X) = 0"),
        };

        for (i, a) in coeffs {
            write!(f, " + {}X^{}", a, i)?;
        }

        Ok(())
    }
}

/// Compute:
/// - c0 = (a0*b0 + a1*b1*zeta)R^-1 (mod Q)
/// - c1 = (a0*b1 + a1*b0)R^-1 (mod Q)
const fn basemul(a0: i16, a1: i16, b0: i16, b1: i16, zeta: i16) -> (i16, i16) {
    let c0 = reduce::mont_mul(a0, b0) + reduce::mont_mul(reduce::mont_mul(a1, b1), zeta);
    let c1 = reduce::mont_mul(a0, b1) + reduce::mont_mul(a1, b0);

    (c0, c1)
}

/// Vector of `K` polynomials.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyVec<const K: usize> {
    pub(crate) vec: [Poly; K],
}

impl<const K: usize> PolyVec<K> {
    pub const BYTES: usize = K * POLY_BYTES;

    pub const fn zero() -> Self {
        Self {
            vec: [const { Poly::zero() }; K],
        }
    }

    pub fn ntt(&mut self) {
        for p in self.vec.iter_mut() {
            p.ntt();
        }
    }

    pub fn invntt(&mut self) {
        for p in self.vec.iter_mut() {
            p.invntt();
        }
    }

    pub fn reduce(&mut self) {
        for p in self.vec.iter_mut() {
            p.reduce();
        }
    }

    pub fn to_mont(&mut self) {
        for p in self.vec.iter_mut() {
            p.to_mont();
        }
    }

    /// Noise vector using nonces `nonce..nonce + K`.
    pub(crate) fn getnoise(seed: &[u8; 32], nonce: u8) -> Self {
        let mut pvec = PolyVec::zero();

        for (p, nonce) in pvec.vec.iter_mut().zip(nonce..) {
            *p = Poly::getnoise(seed, nonce);
        }

        pvec
    }

    pub fn to_bytes(&self, bytes: &mut [u8]) {
        for (p, b) in self.vec.iter().zip(bytes.chunks_exact_mut(POLY_BYTES)) {
            p.to_bytes(b);
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut pvec = PolyVec::zero();

        for (p, b) in pvec.vec.iter_mut().zip(bytes.chunks_exact(POLY_BYTES)) {
            *p = Poly::from_bytes(b);
        }

        pvec
    }

    pub fn compress<const D: usize>(&self, bytes: &mut [u8]) {
        for (p, b) in self
            .vec
            .iter()
            .zip(bytes.chunks_exact_mut(encode::packed_bytes(N, D)))
        {
            p.compress::<D>(b);
        }
    }

    pub fn decompress<const D: usize>(bytes: &[u8]) -> Self {
        let mut pvec = PolyVec::zero();

        for (p, b) in pvec
            .vec
            .iter_mut()
            .zip(bytes.chunks_exact(encode::packed_bytes(N, D)))
        {
            *p = Poly::decompress::<D>(b);
        }

        pvec
    }
}

impl<const K: usize> AddAssign<&PolyVec<K>> for PolyVec<K> {
    fn add_assign(&mut self, rhs: &PolyVec<K>) {
        for (f, g) in self.vec.iter_mut().zip(rhs.vec.iter()) {
            f.add_assign(g);
        }
    }
}

/// Inner product in the NTT domain, reduced.
impl<const K: usize> Mul<&PolyVec<K>> for &PolyVec<K> {
    type Output = Poly;

    fn mul(self, rhs: &PolyVec<K>) -> Self::Output {
        let mut out = Poly::zero();

        for (f, g) in self.vec.iter().zip(rhs.vec.iter()) {
            out.basemul_acc(f, g);
        }

        out.reduce();

        out
    }
}

/// `K x K` matrix of polynomials in the NTT domain.
#[derive(Debug)]
pub struct PolyMatrix<const K: usize> {
    m: [PolyVec<K>; K],
}

impl<const K: usize> PolyMatrix<K> {
    /// Expand the public matrix A from `rho`, or its transpose.
    ///
    /// Entry (i, j) of A is sampled from SHAKE128(rho || j || i).
    pub fn generate(rho: &[u8; 32], transposed: bool) -> Self {
        let mut m = [const { PolyVec::zero() }; K];

        for (i, row) in m.iter_mut().enumerate() {
            for (j, poly) in row.vec.iter_mut().enumerate() {
                let (row, col) = match transposed {
                    false => (i as u8, j as u8),
                    true => (j as u8, i as u8),
                };

                *poly = Poly::uniform(XofSeed {
                    seed: rho,
                    row,
                    col,
                });
            }
        }

        Self { m }
    }
}

impl<const K: usize> Mul<&PolyVec<K>> for &PolyMatrix<K> {
    type Output = PolyVec<K>;

    fn mul(self, rhs: &PolyVec<K>) -> Self::Output {
        let mut out = PolyVec::zero();

        for (poly, row) in out.vec.iter_mut().zip(&self.m) {
            *poly = row * rhs;
        }

        out
    }
}
