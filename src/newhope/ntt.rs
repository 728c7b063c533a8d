//! Negacyclic NTT over Z_12289 for the NewHope ring sizes.
//!
//! NewHope fixes psi = 7 for N = 1024 and psi = 10968 for N = 512, with
//! omega = psi^2 (49 and 3). Since 7 is a primitive 2048-th root of unity and
//! 10968 = 7^1734, every twiddle is a power of [`ROOT`] and one table serves
//! both sizes.

use super::{reduce, Zeta, Q};
use crate::backend::Backend;

const fn pow_mod(b: u16, mut e: u32) -> u16 {
    let mut b = b as u32;
    let mut r = 1u32;

    while e > 0 {
        if e & 1 == 1 {
            r = r * b % Q as u32;
        }
        b = b * b % Q as u32;
        e >>= 1;
    }

    r as u16
}

/// Primitive 2048-th root of unity, psi for N = 1024.
pub const ROOT: u16 = 7;

/// The primitive 2N-th root of unity used for ring size N.
pub const fn psi(n: usize) -> u16 {
    match n {
        512 => 10968,
        1024 => ROOT,
        _ => panic!("NewHope only defines N = 512 and N = 1024"),
    }
}

/// e such that ROOT^e = psi(n).
pub const fn psi_exponent(n: usize) -> usize {
    let target = psi(n) as u32;
    let mut w = 1u32;
    let mut e = 0;

    while w != target {
        w = w * ROOT as u32 % Q as u32;
        e += 1;
    }

    e
}

const fn twiddles(root: u16) -> [Zeta; 2048] {
    let mut table = [Zeta::new(0); 2048];
    let mut w = 1u32;

    let mut e = 0;
    while e < 2048 {
        table[e] = Zeta::new((w * reduce::R_MOD_Q % Q as u32) as u16);
        w = w * root as u32 % Q as u32;

        e += 1;
    }

    table
}

/// POWERS\[e\] = ROOT^e in montgomery form
pub const POWERS: [Zeta; 2048] = twiddles(ROOT);

const fn power(e: usize) -> Zeta {
    POWERS[e % 2048]
}

const fn power_inv(e: usize) -> Zeta {
    POWERS[(2048 - e % 2048) % 2048]
}

/// N^-1 (mod Q) in montgomery form
pub const fn n_inv(n: usize) -> Zeta {
    let inv = pow_mod((n % Q as usize) as u16, Q as u32 - 2) as u32;

    Zeta::new((inv * reduce::R_MOD_Q % Q as u32) as u16)
}

/// Index `i` of an `log_n`-bit counter, bits reversed.
pub const fn bitrev(i: usize, log_n: u32) -> usize {
    i.reverse_bits() >> (usize::BITS - log_n)
}

/// Forward transform, bit reversed input and natural order output.
///
/// Output k is the sum over j of f\[bitrev(j)\] psi^j omega^(jk), the same
/// values NewHope's `poly_ntt` produces. Every coefficient ends in [0, Q).
pub fn ntt<B: Backend, const N: usize>(f: &mut [u16; N]) {
    let log_n = N.trailing_zeros();
    let e = const { psi_exponent(N) };

    // a(X) -> a(psi X)
    for (i, a) in f.iter_mut().enumerate() {
        *a = B::newhope_fqmul(*a, power(bitrev(i, log_n) * e));
    }

    let mut half = 1;
    while half < N {
        // primitive (2 half)-th root of unity
        let step = e * N / half;

        for start in (0..N).step_by(half << 1) {
            for j in 0..half {
                let t = B::newhope_fqmul(f[start + j + half], power(j * step));
                let u = f[start + j];

                f[start + j] = reduce::add(u, t);
                f[start + j + half] = reduce::sub(u, t);
            }
        }

        half <<= 1;
    }
}

/// Inverse transform, natural order input and bit reversed output.
///
/// Includes the division by N, so `invntt(ntt(f)) == f`. NewHope's
/// `poly_invntt` is this followed by a bit reversal.
pub fn invntt<B: Backend, const N: usize>(f: &mut [u16; N]) {
    let log_n = N.trailing_zeros();
    let e = const { psi_exponent(N) };

    let mut half = N >> 1;
    while half > 0 {
        let step = e * N / half;

        for start in (0..N).step_by(half << 1) {
            for j in 0..half {
                let u = f[start + j];
                let v = f[start + j + half];

                f[start + j] = reduce::add(u, v);
                f[start + j + half] = B::newhope_fqmul(reduce::sub(u, v), power_inv(j * step));
            }
        }

        half >>= 1;
    }

    let n_inv = n_inv(N);

    // a(X) -> a(psi^-1 X) / N
    for (i, a) in f.iter_mut().enumerate() {
        let t = B::newhope_fqmul(*a, power_inv(bitrev(i, log_n) * e));
        *a = B::newhope_fqmul(t, n_inv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Reference;

    fn plain(z: Zeta) -> u16 {
        reduce::csubq(reduce::montgomery_reduce(z.value() as u32))
    }

    #[test]
    fn test_roots() {
        assert_eq!(pow_mod(ROOT, 1024), Q - 1);
        assert_eq!(pow_mod(ROOT, 2048), 1);

        assert_eq!(psi(1024), 7);
        assert_eq!(psi(512), 10968);
        assert_eq!(psi_exponent(1024), 1);
        assert_eq!(psi_exponent(512), 1734);

        // omega = psi^2, psi^N = -1
        assert_eq!(pow_mod(psi(1024), 2), 49);
        assert_eq!(pow_mod(psi(512), 2), 3);
        assert_eq!(pow_mod(psi(1024), 1024), Q - 1);
        assert_eq!(pow_mod(psi(512), 512), Q - 1);

        // montgomery first entries of the bit reversed gamma table
        let gammas: [u16; 4] = core::array::from_fn(|i| power(bitrev(i, 10)).value());
        assert_eq!(gammas, [4075, 6974, 7373, 7965]);

        for e in [0, 1, 2, 1000, 1734, 2047, 5000] {
            let w = plain(power(e));
            assert_eq!(w, pow_mod(ROOT, e as u32));
            assert_eq!(w as u32 * plain(power_inv(e)) as u32 % Q as u32, 1);
        }

        for n in [256, 512, 1024] {
            assert_eq!(plain(n_inv(n)) as usize * n % Q as usize, 1);
        }
    }

    #[test]
    fn test_ntt_values() {
        let mut f: [u16; 1024] = core::array::from_fn(|i| i as u16);
        ntt::<Reference, 1024>(&mut f);
        assert_eq!(f[..4], [2382, 1223, 692, 8680]);
        assert_eq!(f[1023], 6772);

        let mut f: [u16; 512] = core::array::from_fn(|i| i as u16);
        ntt::<Reference, 512>(&mut f);
        assert_eq!(f[..4], [2576, 11818, 6398, 2117]);
        assert_eq!(f[511], 3554);

        // coefficient N/2 sits at index 1: psi^(N/2) (-1)^k
        let mut f = [0u16; 1024];
        f[1] = 1;
        ntt::<Reference, 1024>(&mut f);
        assert_eq!(f[..4], [10810, 1479, 10810, 1479]);
    }

    #[test]
    fn test_roundtrip() {
        let mut f: [u16; 512] = core::array::from_fn(|i| (i * 7919 % Q as usize) as u16);
        let x = f;
        ntt::<Reference, 512>(&mut f);
        invntt::<Reference, 512>(&mut f);
        assert_eq!(f, x);
    }

    #[test]
    fn test_bitrev() {
        assert_eq!(bitrev(1, 9), 256);
        assert_eq!(bitrev(0b110, 3), 0b011);
        assert_eq!(bitrev(511, 9), 511);
        assert_eq!(bitrev(3, 10), 0b1100000000);
    }
}
