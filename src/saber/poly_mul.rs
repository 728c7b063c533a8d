//! Polynomial multiplication modulo a power of two.
//!
//! There is no NTT for Z_{2^13}, so products are formed in the natural domain:
//! Toom-Cook 4-way splits the operands into quarters, the seven point-wise
//! products use two levels of Karatsuba over a 16 x 16 schoolbook kernel.
//!
//! All arithmetic wraps modulo 2^16. The divisions by 2, 3, 9 and 15 in the
//! interpolation are multiplications by inverses and right shifts, which
//! cost three bits of precision, so the product is exact modulo 2^13 for any
//! 16-bit inputs. Callers only ever use it with a modulus of at most 2^13.

use core::num::Wrapping;

use super::N;

/// Product length before reduction.
const N_RES: usize = 2 * N;
/// Toom-Cook piece length.
const N_SB: usize = N / 4;
const N_SB_RES: usize = 2 * N_SB - 1;
/// Below this length Karatsuba falls back to schoolbook.
const SCHOOLBOOK_N: usize = 16;

/// How the degree `2N - 2` product is folded back into `N` coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    /// X^N = -1, the Saber ring.
    Negacyclic,
    /// X^N = 1
    Cyclic,
}

/// out\[..2n - 1\] += a * b, n = a.len()
fn schoolbook_acc(a: &[u16], b: &[u16], out: &mut [u16]) {
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] = out[i + j].wrapping_add(x.wrapping_mul(y));
        }
    }
}

/// out\[..2n - 1\] += a * b, with n = a.len() a power of two up to 64.
fn karatsuba_acc(a: &[u16], b: &[u16], out: &mut [u16]) {
    let n = a.len();
    if n <= SCHOOLBOOK_N {
        return schoolbook_acc(a, b, out);
    }

    let h = n / 2;
    let (a0, a1) = a.split_at(h);
    let (b0, b1) = b.split_at(h);

    let mut z0 = [0u16; N_SB - 1];
    let mut z1 = [0u16; N_SB - 1];
    let mut z2 = [0u16; N_SB - 1];
    let (z0, z1, z2) = (&mut z0[..n - 1], &mut z1[..n - 1], &mut z2[..n - 1]);

    karatsuba_acc(a0, b0, z0);
    karatsuba_acc(a1, b1, z2);

    let mut sa = [0u16; N_SB / 2];
    let mut sb = [0u16; N_SB / 2];
    for i in 0..h {
        sa[i] = a0[i].wrapping_add(a1[i]);
        sb[i] = b0[i].wrapping_add(b1[i]);
    }
    karatsuba_acc(&sa[..h], &sb[..h], z1);

    for i in 0..n - 1 {
        let mid = z1[i].wrapping_sub(z0[i]).wrapping_sub(z2[i]);

        out[i] = out[i].wrapping_add(z0[i]);
        out[i + h] = out[i + h].wrapping_add(mid);
        out[i + n] = out[i + n].wrapping_add(z2[i]);
    }
}

/// Evaluate the four quarters of `a` at 7 points: inf, 2, 1, -1, 1/2, -1/2, 0.
/// The points 2 and +-1/2 are scaled by 8 to stay integral.
fn evaluate(a: &[u16; N]) -> [[u16; N_SB]; 7] {
    let mut w = [[0u16; N_SB]; 7];

    for j in 0..N_SB {
        let r0 = Wrapping(a[j]);
        let r1 = Wrapping(a[j + N_SB]);
        let r2 = Wrapping(a[j + 2 * N_SB]);
        let r3 = Wrapping(a[j + 3 * N_SB]);

        let even = r0 + r2;
        let odd = r1 + r3;
        w[2][j] = (even + odd).0;
        w[3][j] = (even - odd).0;

        let even = ((r0 << 2) + r2) << 1;
        let odd = (r1 << 2) + r3;
        w[4][j] = (even + odd).0;
        w[5][j] = (even - odd).0;

        w[1][j] = ((r3 << 3) + (r2 << 2) + (r1 << 1) + r0).0;
        w[6][j] = r0.0;
        w[0][j] = r3.0;
    }

    w
}

/// Full product of two degree N - 1 polynomials.
fn toom_cook_4way(a: &[u16; N], b: &[u16; N]) -> [u16; N_RES] {
    const INV3: Wrapping<u16> = Wrapping(43691);
    const INV9: Wrapping<u16> = Wrapping(36409);
    const INV15: Wrapping<u16> = Wrapping(61167);

    let aw = evaluate(a);
    let bw = evaluate(b);

    let mut w = [[0u16; N_SB_RES]; 7];
    for (w, (a, b)) in w.iter_mut().zip(aw.iter().zip(bw.iter())) {
        karatsuba_acc(a, b, w);
    }

    let mut c = [0u16; N_RES];

    for i in 0..N_SB_RES {
        let r0 = Wrapping(w[0][i]);
        let mut r1 = Wrapping(w[1][i]);
        let mut r2 = Wrapping(w[2][i]);
        let mut r3 = Wrapping(w[3][i]);
        let mut r4 = Wrapping(w[4][i]);
        let mut r5 = Wrapping(w[5][i]);
        let r6 = Wrapping(w[6][i]);

        r1 += r4;
        r5 -= r4;
        r3 = (r3 - r2) >> 1;
        r4 -= r0;
        r4 -= r6 << 6;
        r4 = (r4 << 1) + r5;
        r2 += r3;
        r1 = r1 - (r2 << 6) - r2;
        r2 -= r6;
        r2 -= r0;
        r1 += Wrapping(45) * r2;
        r4 = ((r4 - (r2 << 3)) * INV3) >> 3;
        r5 += r1;
        r1 = ((r1 + (r3 << 4)) * INV9) >> 1;
        r3 = -(r3 + r1);
        r5 = ((Wrapping(30) * r1 - r5) * INV15) >> 2;
        r2 -= r4;
        r1 -= r5;

        for (k, r) in [r6, r5, r4, r3, r2, r1, r0].into_iter().enumerate() {
            let c = &mut c[i + k * N_SB];
            *c = c.wrapping_add(r.0);
        }
    }

    c
}

fn fold(c: &[u16; N_RES], wrap: Wrap, acc: &mut [u16; N]) {
    let (lo, hi) = c.split_at(N);

    for (r, (&l, &h)) in acc.iter_mut().zip(lo.iter().zip(hi.iter())) {
        let t = match wrap {
            Wrap::Negacyclic => l.wrapping_sub(h),
            Wrap::Cyclic => l.wrapping_add(h),
        };
        *r = r.wrapping_add(t);
    }
}

/// acc += a * b, folded by `wrap`, exact modulo 2^13. `acc` is not reduced.
pub fn poly_mul_acc(a: &[u16; N], b: &[u16; N], acc: &mut [u16; N], wrap: Wrap) {
    fold(&toom_cook_4way(a, b), wrap, acc);
}

/// a * b modulo `p`, a power of two no larger than 2^13.
pub fn poly_mul(a: &[u16; N], b: &[u16; N], p: u16, wrap: Wrap) -> [u16; N] {
    debug_assert!(p.is_power_of_two() && p <= 1 << 13);

    let mut r = [0u16; N];
    poly_mul_acc(a, b, &mut r, wrap);

    for x in r.iter_mut() {
        *x &= p - 1;
    }

    r
}

/// Quadratic reference multiplication, a * b modulo `p`.
pub fn schoolbook(a: &[u16; N], b: &[u16; N], p: u16, wrap: Wrap) -> [u16; N] {
    debug_assert!(p.is_power_of_two());

    let mut c = [0u16; N_RES];
    schoolbook_acc(a, b, &mut c);

    let mut r = [0u16; N];
    fold(&c, wrap, &mut r);

    for x in r.iter_mut() {
        *x &= p - 1;
    }

    r
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const Q: u16 = 1 << 13;

    fn random_poly(rng: &mut impl Rng, bound: u16) -> [u16; N] {
        core::array::from_fn(|_| rng.random_range(0..bound))
    }

    /// small signed coefficients stored modulo 2^13
    fn random_noise(rng: &mut impl Rng, eta: i16) -> [u16; N] {
        core::array::from_fn(|_| (rng.random_range(-eta..=eta) as u16) & (Q - 1))
    }

    /// a * b over the integers, reduced at the end
    fn exact(a: &[u16; N], b: &[u16; N], p: u16, wrap: Wrap) -> [u16; N] {
        let mut c = [0i64; N];

        for i in 0..N {
            for j in 0..N {
                let t = a[i] as i64 * b[j] as i64;
                match (i + j < N, wrap) {
                    (true, _) => c[i + j] += t,
                    (false, Wrap::Negacyclic) => c[i + j - N] -= t,
                    (false, Wrap::Cyclic) => c[i + j - N] += t,
                }
            }
        }

        c.map(|x| x.rem_euclid(p as i64) as u16)
    }

    #[test]
    fn test_against_schoolbook() {
        let mut rng = rand::rng();

        for trial in 0..1000 {
            let a = random_poly(&mut rng, Q);
            let b = random_noise(&mut rng, 5);
            let wrap = match trial % 2 {
                0 => Wrap::Negacyclic,
                _ => Wrap::Cyclic,
            };

            assert_eq!(poly_mul(&a, &b, Q, wrap), schoolbook(&a, &b, Q, wrap));
        }
    }

    #[test]
    fn test_against_integers() {
        let mut rng = rand::rng();

        for _ in 0..20 {
            let a = random_poly(&mut rng, Q);
            let b = random_poly(&mut rng, Q);

            for wrap in [Wrap::Negacyclic, Wrap::Cyclic] {
                for p in [1 << 10, Q] {
                    let expected = exact(&a, &b, p, wrap);
                    assert_eq!(poly_mul(&a, &b, p, wrap), expected);
                    assert_eq!(schoolbook(&a, &b, p, wrap), expected);
                }
            }
        }
    }

    #[test]
    fn test_karatsuba() {
        let mut rng = rand::rng();

        let a: [u16; 64] = core::array::from_fn(|_| rng.random());
        let b: [u16; 64] = core::array::from_fn(|_| rng.random());

        let mut k = [0u16; 127];
        let mut s = [0u16; 127];
        karatsuba_acc(&a, &b, &mut k);
        schoolbook_acc(&a, &b, &mut s);

        assert_eq!(k, s);
    }

    #[test]
    fn test_wrap() {
        // X^255 * X = X^256
        let mut a = [0u16; N];
        let mut b = [0u16; N];
        a[255] = 1;
        b[1] = 1;

        let mut expected = [0u16; N];
        expected[0] = Q - 1;
        assert_eq!(poly_mul(&a, &b, Q, Wrap::Negacyclic), expected);

        expected[0] = 1;
        assert_eq!(poly_mul(&a, &b, Q, Wrap::Cyclic), expected);
    }

    #[test]
    fn test_accumulate() {
        let mut rng = rand::rng();
        let a = random_poly(&mut rng, Q);
        let b = random_noise(&mut rng, 4);
        let c = random_poly(&mut rng, Q);

        let mut acc = c;
        poly_mul_acc(&a, &b, &mut acc, Wrap::Negacyclic);

        let ab = poly_mul(&a, &b, Q, Wrap::Negacyclic);
        for i in 0..N {
            assert_eq!(acc[i] & (Q - 1), (ab[i] + c[i]) & (Q - 1));
        }
    }
}
