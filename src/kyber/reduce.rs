//! Modular reduction for Q = 3329 with R = 2^16.

use super::Q;

pub const R_MOD_Q: i32 = -1044; // 2^16 mod Q, centered
pub const R2_MOD_Q: i32 = 1353; // 2^32 mod Q
pub const QINV: i32 = -3327; // Q^-1 mod 2^16, centered

/// Montgomery reduction, a -> aR^-1 (mod Q).
///
/// For |a| < Q 2^15 the result lies in (-Q, Q).
pub const fn redc(a: i32) -> i16 {
    // a - mQ vanishes mod 2^16
    let m = (a as i16).wrapping_mul(QINV as i16) as i32;

    ((a - m * Q as i32) >> 16) as i16
}

/// a, b -> abR^-1 (mod Q)
pub const fn mont_mul(a: i16, b: i16) -> i16 {
    redc(a as i32 * b as i32)
}

/// a -> aR (mod Q)
pub const fn to_mont(a: i16) -> i16 {
    redc(a as i32 * R2_MOD_Q)
}

/// Barrett reduction to the centered representative in [-(Q-1)/2, (Q-1)/2].
pub const fn barrett_reduce(a: i16) -> i16 {
    // round(2^26 / Q)
    const V: i32 = ((1 << 26) + Q as i32 / 2) / Q as i32;

    let a = a as i32;
    let t = (a * V + (1 << 25)) >> 26;

    (a - t * Q as i32) as i16
}

/// Add Q when negative, (-Q, Q) -> [0, Q).
pub const fn caddq(a: i16) -> i16 {
    a + ((a >> 15) & Q)
}

/// Canonical representative in [0, Q).
pub const fn freeze(a: i16) -> i16 {
    caddq(barrett_reduce(a))
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(R_MOD_Q.rem_euclid(Q as i32), (1 << 16) % Q as i32);
        assert_eq!(R2_MOD_Q, (1i64 << 32).rem_euclid(Q as i64) as i32);
        assert_eq!((QINV * Q as i32) & 0xFFFF, 1);
    }

    #[test]
    fn test_barrett_reduce() {
        for a in i16::MIN..=i16::MAX {
            let r = barrett_reduce(a);
            assert!(r.abs() <= (Q - 1) / 2, "{a} -> {r}");
            assert_eq!((a as i32 - r as i32).rem_euclid(Q as i32), 0);
        }
    }

    #[test]
    fn test_caddq() {
        assert_eq!(caddq(-Q + 1), 1);
        assert_eq!(caddq(-1), Q - 1);
        assert_eq!(caddq(0), 0);
        assert_eq!(caddq(1), 1);
        assert_eq!(caddq(Q - 1), Q - 1);

        for a in -Q + 1..Q {
            assert_eq!(caddq(a), a.rem_euclid(Q));
        }
    }

    #[test]
    fn test_freeze() {
        assert_eq!(freeze(Q - 1), Q - 1);
        assert_eq!(freeze(-Q + 1), 1);
        assert_eq!(freeze(Q), 0);
        assert_eq!(freeze(-Q), 0);
        assert_eq!(freeze(i16::MIN), i16::MIN.rem_euclid(Q));
        assert_eq!(freeze(i16::MAX), i16::MAX.rem_euclid(Q));

        for a in i16::MIN..=i16::MAX {
            assert_eq!(freeze(a), a.rem_euclid(Q));
        }
    }

    #[test]
    fn test_montgomery() {
        for a in -Q + 1..Q {
            let m = to_mont(a);
            assert!(m.abs() < Q);
            assert_eq!(freeze(redc(m as i32)), a.rem_euclid(Q));
        }

        // the R factors cancel: (aR)(b)R^-1 = ab
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let a = rng.random_range(-Q + 1..Q);
            let b = rng.random_range(-Q + 1..Q);

            let expected = (a as i32 * b as i32).rem_euclid(Q as i32) as i16;
            assert_eq!(freeze(mont_mul(to_mont(a), b)), expected);
        }

        assert_eq!(freeze(redc(R_MOD_Q)), 1);
    }
}
