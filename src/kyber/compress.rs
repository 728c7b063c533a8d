use super::{reduce::caddq, Q};

/// x -> round((2^D / Q) * x) (mod 2^D), for x in (-Q, Q)
pub const fn compress<const D: usize>(x: i16) -> u16 {
    let x = caddq(x) as u32;

    // Q is odd, so no value sits exactly halfway and the rounding offset is floor(Q / 2)
    let div = ((x << D) + Q as u32 / 2) / Q as u32;

    (div & ((1 << D) - 1)) as u16
}

/// y -> round((Q / 2^D) * y)
pub const fn decompress<const D: usize>(y: u16) -> i16 {
    let y = y as u32 * Q as u32;

    ((y + (1 << (D - 1))) >> D) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress_matches_float<const D: usize>() {
        for i in -Q + 1..Q {
            let expected = i.rem_euclid(Q) as f64 * 2f64.powi(D as i32) / Q as f64;
            assert_eq!(compress::<D>(i), expected.round() as u16 % (1 << D));
        }

        for y in 0..(1 << D) {
            let expected = y as f64 * Q as f64 / 2f64.powi(D as i32);
            assert_eq!(decompress::<D>(y), expected.round() as i16);
            assert_eq!(compress::<D>(decompress::<D>(y)), y);
        }
    }

    #[test]
    fn test_compress() {
        compress_matches_float::<1>();
        compress_matches_float::<3>();
        compress_matches_float::<4>();
        compress_matches_float::<5>();
        compress_matches_float::<10>();
        compress_matches_float::<11>();
    }

    #[test]
    fn test_message_bits() {
        assert_eq!(decompress::<1>(0), 0);
        assert_eq!(decompress::<1>(1), 1665);

        assert_eq!(compress::<1>(832), 0);
        assert_eq!(compress::<1>(833), 1);
        assert_eq!(compress::<1>(2496), 1);
        assert_eq!(compress::<1>(2497), 0);
        assert_eq!(compress::<1>(-1), 0);
    }
}
