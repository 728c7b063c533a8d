//! Generic bit packing of small coefficients.
//!
//! Values are stored as consecutive `D`-bit fields, least significant bit
//! first, which matches every fixed-width packing used by the schemes.

/// Number of bytes taken by `n` values of `d` bits.
pub const fn packed_bytes(n: usize, d: usize) -> usize {
    n * d / 8
}

/// Pack the low `D` bits of every value into `out`.
///
/// `out` must hold exactly `packed_bytes(vals.len(), D)` bytes.
pub fn pack<const D: usize>(out: &mut [u8], vals: impl IntoIterator<Item = u16>) {
    let mask = (1u64 << D) - 1;

    let mut acc = 0u64;
    let mut bits = 0;
    let mut i = 0;

    for v in vals {
        acc |= (v as u64 & mask) << bits;
        bits += D;

        while bits >= 8 {
            out[i] = acc as u8;
            acc >>= 8;
            bits -= 8;
            i += 1;
        }
    }

    debug_assert_eq!(bits, 0);
    debug_assert_eq!(i, out.len());
}

/// Iterate over the `D`-bit values packed in `bytes`.
pub fn unpack<const D: usize>(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    let mask = (1u64 << D) - 1;

    let mut src = bytes.iter();
    let mut acc = 0u64;
    let mut bits = 0;

    core::iter::from_fn(move || {
        while bits < D {
            acc |= (*src.next()? as u64) << bits;
            bits += 8;
        }

        let v = (acc & mask) as u16;
        acc >>= D;
        bits -= D;

        Some(v)
    })
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;

    fn roundtrip<const D: usize>() {
        let mut bytes = vec![0u8; packed_bytes(256, D)];
        rand::rng().fill_bytes(&mut bytes);

        let vals: Vec<u16> = unpack::<D>(&bytes).collect();
        assert_eq!(vals.len(), 256);
        assert!(vals.iter().all(|&v| v < (1 << D)));

        let mut packed = vec![0u8; bytes.len()];
        pack::<D>(&mut packed, vals.iter().copied());
        assert_eq!(packed, bytes);
    }

    #[test]
    fn test_roundtrip() {
        roundtrip::<1>();
        roundtrip::<3>();
        roundtrip::<4>();
        roundtrip::<5>();
        roundtrip::<6>();
        roundtrip::<10>();
        roundtrip::<11>();
        roundtrip::<12>();
        roundtrip::<13>();
        roundtrip::<14>();
    }

    #[test]
    fn test_layout() {
        // two 12-bit values span three bytes
        let mut out = [0u8; 3];
        pack::<12>(&mut out, [0xABC, 0x123]);
        assert_eq!(out, [0xBC, 0x3A, 0x12]);

        // 3-bit values, eight per three bytes
        let mut out = [0u8; 3];
        pack::<3>(&mut out, [1, 2, 3, 4, 5, 6, 7, 0]);
        assert_eq!(out, [0b11_010_001, 0b0_101_100_0, 0b000_111_11]);

        // excess high bits are dropped
        let mut out = [0u8; 1];
        pack::<4>(&mut out, [0xF1, 0x02]);
        assert_eq!(out, [0x21]);
    }
}
