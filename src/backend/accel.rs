use core::array;

use super::Backend;
use crate::{kyber, newhope, sample::CbdWidth};

/// Engines mapped onto the accelerator units.
///
/// The permutation runs as a single call, bit counting uses the population
/// count instruction and butterflies take twiddles in twisted form
/// (`zeta * q^-1 mod R`), trading the low multiplication of the Montgomery
/// reduction for a table lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accelerated;

impl Backend for Accelerated {
    const NAME: &'static str = "accelerated";

    #[inline]
    fn keccak_f1600(state: &mut [u64; 25]) {
        keccak::f1600(state);
    }

    #[inline]
    fn cbd4<W: CbdWidth>(t: u64) -> [i16; 4] {
        array::from_fn(|i| {
            let a = ((t >> (2 * i * W::K)) & W::FIELD).count_ones();
            let b = ((t >> ((2 * i + 1) * W::K)) & W::FIELD).count_ones();

            a as i16 - b as i16
        })
    }

    #[inline]
    fn kyber_fqmul(a: i16, zeta: kyber::Zeta) -> i16 {
        // a * zeta and m * Q agree on their low 16 bits, so the high halves
        // can be subtracted directly
        let hi = (a as i32 * zeta.value() as i32) >> 16;
        let m = a.wrapping_mul(zeta.twisted());
        let mq_hi = (m as i32 * kyber::Q as i32) >> 16;

        (hi - mq_hi) as i16
    }

    #[inline]
    fn newhope_fqmul(a: u16, zeta: newhope::Zeta) -> u16 {
        let u = (a as u32).wrapping_mul(zeta.twisted()) & newhope::reduce::R_MASK;
        let t = (a as u32 * zeta.value() as u32 + u * newhope::Q as u32) >> newhope::reduce::R_LOG;

        newhope::reduce::csubq(t as u16)
    }
}
