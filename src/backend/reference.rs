use core::array;

use super::Backend;
use crate::{kyber, newhope, sample::CbdWidth};

/// Portable engines. Source of truth for every other backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reference;

const ROUNDS: usize = 24;

const RC: [u64; ROUNDS] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// rotation offsets, in the order lanes are visited by pi
const RHO: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// lane visiting order of the combined rho and pi steps
const PI: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// One Keccak round on lanes indexed as `a[x + 5y]`.
fn round(a: &mut [u64; 25], rc: u64) {
    // theta
    let c: [u64; 5] = array::from_fn(|x| a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20]);

    for x in 0..5 {
        let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);

        for y in (0..25).step_by(5) {
            a[y + x] ^= d;
        }
    }

    // rho and pi
    let mut last = a[1];
    for (&j, &r) in PI.iter().zip(RHO.iter()) {
        let t = a[j];
        a[j] = last.rotate_left(r);
        last = t;
    }

    // chi
    for y in (0..25).step_by(5) {
        let row: [u64; 5] = array::from_fn(|x| a[y + x]);

        for x in 0..5 {
            a[y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
        }
    }

    // iota
    a[0] ^= rc;
}

impl Backend for Reference {
    const NAME: &'static str = "reference";

    fn keccak_f1600(state: &mut [u64; 25]) {
        for rc in RC {
            round(state, rc);
        }
    }

    fn cbd4<W: CbdWidth>(t: u64) -> [i16; 4] {
        // every lane of W::K bits now holds the number of ones it had
        let mut d = 0;
        for j in 0..W::K {
            d += (t >> j) & W::LANES;
        }

        array::from_fn(|i| {
            let a = (d >> (2 * i * W::K)) & W::FIELD;
            let b = (d >> ((2 * i + 1) * W::K)) & W::FIELD;

            a as i16 - b as i16
        })
    }

    fn kyber_fqmul(a: i16, zeta: kyber::Zeta) -> i16 {
        kyber::reduce::mont_mul(a, zeta.value())
    }

    fn newhope_fqmul(a: u16, zeta: newhope::Zeta) -> u16 {
        let t = newhope::reduce::montgomery_reduce(a as u32 * zeta.value() as u32);
        newhope::reduce::csubq(t)
    }
}
