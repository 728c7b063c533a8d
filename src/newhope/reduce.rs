use super::Q;

/// -Q^-1 mod 2^18
pub const QINV: u32 = 12287;
pub const R_LOG: u32 = 18;
pub const R_MASK: u32 = (1 << R_LOG) - 1;

pub const R_MOD_Q: u32 = 4075; // 2^18 mod Q
pub const R2_MOD_Q: u32 = 3186; // (2^18)^2 mod Q

/// map a -> aR^{-1} (mod Q), result in [0, 2Q) for a < Q * 2^16
pub const fn montgomery_reduce(a: u32) -> u16 {
    let u = a.wrapping_mul(QINV) & R_MASK;

    ((a + u * Q as u32) >> R_LOG) as u16
}

/// map a in [0, 2Q) to [0, Q)
pub const fn csubq(a: u16) -> u16 {
    let r = a.wrapping_sub(Q) as i16;

    (r + ((r >> 15) & Q as i16)) as u16
}

/// map a -> a (mod Q), result in [0, Q)
pub const fn freeze(a: u16) -> u16 {
    // 5 / 2^16 is just below 1 / Q, the quotient is off by at most one
    let q = ((a as u32 * 5) >> 16) as u16;

    csubq(a - q * Q)
}

/// map a -> aR (mod Q), result in [0, Q)
pub const fn to_mont(a: u16) -> u16 {
    csubq(montgomery_reduce(a as u32 * R2_MOD_Q))
}

pub const fn add(a: u16, b: u16) -> u16 {
    csubq(a + b)
}

pub const fn sub(a: u16, b: u16) -> u16 {
    csubq(a + Q - b)
}

/// |a - Q/2| for a in [0, Q)
pub const fn flipabs(a: u16) -> u16 {
    let r = a as i16 - (Q / 2) as i16;

    r.unsigned_abs()
}
