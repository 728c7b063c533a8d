//! SHAKE, cSHAKE and SHA3 instances of the Keccak sponge.
//!
//! Every instance is a [`Sponge`] with a fixed rate and padding byte. One-shot
//! helpers run the non-incremental absorb and squeeze directly on a
//! [`KeccakState`].

use crate::{
    backend::{Backend, DefaultBackend},
    keccak::{absorb, squeeze_blocks, Absorbing, KeccakState, Sponge, SpongeParams, Squeezing},
};

pub const SHAKE128_RATE: usize = 168;
pub const SHAKE256_RATE: usize = 136;
pub const SHA3_256_RATE: usize = 136;
pub const SHA3_384_RATE: usize = 104;
pub const SHA3_512_RATE: usize = 72;

pub const SHAKE_DOMAIN: u8 = 0x1F;
pub const SHA3_DOMAIN: u8 = 0x06;
pub const CSHAKE_DOMAIN: u8 = 0x04;

pub struct Shake128Params;
pub struct Shake256Params;
pub struct Sha3_256Params;
pub struct Sha3_384Params;
pub struct Sha3_512Params;

impl SpongeParams for Shake128Params {
    const RATE: usize = SHAKE128_RATE;
    const DOMAIN: u8 = SHAKE_DOMAIN;
}

impl SpongeParams for Shake256Params {
    const RATE: usize = SHAKE256_RATE;
    const DOMAIN: u8 = SHAKE_DOMAIN;
}

impl SpongeParams for Sha3_256Params {
    const RATE: usize = SHA3_256_RATE;
    const DOMAIN: u8 = SHA3_DOMAIN;
}

impl SpongeParams for Sha3_384Params {
    const RATE: usize = SHA3_384_RATE;
    const DOMAIN: u8 = SHA3_DOMAIN;
}

impl SpongeParams for Sha3_512Params {
    const RATE: usize = SHA3_512_RATE;
    const DOMAIN: u8 = SHA3_DOMAIN;
}

/// Sponges that may be squeezed to any length.
pub trait Xof: SpongeParams {}

impl Xof for Shake128Params {}
impl Xof for Shake256Params {}

pub type Shake128<B = DefaultBackend> = Sponge<Shake128Params, Absorbing, B>;
pub type Shake256<B = DefaultBackend> = Sponge<Shake256Params, Absorbing, B>;
pub type Shake128Reader<B = DefaultBackend> = Sponge<Shake128Params, Squeezing, B>;
pub type Shake256Reader<B = DefaultBackend> = Sponge<Shake256Params, Squeezing, B>;

/// cSHAKE128 context, created with [`Sponge::customized`].
pub type CShake128<B = DefaultBackend> = Shake128<B>;
/// cSHAKE256 context, created with [`Sponge::customized`].
pub type CShake256<B = DefaultBackend> = Shake256<B>;

pub type Sha3_256<B = DefaultBackend> = Sponge<Sha3_256Params, Absorbing, B>;
pub type Sha3_384<B = DefaultBackend> = Sponge<Sha3_384Params, Absorbing, B>;
pub type Sha3_512<B = DefaultBackend> = Sponge<Sha3_512Params, Absorbing, B>;

impl<P: Xof, B: Backend> Sponge<P, Absorbing, B> {
    /// cSHAKE with an empty function name and a two byte customization string.
    ///
    /// The encoded customization is absorbed and permuted right away. `None`
    /// gives plain SHAKE.
    pub fn customized(cstm: Option<u16>) -> Self {
        let Some(cstm) = cstm else {
            return Self::init();
        };

        let [lo, hi] = cstm.to_le_bytes();

        // bytepad(encode_string("") || encode_string(cstm), rate)
        let mut state = KeccakState::new();
        state.xor_bytes(0, &[0x01, P::RATE as u8, 0x01, 0x00, 0x01, 16, lo, hi]);
        state.permute();

        Self::with_domain(state, CSHAKE_DOMAIN)
    }
}

impl<B: Backend> Sha3_256<B> {
    pub fn digest(self) -> [u8; 32] {
        self.finalize().squeeze_array()
    }
}

impl<B: Backend> Sha3_384<B> {
    pub fn digest(self) -> [u8; 48] {
        self.finalize().squeeze_array()
    }
}

impl<B: Backend> Sha3_512<B> {
    pub fn digest(self) -> [u8; 64] {
        self.finalize().squeeze_array()
    }
}

/// Squeeze `out.len()` bytes from an absorbed state.
fn squeeze_into<B: Backend>(state: &mut KeccakState<B>, rate: usize, out: &mut [u8]) {
    let (blocks, tail) = out.split_at_mut(out.len() - out.len() % rate);
    squeeze_blocks(state, rate, blocks);

    if !tail.is_empty() {
        state.permute();
        state.extract_bytes(0, tail);
    }
}

fn sha3<const L: usize>(rate: usize, input: &[u8]) -> [u8; L] {
    let mut state = KeccakState::<DefaultBackend>::new();
    absorb(&mut state, rate, input, SHA3_DOMAIN);

    let mut out = [0u8; L];
    squeeze_into(&mut state, rate, &mut out);
    out
}

pub fn shake128(out: &mut [u8], input: &[u8]) {
    let mut state = KeccakState::<DefaultBackend>::new();
    absorb(&mut state, SHAKE128_RATE, input, SHAKE_DOMAIN);
    squeeze_into(&mut state, SHAKE128_RATE, out);
}

pub fn shake256(out: &mut [u8], input: &[u8]) {
    let mut state = KeccakState::<DefaultBackend>::new();
    absorb(&mut state, SHAKE256_RATE, input, SHAKE_DOMAIN);
    squeeze_into(&mut state, SHAKE256_RATE, out);
}

pub fn cshake128(out: &mut [u8], cstm: Option<u16>, input: &[u8]) {
    let mut xof = CShake128::<DefaultBackend>::customized(cstm);
    xof.absorb(input);
    xof.finalize().squeeze(out);
}

pub fn cshake256(out: &mut [u8], cstm: Option<u16>, input: &[u8]) {
    let mut xof = CShake256::<DefaultBackend>::customized(cstm);
    xof.absorb(input);
    xof.finalize().squeeze(out);
}

pub fn sha3_256(input: &[u8]) -> [u8; 32] {
    sha3(SHA3_256_RATE, input)
}

pub fn sha3_384(input: &[u8]) -> [u8; 48] {
    sha3(SHA3_384_RATE, input)
}

pub fn sha3_512(input: &[u8]) -> [u8; 64] {
    sha3(SHA3_512_RATE, input)
}

/// SHA3-512 of the concatenated `src`, split in two halves.
pub fn sha3_512_split(src: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let mut h = Sha3_512::<DefaultBackend>::init();
    h.absorb_multi(src);
    let digest = h.digest();

    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a.copy_from_slice(&digest[..32]);
    b.copy_from_slice(&digest[32..]);

    (a, b)
}

/// Input of the matrix expansion XOF: the public seed followed by the column
/// and row index of the entry being sampled.
#[derive(Clone, Copy)]
pub struct XofSeed<'a> {
    pub seed: &'a [u8; 32],
    pub row: u8,
    pub col: u8,
}

impl XofSeed<'_> {
    pub fn to_bytes(&self) -> [u8; 34] {
        let mut bytes = [0u8; 34];
        bytes[..32].copy_from_slice(self.seed);
        bytes[32] = self.col;
        bytes[33] = self.row;
        bytes
    }

    /// Absorb into SHAKE128 and return the reader.
    pub fn xof(&self) -> Shake128Reader {
        let mut xof = Shake128::<DefaultBackend>::init();
        xof.absorb(&self.to_bytes());
        xof.finalize()
    }
}

/// Input of the noise PRF: a secret key and a one byte nonce.
pub struct PrfSeed<'a> {
    pub key: &'a [u8; 32],
    pub nonce: u8,
}

impl PrfSeed<'_> {
    /// out = SHAKE256(key || nonce)
    pub fn prf(&self, out: &mut [u8]) {
        let mut prf = Shake256::<DefaultBackend>::init();
        prf.absorb_multi(&[self.key, &[self.nonce]]);
        prf.finalize().squeeze(out);
    }
}
