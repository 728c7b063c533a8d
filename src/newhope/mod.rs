//! NewHope ring arithmetic and CPA public key encryption.
//!
//! The ring is Z_12289\[X\]/(X^N + 1) with N = 512 or 1024. Polynomials are
//! multiplied in the NTT domain, the public key is kept there.
pub mod ntt;
mod poly;
pub mod reduce;

pub use poly::Poly;

use zeroize::Zeroize;

use crate::{
    backend::{Backend, DefaultBackend},
    error::{to_array, Error},
    hash,
};

pub const Q: u16 = 12289;
pub const SYMBYTES: usize = 32;

/// Twiddle factor of the NTT.
///
/// `value` is the Montgomery multiplier, the twisted form is
/// `value * (-Q^-1) mod 2^18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zeta {
    value: u16,
    twisted: u32,
}

impl Zeta {
    pub const fn new(value: u16) -> Self {
        Self {
            value,
            twisted: (value as u32 * reduce::QINV) & reduce::R_MASK,
        }
    }

    pub const fn value(&self) -> u16 {
        self.value
    }

    pub const fn twisted(&self) -> u32 {
        self.twisted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewHopeParams {
    pub name: &'static str,
    /// ring dimension
    pub n: usize,
}

impl NewHopeParams {
    const fn poly_bytes(&self) -> usize {
        self.n * 14 / 8
    }

    pub const fn public_key_bytes(&self) -> usize {
        self.poly_bytes() + SYMBYTES
    }

    pub const fn secret_key_bytes(&self) -> usize {
        self.poly_bytes()
    }

    pub const fn ciphertext_bytes(&self) -> usize {
        self.poly_bytes() + self.n * 3 / 8
    }
}

pub const NEWHOPE512: NewHopeParams = NewHopeParams {
    name: "NewHope512",
    n: 512,
};

pub const NEWHOPE1024: NewHopeParams = NewHopeParams {
    name: "NewHope1024",
    n: 1024,
};

/// Packed public key: `b` in the NTT domain followed by the public seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey<const BYTES: usize> {
    bytes: [u8; BYTES],
}

/// Packed secret `s` in the NTT domain.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey<const BYTES: usize> {
    bytes: [u8; BYTES],
}

/// Packed `u` in the NTT domain followed by the compressed `v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext<const BYTES: usize> {
    bytes: [u8; BYTES],
}

impl<const BYTES: usize> Drop for SecretKey<BYTES> {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl<const BYTES: usize> core::fmt::Debug for SecretKey<BYTES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

impl<const BYTES: usize> PublicKey<BYTES> {
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }
}

impl<const BYTES: usize> SecretKey<BYTES> {
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }
}

impl<const BYTES: usize> Ciphertext<BYTES> {
    pub fn as_bytes(&self) -> &[u8; BYTES] {
        &self.bytes
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for PublicKey<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("newhope public key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for SecretKey<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("newhope secret key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Ciphertext<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("newhope ciphertext", bytes)?,
        })
    }
}

fn keypair<const N: usize, const PK: usize, const SK: usize>(
    seed: &[u8; SYMBYTES],
) -> (PublicKey<PK>, SecretKey<SK>) {
    log::trace!("newhope keypair, n = {}, backend {}", N, DefaultBackend::NAME);

    let mut buf = [0u8; 2 * SYMBYTES];
    let mut z = hash::Shake256::<DefaultBackend>::init();
    z.absorb_multi(&[&[0x01], seed]);
    z.finalize().squeeze(&mut buf);

    let (public_seed, noise_seed) = buf.split_at(SYMBYTES);
    let mut public_seed_arr = [0u8; SYMBYTES];
    let mut noise_seed_arr = [0u8; SYMBYTES];
    public_seed_arr.copy_from_slice(public_seed);
    noise_seed_arr.copy_from_slice(noise_seed);
    buf.zeroize();

    let a_hat = Poly::<N>::uniform(&public_seed_arr);

    let mut s_hat = Poly::<N>::sample(&noise_seed_arr, 0);
    s_hat.ntt();

    let mut e_hat = Poly::<N>::sample(&noise_seed_arr, 1);
    e_hat.ntt();
    noise_seed_arr.zeroize();

    // b = a * s + e
    let mut b_hat = a_hat.pointwise(&s_hat);
    b_hat += &e_hat;

    let mut pk = PublicKey { bytes: [0u8; PK] };
    let (b_bytes, seed_bytes) = pk.bytes.split_at_mut(Poly::<N>::BYTES);
    b_hat.to_bytes(b_bytes);
    seed_bytes.copy_from_slice(&public_seed_arr);

    let mut sk = SecretKey { bytes: [0u8; SK] };
    s_hat.to_bytes(&mut sk.bytes);

    (pk, sk)
}

fn encrypt<const N: usize, const PK: usize, const CT: usize>(
    pk: &PublicKey<PK>,
    m: &[u8; SYMBYTES],
    coins: &[u8; SYMBYTES],
) -> Ciphertext<CT> {
    let (b_bytes, seed) = pk.bytes.split_at(Poly::<N>::BYTES);
    let b_hat = Poly::<N>::from_bytes(b_bytes);

    let mut public_seed = [0u8; SYMBYTES];
    public_seed.copy_from_slice(seed);
    let a_hat = Poly::<N>::uniform(&public_seed);

    let mut sp = Poly::<N>::sample(coins, 0);
    let mut ep = Poly::<N>::sample(coins, 1);
    let epp = Poly::<N>::sample(coins, 2);

    sp.ntt();
    ep.ntt();

    // u = a * s' + e'
    let mut u_hat = a_hat.pointwise(&sp);
    u_hat += &ep;

    // v = b * s' + e'' + m
    let mut v = b_hat.pointwise(&sp);
    v.invntt();
    v += &epp;
    v += &Poly::from_msg(m);

    let mut ct = Ciphertext { bytes: [0u8; CT] };
    let (c1, c2) = ct.bytes.split_at_mut(Poly::<N>::BYTES);
    u_hat.to_bytes(c1);
    v.compress(c2);

    ct
}

fn decrypt<const N: usize, const SK: usize, const CT: usize>(
    sk: &SecretKey<SK>,
    ct: &Ciphertext<CT>,
) -> [u8; SYMBYTES] {
    let (c1, c2) = ct.bytes.split_at(Poly::<N>::BYTES);

    let u_hat = Poly::<N>::from_bytes(c1);
    let v = Poly::<N>::decompress(c2);
    let s_hat = Poly::<N>::from_bytes(&sk.bytes);

    // s * u - v = -m + small
    let mut t = s_hat.pointwise(&u_hat);
    t.invntt();
    t -= &v;

    let mut m = [0u8; SYMBYTES];
    t.to_msg(&mut m);
    m
}

pub mod newhope512 {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, SYMBYTES};

    pub const PARAMS: super::NewHopeParams = super::NEWHOPE512;

    const N: usize = PARAMS.n;

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed: &[u8; SYMBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<N, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        crate::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; SYMBYTES], coins: &[u8; SYMBYTES]) -> Ciphertext {
        super::encrypt::<N, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; SYMBYTES] {
        super::decrypt::<N, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct)
    }
}

pub mod newhope1024 {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, SYMBYTES};

    pub const PARAMS: super::NewHopeParams = super::NEWHOPE1024;

    const N: usize = PARAMS.n;

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed: &[u8; SYMBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<N, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        crate::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; SYMBYTES], coins: &[u8; SYMBYTES]) -> Ciphertext {
        super::encrypt::<N, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; SYMBYTES] {
        super::decrypt::<N, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct)
    }
}
