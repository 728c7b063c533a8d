//! Saber (round 2) ring arithmetic and IND-CPA public key encryption.
//!
//! Both moduli are powers of two, Q = 2^13 and P = 2^10, so there is no NTT:
//! products go through [`poly_mul`] in the natural domain and reductions are
//! bit masks. Rounding from Q to P replaces the explicit error term.
pub mod poly_mul;
mod poly;

pub use poly::{Poly, PolyMatrix, PolyVec};
pub use poly_mul::{poly_mul, poly_mul_acc, schoolbook, Wrap};

use zeroize::Zeroize;

use crate::{
    backend::{Backend, DefaultBackend},
    encode,
    error::{to_array, Error},
    hash,
    sample::CbdWidth,
};

pub const N: usize = 256;
pub const EQ: usize = 13;
pub const EP: usize = 10;
pub const Q: u16 = 1 << EQ;
pub const P: u16 = 1 << EP;

pub const SEEDBYTES: usize = 32;
pub const NOISE_SEEDBYTES: usize = 32;
pub const KEYBYTES: usize = 32;

pub const POLY_BYTES: usize = encode::packed_bytes(N, EQ);
pub const POLY_COMPRESSED_BYTES: usize = encode::packed_bytes(N, EP);

/// Rounding constant for Q -> P.
const H1: u16 = 1 << (EQ - EP - 1);

/// Saber parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaberParams {
    pub name: &'static str,
    /// module rank
    pub l: usize,
    /// binomial parameter of the secret, twice the CBD width
    pub mu: usize,
    /// bits per coefficient of the ciphertext polynomial
    pub et: usize,
}

impl SaberParams {
    /// Decryption rounding constant.
    pub const fn h2(&self) -> u16 {
        (1 << (EP - 2)) - (1 << (EP - self.et - 1)) + H1
    }

    pub const fn public_key_bytes(&self) -> usize {
        self.l * POLY_COMPRESSED_BYTES + SEEDBYTES
    }

    pub const fn secret_key_bytes(&self) -> usize {
        self.l * POLY_BYTES
    }

    pub const fn ciphertext_bytes(&self) -> usize {
        self.l * POLY_COMPRESSED_BYTES + encode::packed_bytes(N, self.et)
    }
}

pub const LIGHTSABER: SaberParams = SaberParams {
    name: "LightSaber",
    l: 2,
    mu: 10,
    et: 3,
};

pub const SABER: SaberParams = SaberParams {
    name: "Saber",
    l: 3,
    mu: 8,
    et: 4,
};

pub const FIRESABER: SaberParams = SaberParams {
    name: "FireSaber",
    l: 4,
    mu: 6,
    et: 6,
};

/// Packed public key: `b` rounded to P followed by the matrix seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey<const BYTES: usize> {
    bytes: [u8; BYTES],
}

/// Packed secret vector `s`, 13 bits per coefficient.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey<const BYTES: usize> {
    bytes: [u8; BYTES],
}

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
            bytes: to_array("saber public key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for SecretKey<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("saber secret key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Ciphertext<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("saber ciphertext", bytes)?,
        })
    }
}

/// Split a public key into `b` and the matrix seed.
fn split_public<const L: usize, const PK: usize>(pk: &PublicKey<PK>) -> (PolyVec<L>, [u8; SEEDBYTES]) {
    let (b_bytes, seed_bytes) = pk.bytes.split_at(L * POLY_COMPRESSED_BYTES);

    let mut seed = [0u8; SEEDBYTES];
    seed.copy_from_slice(seed_bytes);

    (PolyVec::from_bytes::<EP>(b_bytes), seed)
}

/// Deterministic key generation. `seed_a` expands to the public matrix,
/// `seed_s` to the secret.
fn keypair<const L: usize, W: CbdWidth, const PK: usize, const SK: usize>(
    seed_a: &[u8; SEEDBYTES],
    seed_s: &[u8; NOISE_SEEDBYTES],
) -> (PublicKey<PK>, SecretKey<SK>) {
    log::trace!("saber keypair, l = {}, backend {}", L, DefaultBackend::NAME);

    let mut seed = [0u8; SEEDBYTES];
    hash::shake128(&mut seed, seed_a);

    let a = PolyMatrix::<L>::generate(&seed);
    let s = PolyVec::<L>::secret::<W>(seed_s);

    // b = round(A^T * s)
    let mut b = a.mul(&s, true);
    b.round_to_p();

    let mut pk = PublicKey { bytes: [0u8; PK] };
    let (b_bytes, seed_bytes) = pk.bytes.split_at_mut(L * POLY_COMPRESSED_BYTES);
    b.to_bytes::<EP>(b_bytes);
    seed_bytes.copy_from_slice(&seed);

    let mut sk = SecretKey { bytes: [0u8; SK] };
    s.to_bytes::<EQ>(&mut sk.bytes);

    (pk, sk)
}

fn encrypt<const L: usize, W: CbdWidth, const ET: usize, const PK: usize, const CT: usize>(
    pk: &PublicKey<PK>,
    m: &[u8; KEYBYTES],
    coins: &[u8; NOISE_SEEDBYTES],
) -> Ciphertext<CT> {
    let (b, seed) = split_public::<L, PK>(pk);

    let a = PolyMatrix::<L>::generate(&seed);
    let sp = PolyVec::<L>::secret::<W>(coins);

    // b' = round(A * s')
    let mut bp = a.mul(&sp, false);
    bp.round_to_p();

    // c_m = (b^T * s' - m * P/2 + h1) >> (EP - ET)
    let mut vp = b.inner(&sp, P);
    let msg = Poly::from_msg(m);
    for (v, &bit) in vp.coeffs_mut().iter_mut().zip(msg.coeffs().iter()) {
        *v = v.wrapping_sub(bit << (EP - 1)).wrapping_add(H1) >> (EP - ET);
    }
    vp.mask(1 << ET);

    let mut ct = Ciphertext { bytes: [0u8; CT] };
    let (c1, c2) = ct.bytes.split_at_mut(L * POLY_COMPRESSED_BYTES);
    bp.to_bytes::<EP>(c1);
    vp.to_bytes::<ET>(c2);

    ct
}

fn decrypt<const L: usize, const ET: usize, const SK: usize, const CT: usize>(
    sk: &SecretKey<SK>,
    ct: &Ciphertext<CT>,
    h2: u16,
) -> [u8; KEYBYTES] {
    let (c1, c2) = ct.bytes.split_at(L * POLY_COMPRESSED_BYTES);

    let s = PolyVec::<L>::from_bytes::<EQ>(&sk.bytes);
    let bp = PolyVec::<L>::from_bytes::<EP>(c1);
    let cm = Poly::from_bytes::<ET>(c2);

    // m = (b'^T * s + h2 - c_m * 2^(EP - ET)) >> (EP - 1)
    let mut v = bp.inner(&s, P);
    for (v, &c) in v.coeffs_mut().iter_mut().zip(cm.coeffs().iter()) {
        *v = v.wrapping_add(h2).wrapping_sub(c << (EP - ET)) >> (EP - 1);
    }

    let mut m = [0u8; KEYBYTES];
    v.to_msg(&mut m);
    m
}

/// Draw both key generation seeds from `rng`.
fn keygen_from_rng<T>(
    rng: &mut impl rand_core::CryptoRng,
    keypair: impl FnOnce(&[u8; SEEDBYTES], &[u8; NOISE_SEEDBYTES]) -> T,
) -> T {
    let mut seed_a = [0u8; SEEDBYTES];
    let mut seed_s = [0u8; NOISE_SEEDBYTES];
    rng.fill_bytes(&mut seed_a);
    rng.fill_bytes(&mut seed_s);

    let keys = keypair(&seed_a, &seed_s);
    seed_s.zeroize();

    keys
}

pub mod lightsaber {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, KEYBYTES, NOISE_SEEDBYTES, SEEDBYTES};
    use crate::sample::{Cbd5, CbdWidth};

    pub const PARAMS: super::SaberParams = super::LIGHTSABER;

    const L: usize = PARAMS.l;
    const ET: usize = PARAMS.et;
    type Noise = Cbd5;
    const _: () = assert!(PARAMS.mu == 2 * <Noise as CbdWidth>::K);

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed_a: &[u8; SEEDBYTES], seed_s: &[u8; NOISE_SEEDBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<L, Noise, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed_a, seed_s)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        super::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; KEYBYTES], coins: &[u8; NOISE_SEEDBYTES]) -> Ciphertext {
        super::encrypt::<L, Noise, ET, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; KEYBYTES] {
        super::decrypt::<L, ET, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct, PARAMS.h2())
    }
}

#[allow(clippy::module_inception)]
pub mod saber {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, KEYBYTES, NOISE_SEEDBYTES, SEEDBYTES};
    use crate::sample::{Cbd4, CbdWidth};

    pub const PARAMS: super::SaberParams = super::SABER;

    const L: usize = PARAMS.l;
    const ET: usize = PARAMS.et;
    type Noise = Cbd4;
    const _: () = assert!(PARAMS.mu == 2 * <Noise as CbdWidth>::K);

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed_a: &[u8; SEEDBYTES], seed_s: &[u8; NOISE_SEEDBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<L, Noise, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed_a, seed_s)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        super::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; KEYBYTES], coins: &[u8; NOISE_SEEDBYTES]) -> Ciphertext {
        super::encrypt::<L, Noise, ET, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; KEYBYTES] {
        super::decrypt::<L, ET, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct, PARAMS.h2())
    }
}

pub mod firesaber {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, KEYBYTES, NOISE_SEEDBYTES, SEEDBYTES};
    use crate::sample::{Cbd3, CbdWidth};

    pub const PARAMS: super::SaberParams = super::FIRESABER;

    const L: usize = PARAMS.l;
    const ET: usize = PARAMS.et;
    type Noise = Cbd3;
    const _: () = assert!(PARAMS.mu == 2 * <Noise as CbdWidth>::K);

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed_a: &[u8; SEEDBYTES], seed_s: &[u8; NOISE_SEEDBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<L, Noise, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed_a, seed_s)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        super::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; KEYBYTES], coins: &[u8; NOISE_SEEDBYTES]) -> Ciphertext {
        super::encrypt::<L, Noise, ET, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; KEYBYTES] {
        super::decrypt::<L, ET, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct, PARAMS.h2())
    }
}
