//! Kyber (round 2) ring arithmetic and IND-CPA public key encryption.
//!
//! The ring is Z_3329\[X\]/(X^256 + 1). The three parameter sets only differ
//! in module rank and ciphertext compression, see [`KyberParams`].
mod compress;
mod poly;
pub mod reduce;

pub use poly::{Poly, PolyMatrix, PolyVec, POLY_BYTES};

use zeroize::Zeroize;

use crate::{
    backend::{Backend, DefaultBackend},
    encode,
    error::{to_array, Error},
    hash,
};

pub const N: usize = 256;
pub const Q: i16 = 3329;
pub const SYMBYTES: usize = 32;

/// Twiddle factor of the NTT.
///
/// `value` is used as the Montgomery multiplier, the twisted form
/// `value * Q^-1 mod 2^16` is kept alongside for backends that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zeta {
    value: i16,
    twisted: i16,
}

impl Zeta {
    pub const fn new(value: i16) -> Self {
        Self {
            value,
            twisted: value.wrapping_mul(reduce::QINV as i16),
        }
    }

    pub const fn value(&self) -> i16 {
        self.value
    }

    pub const fn twisted(&self) -> i16 {
        self.twisted
    }
}

/// pre-computed zetas in montgomery form
/// ordered by ZETAS\[i\] = z^BitRev7(i)
/// zeta -> zeta * R (mod Q)
pub const ZETAS: [Zeta; 128] = {
    const ZETA1: i16 = reduce::to_mont(17);

    let mut zetas = [0; 128];
    zetas[0] = reduce::R_MOD_Q as i16;

    let mut i = 1;
    while i < 128 {
        zetas[i] = reduce::mont_mul(zetas[i - 1], ZETA1);

        i += 1
    }

    let mut zetas_bitrev = [Zeta::new(0); 128];

    i = 0;
    while i < 128 {
        let idx = (i as u8).reverse_bits() >> 1;

        zetas_bitrev[i] = Zeta::new(match zetas[idx as usize] {
            z if z > Q / 2 => z - Q,
            z if z < -Q / 2 => z + Q,
            z => z,
        });

        i += 1;
    }

    zetas_bitrev
};

/// Kyber parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KyberParams {
    pub name: &'static str,
    /// module rank
    pub k: usize,
    /// bits per coefficient of the compressed vector `u`
    pub du: usize,
    /// bits per coefficient of the compressed polynomial `v`
    pub dv: usize,
}

impl KyberParams {
    pub const fn public_key_bytes(&self) -> usize {
        self.k * POLY_BYTES + SYMBYTES
    }

    pub const fn secret_key_bytes(&self) -> usize {
        self.k * POLY_BYTES
    }

    pub const fn ciphertext_bytes(&self) -> usize {
        self.k * encode::packed_bytes(N, self.du) + encode::packed_bytes(N, self.dv)
    }
}

pub const KYBER512: KyberParams = KyberParams {
    name: "Kyber512",
    k: 2,
    du: 10,
    dv: 3,
};

pub const KYBER768: KyberParams = KyberParams {
    name: "Kyber768",
    k: 3,
    du: 10,
    dv: 4,
};

pub const KYBER1024: KyberParams = KyberParams {
    name: "Kyber1024",
    k: 4,
    du: 11,
    dv: 5,
};

/// Packed public key: `t` followed by the matrix seed `rho`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey<const BYTES: usize> {
    bytes: [u8; BYTES],
}

/// Packed secret vector `s`, in the NTT domain.
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
            bytes: to_array("kyber public key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for SecretKey<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("kyber secret key", bytes)?,
        })
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Ciphertext<BYTES> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_array("kyber ciphertext", bytes)?,
        })
    }
}

/// Deterministic key generation from a 32 byte seed.
fn keypair<const K: usize, const PK: usize, const SK: usize>(
    seed: &[u8; SYMBYTES],
) -> (PublicKey<PK>, SecretKey<SK>) {
    log::trace!("kyber keypair, k = {}, backend {}", K, DefaultBackend::NAME);

    let (rho, mut sigma) = hash::sha3_512_split(&[seed]);

    let a = PolyMatrix::<K>::generate(&rho, false);

    let mut s = PolyVec::<K>::getnoise(&sigma, 0);
    let mut e = PolyVec::<K>::getnoise(&sigma, K as u8);
    sigma.zeroize();

    s.ntt();
    e.ntt();

    // t = A * s + e, the products carry R^-1
    let mut t = &a * &s;
    t.to_mont();
    t += &e;
    t.reduce();

    let mut pk = PublicKey { bytes: [0u8; PK] };
    let (t_bytes, rho_bytes) = pk.bytes.split_at_mut(PolyVec::<K>::BYTES);
    t.to_bytes(t_bytes);
    rho_bytes.copy_from_slice(&rho);

    let mut sk = SecretKey { bytes: [0u8; SK] };
    s.to_bytes(&mut sk.bytes);

    (pk, sk)
}

fn encrypt<const K: usize, const DU: usize, const DV: usize, const PK: usize, const CT: usize>(
    pk: &PublicKey<PK>,
    m: &[u8; SYMBYTES],
    coins: &[u8; SYMBYTES],
) -> Ciphertext<CT> {
    let (t_bytes, rho) = pk.bytes.split_at(PolyVec::<K>::BYTES);
    let t = PolyVec::<K>::from_bytes(t_bytes);

    let mut seed = [0u8; SYMBYTES];
    seed.copy_from_slice(rho);
    let at = PolyMatrix::<K>::generate(&seed, true);

    let mut sp = PolyVec::<K>::getnoise(coins, 0);
    let ep = PolyVec::<K>::getnoise(coins, K as u8);
    let epp = Poly::getnoise(coins, 2 * K as u8);

    sp.ntt();

    // u = A^T * r + e1
    let mut bp = &at * &sp;
    bp.invntt();
    bp += &ep;
    bp.reduce();

    // v = t^T * r + e2 + m
    let mut v = &t * &sp;
    v.invntt();
    v += &epp;
    v += &Poly::from_msg(m);
    v.reduce();

    let mut ct = Ciphertext { bytes: [0u8; CT] };
    let (c1, c2) = ct.bytes.split_at_mut(K * encode::packed_bytes(N, DU));
    bp.compress::<DU>(c1);
    v.compress::<DV>(c2);

    ct
}

fn decrypt<const K: usize, const DU: usize, const DV: usize, const SK: usize, const CT: usize>(
    sk: &SecretKey<SK>,
    ct: &Ciphertext<CT>,
) -> [u8; SYMBYTES] {
    let (c1, c2) = ct.bytes.split_at(K * encode::packed_bytes(N, DU));

    let mut bp = PolyVec::<K>::decompress::<DU>(c1);
    let mut v = Poly::decompress::<DV>(c2);

    let s = PolyVec::<K>::from_bytes(&sk.bytes);

    bp.ntt();
    let mut mp = &s * &bp;
    mp.invntt();

    v -= &mp;
    v.reduce();

    let mut m = [0u8; SYMBYTES];
    v.to_msg(&mut m);
    m
}

pub mod kyber512 {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, SYMBYTES};

    pub const PARAMS: super::KyberParams = super::KYBER512;

    const K: usize = PARAMS.k;
    const DU: usize = PARAMS.du;
    const DV: usize = PARAMS.dv;

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed: &[u8; SYMBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<K, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        crate::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; SYMBYTES], coins: &[u8; SYMBYTES]) -> Ciphertext {
        super::encrypt::<K, DU, DV, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; SYMBYTES] {
        super::decrypt::<K, DU, DV, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct)
    }
}

pub mod kyber768 {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, SYMBYTES};

    pub const PARAMS: super::KyberParams = super::KYBER768;

    const K: usize = PARAMS.k;
    const DU: usize = PARAMS.du;
    const DV: usize = PARAMS.dv;

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed: &[u8; SYMBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<K, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        crate::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; SYMBYTES], coins: &[u8; SYMBYTES]) -> Ciphertext {
        super::encrypt::<K, DU, DV, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; SYMBYTES] {
        super::decrypt::<K, DU, DV, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct)
    }
}

pub mod kyber1024 {
    use super::{Ciphertext as Ct, PublicKey as Pk, SecretKey as Sk, SYMBYTES};

    pub const PARAMS: super::KyberParams = super::KYBER1024;

    const K: usize = PARAMS.k;
    const DU: usize = PARAMS.du;
    const DV: usize = PARAMS.dv;

    pub const PUBLIC_KEY_BYTES: usize = PARAMS.public_key_bytes();
    pub const SECRET_KEY_BYTES: usize = PARAMS.secret_key_bytes();
    pub const CIPHERTEXT_BYTES: usize = PARAMS.ciphertext_bytes();

    pub type PublicKey = Pk<PUBLIC_KEY_BYTES>;
    pub type SecretKey = Sk<SECRET_KEY_BYTES>;
    pub type Ciphertext = Ct<CIPHERTEXT_BYTES>;

    pub fn keypair(seed: &[u8; SYMBYTES]) -> (PublicKey, SecretKey) {
        super::keypair::<K, PUBLIC_KEY_BYTES, SECRET_KEY_BYTES>(seed)
    }

    pub fn keygen(rng: &mut impl rand_core::CryptoRng) -> (PublicKey, SecretKey) {
        crate::keygen_from_rng(rng, keypair)
    }

    pub fn encrypt(pk: &PublicKey, m: &[u8; SYMBYTES], coins: &[u8; SYMBYTES]) -> Ciphertext {
        super::encrypt::<K, DU, DV, PUBLIC_KEY_BYTES, CIPHERTEXT_BYTES>(pk, m, coins)
    }

    pub fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> [u8; SYMBYTES] {
        super::decrypt::<K, DU, DV, SECRET_KEY_BYTES, CIPHERTEXT_BYTES>(sk, ct)
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(kyber512::PUBLIC_KEY_BYTES, 800);
        assert_eq!(kyber512::SECRET_KEY_BYTES, 768);
        assert_eq!(kyber512::CIPHERTEXT_BYTES, 736);

        assert_eq!(kyber768::PUBLIC_KEY_BYTES, 1184);
        assert_eq!(kyber768::SECRET_KEY_BYTES, 1152);
        assert_eq!(kyber768::CIPHERTEXT_BYTES, 1088);

        assert_eq!(kyber1024::PUBLIC_KEY_BYTES, 1568);
        assert_eq!(kyber1024::SECRET_KEY_BYTES, 1536);
        assert_eq!(kyber1024::CIPHERTEXT_BYTES, 1568);
    }

    #[test]
    fn test_zetas() {
        // psi = 17 is a primitive 256-th root of unity
        assert_eq!(reduce::freeze(reduce::redc(ZETAS[0].value() as i32)), 1);
        assert_eq!(reduce::freeze(reduce::redc(ZETAS[64].value() as i32)), 17);
        assert_eq!(reduce::freeze(reduce::redc(ZETAS[1].value() as i32)), 1729);

        for zeta in ZETAS {
            assert!(zeta.value().abs() <= Q / 2);
        }
    }

    #[test]
    fn test_fixed_coins() {
        let seed = [1u8; 32];
        let m = *b"fixed thirty-two byte message!!!";
        let coins = [2u8; 32];

        let (pk, sk) = kyber512::keypair(&seed);
        let ct = kyber512::encrypt(&pk, &m, &coins);
        assert_eq!(kyber512::decrypt(&sk, &ct), m);

        let (pk, sk) = kyber768::keypair(&seed);
        let ct = kyber768::encrypt(&pk, &m, &coins);
        assert_eq!(kyber768::decrypt(&sk, &ct), m);

        let (pk, sk) = kyber1024::keypair(&seed);
        let ct = kyber1024::encrypt(&pk, &m, &coins);
        assert_eq!(kyber1024::decrypt(&sk, &ct), m);

        // deterministic
        let (pk2, _) = kyber1024::keypair(&seed);
        assert_eq!(pk, pk2);
        assert_eq!(kyber1024::encrypt(&pk2, &m, &coins), ct);
    }

    #[test]
    fn test_pke_random() {
        let mut rng = rand::rng();

        for _ in 0..20 {
            let mut m = [0u8; 32];
            let mut coins = [0u8; 32];

            rng.fill_bytes(&mut m);
            rng.fill_bytes(&mut coins);
            let (pk, sk) = kyber512::keygen(&mut rng);
            assert_eq!(kyber512::decrypt(&sk, &kyber512::encrypt(&pk, &m, &coins)), m);

            rng.fill_bytes(&mut m);
            rng.fill_bytes(&mut coins);
            let (pk, sk) = kyber768::keygen(&mut rng);
            assert_eq!(kyber768::decrypt(&sk, &kyber768::encrypt(&pk, &m, &coins)), m);

            rng.fill_bytes(&mut m);
            rng.fill_bytes(&mut coins);
            let (pk, sk) = kyber1024::keygen(&mut rng);
            assert_eq!(kyber1024::decrypt(&sk, &kyber1024::encrypt(&pk, &m, &coins)), m);
        }
    }

    #[test]
    fn test_wrong_key() {
        let mut rng = rand::rng();
        let m = [0x5A; 32];

        let (pk, _) = kyber768::keygen(&mut rng);
        let (_, sk) = kyber768::keygen(&mut rng);

        let ct = kyber768::encrypt(&pk, &m, &[0u8; 32]);
        assert_ne!(kyber768::decrypt(&sk, &ct), m);
    }

    #[test]
    fn test_from_slice() {
        let (pk, sk) = kyber512::keypair(&[9u8; 32]);
        let ct = kyber512::encrypt(&pk, &[3u8; 32], &[4u8; 32]);

        let pk2 = kyber512::PublicKey::try_from(&pk.as_bytes()[..]).unwrap();
        let sk2 = kyber512::SecretKey::try_from(&sk.as_bytes()[..]).unwrap();
        let ct2 = kyber512::Ciphertext::try_from(&ct.as_bytes()[..]).unwrap();
        assert_eq!(kyber512::decrypt(&sk2, &ct2), [3u8; 32]);
        assert_eq!(kyber512::encrypt(&pk2, &[3u8; 32], &[4u8; 32]), ct);

        let err = kyber512::Ciphertext::try_from(&ct.as_bytes()[1..]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLength {
                what: "kyber ciphertext",
                expected: 736,
                actual: 735
            }
        );

        assert!(kyber768::PublicKey::try_from(&pk.as_bytes()[..]).is_err());
    }
}
