//! Lattice-based post-quantum primitives on top of the Keccak sponge family.
//!
//! The crate covers the [hash] functions (SHAKE, cSHAKE and SHA3), and the
//! ring arithmetic and IND-CPA encryption of [Kyber](kyber), [NewHope](newhope)
//! and the [Saber](saber) family. Every hot primitive runs through a
//! [`Backend`](backend::Backend); the `accel` feature swaps the portable
//! engines for accelerated ones without changing a single output bit.

#![cfg_attr(not(test), no_std)]
#![allow(clippy::identity_op)]

pub mod backend;
pub mod encode;
pub mod error;
pub mod hash;
pub mod keccak;
pub mod kyber;
pub mod newhope;
pub mod sample;
pub mod saber;

pub use error::Error;

use zeroize::Zeroize;

/// Run a deterministic `keypair` on a fresh 32 byte seed from `rng`.
pub(crate) fn keygen_from_rng<T>(
    rng: &mut impl rand_core::CryptoRng,
    keypair: impl FnOnce(&[u8; 32]) -> T,
) -> T {
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);

    let keys = keypair(&seed);
    seed.zeroize();

    keys
}
