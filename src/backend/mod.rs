//! Capability interface for the arithmetic engines.
//!
//! Every hot primitive of the crate, the Keccak-f\[1600\] permutation, the
//! centered binomial bit counter and the NTT butterfly multiplier, is reached
//! through [`Backend`]. Two implementations exist:
//!
//! - [`Reference`], the portable implementation that everything is tested
//!   against;
//! - [`Accelerated`], a drop-in for targets with dedicated Keccak and
//!   polynomial-arithmetic units. On commodity targets it is realised with the
//!   `keccak` crate's optimized permutation, native population count and
//!   twisted twiddle factors.
//!
//! The choice is fixed at build time through the `accel` feature and exposed
//! as [`DefaultBackend`]. Both backends are always compiled, and they must
//! produce identical results for every input.

mod accel;
mod reference;

pub use accel::Accelerated;
pub use reference::Reference;

use crate::{kyber, newhope, sample::CbdWidth};

/// Engines a backend has to provide.
pub trait Backend {
    /// Human readable name, used in trace output.
    const NAME: &'static str;

    /// Apply the 24 rounds of Keccak-f\[1600\] to `state` in place.
    fn keccak_f1600(state: &mut [u64; 25]);

    /// Split the `8 * W::K` low bits of `t` into four pairs of `W::K`-bit
    /// fields `(a, b)` and return `popcount(a) - popcount(b)` for each pair.
    fn cbd4<W: CbdWidth>(t: u64) -> [i16; 4];

    /// Montgomery product `a * zeta * 2^-16 (mod 3329)`.
    fn kyber_fqmul(a: i16, zeta: kyber::Zeta) -> i16;

    /// Montgomery product `a * zeta * 2^-18 (mod 12289)`, fully reduced.
    fn newhope_fqmul(a: u16, zeta: newhope::Zeta) -> u16;
}

/// Backend selected at build time.
#[cfg(feature = "accel")]
pub type DefaultBackend = Accelerated;

/// Backend selected at build time.
#[cfg(not(feature = "accel"))]
pub type DefaultBackend = Reference;
