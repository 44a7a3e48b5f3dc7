//! Randomness sources.

use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, RngCore};

/// Source of the random values a session consumes.
///
/// Implemented for every cryptographically secure [`RngCore`]. Custom
/// implementations are useful for reproducing known-answer tests.
pub trait RandomSource {
    /// Uniformly random integer in `[low, high)`.
    ///
    /// Callers guarantee `low < high`.
    fn gen_scalar(&mut self, low: &BigUint, high: &BigUint) -> BigUint;

    /// Fill `dest` with random bytes.
    fn fill_random(&mut self, dest: &mut [u8]);
}

impl<R: CryptoRng + RngCore + ?Sized> RandomSource for R {
    fn gen_scalar(&mut self, low: &BigUint, high: &BigUint) -> BigUint {
        self.gen_biguint_range(low, high)
    }

    fn fill_random(&mut self, dest: &mut [u8]) {
        self.fill_bytes(dest)
    }
}
