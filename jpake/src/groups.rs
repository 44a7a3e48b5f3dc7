//! Finite field groups used for J-PAKE computations.
//!
//! All arithmetic happens in a subgroup of prime order `q` of the
//! multiplicative group modulo a prime `p`. The presets are DSA style
//! groups where `q` is much smaller than `p`:
//!
//! | Group   | `p` bits | `q` bits | Strength | Source                               |
//! |---------|----------|----------|----------|--------------------------------------|
//! | `G1024` | 1024     | 160      | 80       | Sun JCE DSA default group            |
//! | `G2048` | 2048     | 224      | 112      | [RFC 5114] section 2.2               |
//! | `G3072` | 3072     | 256      | 128      | FIPS 186-4 A.1.1.2 with SHA-256      |
//!
//! `G1024` is provided for compatibility with legacy deployments only.
//!
//! [RFC 5114]: https://tools.ietf.org/html/rfc5114#section-2.2

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::errors::{Error, Result};

/// Parameters `(p, g, q)` of the group all J-PAKE arithmetic happens in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JpakeGroup {
    p: BigUint,
    g: BigUint,
    q: BigUint,
}

impl JpakeGroup {
    /// Build a group from a custom triple.
    ///
    /// Checks that `2 <= g < p`, `1 < q`, `q^2 < p`, that `q` divides
    /// `p - 1` and that `g^q = 1 mod p`. Primality of `p` and `q` is not
    /// tested.
    ///
    /// The second round exponent is reduced modulo `p` for compatibility
    /// with existing peers, which only preserves its value modulo `q` when
    /// `q^2 < p`. Safe prime groups are therefore rejected.
    pub fn new(p: BigUint, g: BigUint, q: BigUint) -> Result<Self> {
        let two = BigUint::from(2u32);

        if g < two || g >= p {
            return Err(Error::InvalidInput { name: "g" });
        }
        if q <= BigUint::one() || &q * &q >= p {
            return Err(Error::InvalidInput { name: "q" });
        }
        if !((&p - 1u32) % &q).is_zero() {
            return Err(Error::InvalidInput { name: "q" });
        }
        if !g.modpow(&q, &p).is_one() {
            return Err(Error::InvalidInput { name: "g" });
        }

        Ok(Self { p, g, q })
    }

    /// Prime modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Generator of the order `q` subgroup.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Subgroup order.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Size of the modulus in bits.
    pub fn bits(&self) -> u64 {
        self.p.bits()
    }

    // base^exp % p
    pub(crate) fn pow(&self, base: &BigUint, exp: &BigUint) -> BigUint {
        base.modpow(exp, &self.p)
    }

    // a * b % p
    pub(crate) fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    pub(crate) fn reduce(&self, v: &BigUint) -> BigUint {
        v % &self.p
    }
}

/// A named, pre-validated group.
pub trait NamedGroup {
    /// Human readable name of the group.
    const NAME: &'static str;

    /// Big endian bytes of the prime modulus.
    const P: &'static [u8];

    /// Big endian bytes of the prime subgroup order, `q | p - 1`.
    const Q: &'static [u8];

    /// Big endian bytes of the subgroup generator.
    const G: &'static [u8];

    /// Approximate security strength in bits.
    const STRENGTH: u32;

    /// Instantiate the group parameters.
    fn group() -> JpakeGroup {
        JpakeGroup {
            p: BigUint::from_bytes_be(Self::P),
            g: BigUint::from_bytes_be(Self::G),
            q: BigUint::from_bytes_be(Self::Q),
        }
    }
}

macro_rules! define_group {
    ($name:ident, $bits:literal, $strength:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Copy, Clone)]
        pub struct $name;

        impl NamedGroup for $name {
            const NAME: &'static str = stringify!($name);
            const P: &'static [u8] = include_bytes!(concat!("groups/", $bits, "_p.bin"));
            const Q: &'static [u8] = include_bytes!(concat!("groups/", $bits, "_q.bin"));
            const G: &'static [u8] = include_bytes!(concat!("groups/", $bits, "_g.bin"));
            const STRENGTH: u32 = $strength;
        }
    };
}

define_group!(G1024, "1024", 80, "1024-bit modulus, 160-bit subgroup.");
define_group!(G2048, "2048", 112, "2048-bit modulus, 224-bit subgroup.");
define_group!(G3072, "3072", 128, "3072-bit modulus, 256-bit subgroup.");
