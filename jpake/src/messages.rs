//! Messages exchanged between the two parties.

use num_bigint::BigUint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::zkp::Proof;

/// First round message: commitments to both ephemeral exponents.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Round1Message {
    /// `g^x1 mod p`
    pub gx1: BigUint,
    /// Proof of knowledge of `x1`
    pub zkp_x1: Proof,
    /// `g^x2 mod p`
    pub gx2: BigUint,
    /// Proof of knowledge of `x2`
    pub zkp_x2: Proof,
}

/// Second round message: the blinded secret.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Round2Message {
    /// `(g^x1 * g^x3 * g^x4)^(x2 * s) mod p`
    pub a: BigUint,
    /// Proof of knowledge of `x2 * s`
    pub zkp_a: Proof,
}
