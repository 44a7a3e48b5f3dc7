#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! # Usage
//!
//! Alice and Bob each create a [`Session`] over the same group, with
//! distinct signer ids. The protocol is symmetric: both sides perform the
//! same operations, in either order.
//!
//! ```rust
//! use jpake::{groups::{G2048, NamedGroup}, Secret, Session};
//!
//! let group = G2048::group();
//! let mut alice = Session::new(&group, b"alice");
//! let mut bob = Session::new(&group, b"bob");
//!
//! // round 1: exchange commitments, the secret may be set before or after
//! let alice_one = alice.produce_round1()?;
//! let bob_one = bob.produce_round1()?;
//! alice.consume_round1(&bob_one)?;
//! bob.consume_round1(&alice_one)?;
//!
//! alice.set_secret(Secret::from_be_bytes(b"hunter42"))?;
//! bob.set_secret(Secret::from_be_bytes(b"hunter42"))?;
//!
//! // round 2: exchange the blinded secret
//! let alice_two = alice.produce_round2()?;
//! let bob_two = bob.produce_round2()?;
//! alice.consume_round2(&bob_two)?;
//! bob.consume_round2(&alice_two)?;
//!
//! // round 3: local only
//! assert_eq!(alice.derive_key()?, bob.derive_key()?);
//! # Ok::<(), jpake::Error>(())
//! ```
//!
//! The derived key `K` is an integer modulo `p`. Feed
//! [`Session::derive_key_bytes`] into a KDF (e.g. HKDF) to obtain symmetric
//! keys. A password mismatch is not reported by the protocol itself: the
//! two sides simply end up with different keys, which the application
//! detects when authenticated data fails to decrypt.
//!
//! # Protocol description
//!
//! All arithmetic is done modulo a prime `p` in the subgroup of order `q`
//! generated by `g`. `ZKP{x}` is a Schnorr proof of knowledge of `x`, see
//! [`zkp`].
//!
//! |       Alice                        |   Data transfer            |      Bob                           |
//! |------------------------------------|----------------------------|------------------------------------|
//! |`x1 = ${0..q}`, `x2 = ${1..q}`      |                            |`x3 = ${0..q}`, `x4 = ${1..q}`      |
//! |                                    |`g^x1, g^x2, ZKP{x1, x2}` ->|                                    |
//! |                                    |<- `g^x3, g^x4, ZKP{x3, x4}`|                                    |
//! |abort if `g^x4 = 1` or proof invalid|                            |abort if `g^x2 = 1` or proof invalid|
//! |`A = (g^(x1+x3+x4))^(x2*s)`         |`A, ZKP{x2*s}` ->           |                                    |
//! |                                    |<- `B, ZKP{x4*s}`           |`B = (g^(x1+x2+x3))^(x4*s)`         |
//! |`K = (B / g^(x2*x4*s))^x2`          |                            |`K = (A / g^(x2*x4*s))^x4`          |
//!
//! Both sides arrive at `K = g^((x1+x3)*x2*x4*s)`.
//!
//! # Resuming
//!
//! [`SessionBuilder`] accepts the private exponents, the secret and the
//! peer's values as bare integers so that an exchange can be restored after
//! a restart. Values passed this way are not verified again.
//!
//! # Security
//!
//! This library is not constant-time: `num-bigint` exponentiation leaks
//! timing information about exponents. Signer ids must differ between the
//! two ends, otherwise proofs are rejected as reflected.

#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

mod errors;
pub mod groups;
pub mod hash;
mod messages;
mod rng;
mod session;
pub mod zkp;

pub use self::{
    errors::{Error, Result},
    groups::{JpakeGroup, NamedGroup},
    hash::{ChallengeHash, DigestChallenge, Sha1Challenge},
    messages::{Round1Message, Round2Message},
    rng::RandomSource,
    session::{Secret, Session, SessionBuilder, SessionState, DEFAULT_SIGNER_ID_LEN},
    zkp::Proof,
};

pub use num_bigint::BigUint;
pub use rand_core;

#[cfg(feature = "getrandom")]
pub use rand_core::OsRng;
