//! Schnorr zero-knowledge proofs of discrete logarithm knowledge.
//!
//! A proof for `Gx = G^x mod p` made non-interactive with Fiat-Shamir:
//!
//! | Prover                        | Verifier                           |
//! |-------------------------------|------------------------------------|
//! | `r = ${0..q}`                 |                                    |
//! | `Gr = G^r`                    |                                    |
//! | `h = H(G, Gr, Gx, id)`        | `h = H(G, Gr, Gx, id)`             |
//! | `b = r - x * h mod q`         | accept iff `Gr == G^b * Gx^h`      |

use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::Zero;
use subtle::ConstantTimeEq;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    groups::JpakeGroup,
    hash::ChallengeHash,
    rng::RandomSource,
};

/// Non-interactive proof that the signer knows the exponent of a public value.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Proof {
    /// `G^r mod p`
    pub commitment: BigUint,
    /// `r - x * h mod q`
    pub blind: BigUint,
    /// Identity of the prover, bound into the challenge.
    pub signer_id: Vec<u8>,
}

/// Proof generation and verification within one group.
pub struct Schnorr<'a, H: ChallengeHash> {
    group: &'a JpakeGroup,
    hash: &'a H,
}

impl<'a, H: ChallengeHash> Schnorr<'a, H> {
    /// Create a prover/verifier for `group` using `hash` for challenges.
    pub fn new(group: &'a JpakeGroup, hash: &'a H) -> Self {
        Self { group, hash }
    }

    /// Prove knowledge of `exponent` such that `generator^exponent = public`.
    pub fn prove<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        generator: &BigUint,
        exponent: &BigUint,
        public: &BigUint,
        signer_id: &[u8],
    ) -> Result<Proof> {
        let q = self.group.q();

        let r = rng.gen_scalar(&BigUint::zero(), q);
        let commitment = self.group.pow(generator, &r);
        let h = self
            .hash
            .challenge(generator, &commitment, public, signer_id)?;

        // b = (r - x*h) mod q, with r < q
        let xh = (exponent * &h) % q;
        let blind = (r + q - xh) % q;

        Ok(Proof {
            commitment,
            blind,
            signer_id: signer_id.to_vec(),
        })
    }

    /// Verify that the signer of `proof` knows the exponent of `public`
    /// with respect to `generator`.
    ///
    /// `verifier_id` is our own identity: proofs carrying it are rejected
    /// as reflected. `name` labels the proof in the returned error.
    pub fn verify(
        &self,
        generator: &BigUint,
        public: &BigUint,
        proof: &Proof,
        verifier_id: &[u8],
        name: &'static str,
    ) -> Result<()> {
        if proof.signer_id == verifier_id {
            warn!(
                proof = name,
                signer_id = ?proof.signer_id,
                "peer proof carries our own signer id"
            );
            return Err(Error::DuplicateSigner);
        }

        let p = self.group.p();
        let in_range = |v: &BigUint| !v.is_zero() && v < p;
        if !in_range(public) || !in_range(&proof.commitment) {
            warn!(proof = name, "proof over a value outside [1, p)");
            return Err(Error::InvalidProof { proof: name });
        }

        let h = self
            .hash
            .challenge(generator, &proof.commitment, public, &proof.signer_id)?;

        let gb = self.group.pow(generator, &proof.blind);
        let y = self.group.pow(public, &h);
        let expected = self.group.mul(&gb, &y);

        if expected
            .to_bytes_be()
            .ct_eq(&proof.commitment.to_bytes_be())
            .into()
        {
            Ok(())
        } else {
            warn!(proof = name, "zero-knowledge proof rejected");
            Err(Error::InvalidProof { proof: name })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        groups::{NamedGroup, G1024},
        hash::Sha1Challenge,
    };
    use rand::{rngs::StdRng, SeedableRng};

    /// Returns queued values instead of random ones.
    struct Fixed(Vec<u32>);

    impl RandomSource for Fixed {
        fn gen_scalar(&mut self, _low: &BigUint, _high: &BigUint) -> BigUint {
            BigUint::from(self.0.remove(0))
        }

        fn fill_random(&mut self, dest: &mut [u8]) {
            dest.fill(0x42);
        }
    }

    fn small_group() -> JpakeGroup {
        JpakeGroup::new(199u32.into(), 61u32.into(), 11u32.into()).unwrap()
    }

    #[test]
    fn known_answer() {
        let group = small_group();
        let hash = Sha1Challenge::new();
        let schnorr = Schnorr::new(&group, &hash);

        let x = BigUint::from(3u32);
        let gx = group.pow(group.g(), &x);
        assert_eq!(gx, BigUint::from(121u32));

        let proof = schnorr
            .prove(&mut Fixed(vec![7]), group.g(), &x, &gx, b"alice")
            .unwrap();
        assert_eq!(proof.commitment, BigUint::from(188u32));
        assert_eq!(proof.blind, BigUint::from(5u32));
        assert_eq!(proof.signer_id, b"alice");

        schnorr
            .verify(group.g(), &gx, &proof, b"bob", "zkp_x1")
            .unwrap();
    }

    #[test]
    fn prove_and_verify() {
        let group = G1024::group();
        let hash = Sha1Challenge::new();
        let schnorr = Schnorr::new(&group, &hash);
        let mut rng = StdRng::seed_from_u64(1);

        let x = rng.gen_scalar(&BigUint::zero(), group.q());
        let gx = group.pow(group.g(), &x);
        let proof = schnorr.prove(&mut rng, group.g(), &x, &gx, b"alice").unwrap();

        assert!(proof.blind < *group.q());
        schnorr
            .verify(group.g(), &gx, &proof, b"bob", "zkp_x1")
            .unwrap();
    }

    #[test]
    fn tampered_proofs() {
        let group = G1024::group();
        let hash = Sha1Challenge::new();
        let schnorr = Schnorr::new(&group, &hash);
        let mut rng = StdRng::seed_from_u64(2);

        let x = rng.gen_scalar(&BigUint::zero(), group.q());
        let gx = group.pow(group.g(), &x);
        let proof = schnorr.prove(&mut rng, group.g(), &x, &gx, b"alice").unwrap();
        let rejected = Err(Error::InvalidProof { proof: "zkp_x1" });

        let mut bad = proof.clone();
        bad.commitment += 1u32;
        assert_eq!(schnorr.verify(group.g(), &gx, &bad, b"bob", "zkp_x1"), rejected);

        let mut bad = proof.clone();
        bad.blind += 1u32;
        assert_eq!(schnorr.verify(group.g(), &gx, &bad, b"bob", "zkp_x1"), rejected);

        let mut bad = proof.clone();
        bad.signer_id = b"carol".to_vec();
        assert_eq!(schnorr.verify(group.g(), &gx, &bad, b"bob", "zkp_x1"), rejected);

        let wrong_public = group.mul(&gx, group.g());
        assert_eq!(
            schnorr.verify(group.g(), &wrong_public, &proof, b"bob", "zkp_x1"),
            rejected
        );
    }

    #[test]
    fn degenerate_public_value() {
        let group = G1024::group();
        let hash = Sha1Challenge::new();
        let schnorr = Schnorr::new(&group, &hash);
        let forged = Proof {
            commitment: BigUint::zero(),
            blind: BigUint::from(12345u32),
            signer_id: b"mallory".to_vec(),
        };
        let rejected = Err(Error::InvalidProof { proof: "zkp_a" });

        // 0^h = 0 satisfies the verification equation for any blind
        let zero = BigUint::zero();
        assert_eq!(schnorr.verify(group.g(), &zero, &forged, b"alice", "zkp_a"), rejected);
        assert_eq!(schnorr.verify(group.g(), group.p(), &forged, b"alice", "zkp_a"), rejected);
    }

    #[test]
    fn reflected_proof() {
        let group = G1024::group();
        let hash = Sha1Challenge::new();
        let schnorr = Schnorr::new(&group, &hash);
        let mut rng = StdRng::seed_from_u64(3);

        let x = rng.gen_scalar(&BigUint::zero(), group.q());
        let gx = group.pow(group.g(), &x);
        let proof = schnorr.prove(&mut rng, group.g(), &x, &gx, b"alice").unwrap();

        assert_eq!(
            schnorr.verify(group.g(), &gx, &proof, b"alice", "zkp_x1"),
            Err(Error::DuplicateSigner)
        );
    }
}
