//! J-PAKE session state machine.
//!
//! A [`Session`] tracks three independent gates: whether the secret is set,
//! whether the peer's round 1 was consumed and whether the peer's round 2
//! was consumed. Outputs are computed on first request and cached, so asking
//! twice returns the same message.
//!
//! Values received from the peer are only accepted without proof
//! verification when they are passed as bare integers through
//! [`Session::resume_round1`] and [`Session::resume_round2`], e.g. when
//! restoring a session whose messages were already verified earlier.

use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::{debug, instrument, warn};

#[cfg(feature = "getrandom")]
use rand_core::OsRng;

use crate::{
    errors::{Error, Result},
    groups::JpakeGroup,
    hash::{ChallengeHash, Sha1Challenge},
    messages::{Round1Message, Round2Message},
    rng::RandomSource,
    zkp::{Proof, Schnorr},
};

/// Length of a randomly generated signer id.
pub const DEFAULT_SIGNER_ID_LEN: usize = 16;

/// Shared secret, usually derived from a password.
///
/// Must be smaller than the subgroup order `q` of the group in use.
#[derive(Clone, Eq, PartialEq)]
pub struct Secret(BigUint);

impl Secret {
    /// Wrap an integer secret.
    pub fn new(secret: BigUint) -> Self {
        Self(secret)
    }

    /// Interpret `bytes` as a big endian integer.
    ///
    /// No normalization is applied, so textual passwords must be encoded
    /// identically on both ends.
    pub fn from_be_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self(BigUint::from_bytes_be(bytes.as_ref()))
    }
}

impl From<BigUint> for Secret {
    fn from(secret: BigUint) -> Self {
        Self(secret)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Progress of a session through the protocol.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionState {
    /// The shared secret has been set.
    pub secret_set: bool,
    /// The peer's first round message has been accepted.
    pub round1_consumed: bool,
    /// The peer's second round message has been accepted.
    pub round2_consumed: bool,
}

struct RemoteRound1 {
    gx1: BigUint,
    gx2: BigUint,
    // `None` when resumed without verification
    proofs: Option<(Proof, Proof)>,
}

struct RemoteRound2 {
    a: BigUint,
    proof: Option<Proof>,
}

/// One side of a J-PAKE key agreement.
pub struct Session<'a, R, H = Sha1Challenge> {
    group: &'a JpakeGroup,
    signer_id: Vec<u8>,
    rng: R,
    hash: H,

    x1: BigUint,
    x2: BigUint,
    secret: Option<BigUint>,

    round1: Option<Round1Message>,
    remote_round1: Option<RemoteRound1>,
    round2: Option<Round2Message>,
    remote_round2: Option<RemoteRound2>,
    key: Option<BigUint>,
}

#[cfg(feature = "getrandom")]
#[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
impl<'a> Session<'a, OsRng> {
    /// Start a session identified by `signer_id`.
    ///
    /// Uses the system RNG.
    pub fn new(group: &'a JpakeGroup, signer_id: impl AsRef<[u8]>) -> Self {
        Self::new_with_rng(group, signer_id, OsRng)
    }
}

impl<'a, R: RandomSource> Session<'a, R> {
    /// Start a session identified by `signer_id` with the provided RNG.
    pub fn new_with_rng(group: &'a JpakeGroup, signer_id: impl AsRef<[u8]>, rng: R) -> Self {
        Self::from_parts(
            group,
            Some(signer_id.as_ref().to_vec()),
            rng,
            Sha1Challenge::new(),
            None,
            None,
        )
    }
}

impl<'a, R: RandomSource, H: ChallengeHash> Session<'a, R, H> {
    fn from_parts(
        group: &'a JpakeGroup,
        signer_id: Option<Vec<u8>>,
        mut rng: R,
        hash: H,
        x1: Option<BigUint>,
        x2: Option<BigUint>,
    ) -> Self {
        let signer_id = signer_id.unwrap_or_else(|| {
            let mut id = vec![0u8; DEFAULT_SIGNER_ID_LEN];
            rng.fill_random(&mut id);
            id
        });
        let x1 = x1.unwrap_or_else(|| rng.gen_scalar(&BigUint::zero(), group.q()));
        let x2 = x2.unwrap_or_else(|| rng.gen_scalar(&BigUint::one(), group.q()));

        Self {
            group,
            signer_id,
            rng,
            hash,
            x1,
            x2,
            secret: None,
            round1: None,
            remote_round1: None,
            round2: None,
            remote_round2: None,
            key: None,
        }
    }

    /// Identity bound into every proof this session produces.
    pub fn signer_id(&self) -> &[u8] {
        &self.signer_id
    }

    /// Group parameters in use.
    pub fn group(&self) -> &JpakeGroup {
        self.group
    }

    /// Which protocol steps have been completed.
    pub fn state(&self) -> SessionState {
        SessionState {
            secret_set: self.secret.is_some(),
            round1_consumed: self.remote_round1.is_some(),
            round2_consumed: self.remote_round2.is_some(),
        }
    }

    /// Proofs attached to the peer's first round, if it was verified.
    pub fn remote_round1_proofs(&self) -> Option<(&Proof, &Proof)> {
        let (zkp_x1, zkp_x2) = self.remote_round1.as_ref()?.proofs.as_ref()?;
        Some((zkp_x1, zkp_x2))
    }

    /// Proof attached to the peer's second round, if it was verified.
    pub fn remote_round2_proof(&self) -> Option<&Proof> {
        self.remote_round2.as_ref()?.proof.as_ref()
    }

    /// First round message for the peer.
    ///
    /// Always available. Repeated calls return the same message.
    pub fn produce_round1(&mut self) -> Result<Round1Message> {
        self.local_round1().cloned()
    }

    /// Verify and accept the peer's first round message.
    ///
    /// # Errors
    /// - [`Error::OutOfSequence`] if a first round was already accepted
    /// - [`Error::InvalidInput`] if `gx1` is `0 mod p` or `gx2` is `0` or
    ///   `1 mod p`
    /// - [`Error::DuplicateSigner`] or [`Error::InvalidProof`] if either
    ///   proof is rejected
    ///
    /// The session is left untouched on error.
    #[instrument(skip_all, err(Debug))]
    pub fn consume_round1(&mut self, message: &Round1Message) -> Result<()> {
        if self.remote_round1.is_some() {
            return Err(Error::OutOfSequence {
                operation: "consume_round1",
            });
        }
        let (gx1, gx2) = self.reduce_remote_round1(&message.gx1, &message.gx2)?;

        let g = self.group.g();
        let schnorr = Schnorr::new(self.group, &self.hash);
        schnorr.verify(g, &gx1, &message.zkp_x1, &self.signer_id, "zkp_x1")?;
        schnorr.verify(g, &gx2, &message.zkp_x2, &self.signer_id, "zkp_x2")?;

        self.remote_round1 = Some(RemoteRound1 {
            gx1,
            gx2,
            proofs: Some((message.zkp_x1.clone(), message.zkp_x2.clone())),
        });
        debug!("round 1 consumed");
        Ok(())
    }

    /// Accept the peer's first round values without verifying any proof.
    ///
    /// Only for restoring a session whose messages were verified before.
    pub fn resume_round1(&mut self, gx1: &BigUint, gx2: &BigUint) -> Result<()> {
        if self.remote_round1.is_some() {
            return Err(Error::OutOfSequence {
                operation: "resume_round1",
            });
        }
        let (gx1, gx2) = self.reduce_remote_round1(gx1, gx2)?;

        self.remote_round1 = Some(RemoteRound1 {
            gx1,
            gx2,
            proofs: None,
        });
        debug!("round 1 resumed without verification");
        Ok(())
    }

    /// Set the shared secret. May be called once, before or after round 1.
    ///
    /// # Errors
    /// - [`Error::OutOfSequence`] if the secret was already set
    /// - [`Error::InvalidInput`] if the secret is not smaller than `q`
    pub fn set_secret(&mut self, secret: Secret) -> Result<()> {
        if self.secret.is_some() {
            return Err(Error::OutOfSequence {
                operation: "set_secret",
            });
        }
        if secret.0 >= *self.group.q() {
            warn!("secret is not smaller than the subgroup order");
            return Err(Error::InvalidInput { name: "secret" });
        }

        self.secret = Some(secret.0);
        debug!("secret set");
        Ok(())
    }

    /// Second round message for the peer.
    ///
    /// Requires the secret and the peer's first round. Repeated calls return
    /// the same message.
    pub fn produce_round2(&mut self) -> Result<Round2Message> {
        if let Some(message) = &self.round2 {
            return Ok(message.clone());
        }

        let (secret, remote_gx1, remote_gx2) = match (&self.secret, &self.remote_round1) {
            (Some(secret), Some(remote)) => {
                (secret.clone(), remote.gx1.clone(), remote.gx2.clone())
            }
            _ => {
                return Err(Error::OutOfSequence {
                    operation: "produce_round2",
                })
            }
        };
        let gx1 = self.local_round1()?.gx1.clone();
        let group = self.group;

        // A = g^((x1 + x3 + x4) * x2 * s)
        //   = (g^x1 * g^x3 * g^x4)^(x2 * s)
        let t1 = group.mul(&group.mul(&gx1, &remote_gx1), &remote_gx2);
        // reduced mod p rather than q to stay compatible with existing peers
        let t2 = (&self.x2 * &secret) % group.p();
        let a = group.pow(&t1, &t2);

        let zkp_a = Schnorr::new(group, &self.hash).prove(
            &mut self.rng,
            &t1,
            &t2,
            &a,
            &self.signer_id,
        )?;

        let message = Round2Message { a, zkp_a };
        self.round2 = Some(message.clone());
        debug!("round 2 computed");
        Ok(message)
    }

    /// Verify and accept the peer's second round message.
    ///
    /// # Errors
    /// - [`Error::OutOfSequence`] if the first round was not consumed yet or
    ///   a second round was already accepted
    /// - [`Error::InvalidInput`] if `a` is `0 mod p`
    /// - [`Error::DuplicateSigner`] or [`Error::InvalidProof`] if the proof
    ///   is rejected
    ///
    /// The session is left untouched on error.
    #[instrument(skip_all, err(Debug))]
    pub fn consume_round2(&mut self, message: &Round2Message) -> Result<()> {
        let remote_gx1 = self.remote_round2_pending("consume_round2")?;
        let a = self.reduce_remote_round2(&message.a)?;
        let group = self.group;
        let local = self.local_round1()?;

        // the peer's generator: g^x3 * g^x1 * g^x2 from our side
        let generator = group.mul(&group.mul(&local.gx1, &local.gx2), &remote_gx1);
        Schnorr::new(group, &self.hash).verify(
            &generator,
            &a,
            &message.zkp_a,
            &self.signer_id,
            "zkp_a",
        )?;

        self.remote_round2 = Some(RemoteRound2 {
            a,
            proof: Some(message.zkp_a.clone()),
        });
        debug!("round 2 consumed");
        Ok(())
    }

    /// Accept the peer's second round value without verifying its proof.
    ///
    /// Only for restoring a session whose messages were verified before.
    pub fn resume_round2(&mut self, a: &BigUint) -> Result<()> {
        self.remote_round2_pending("resume_round2")?;
        let a = self.reduce_remote_round2(a)?;

        self.remote_round2 = Some(RemoteRound2 {
            a,
            proof: None,
        });
        debug!("round 2 resumed without verification");
        Ok(())
    }

    /// Shared key material `K`.
    ///
    /// Both sides compute the same value if and only if they used the same
    /// secret. `K` is not uniformly distributed bytes and should be passed
    /// through a KDF before use.
    pub fn derive_key(&mut self) -> Result<BigUint> {
        if let Some(key) = &self.key {
            return Ok(key.clone());
        }

        let (secret, remote_gx2, remote_a) =
            match (&self.secret, &self.remote_round1, &self.remote_round2) {
                (Some(secret), Some(round1), Some(round2)) => (secret, &round1.gx2, &round2.a),
                _ => {
                    return Err(Error::OutOfSequence {
                        operation: "derive_key",
                    })
                }
            };
        let group = self.group;

        // g^-(x4 * x2 * s) = (g^x4)^(x2 * (q - s)), valid as s < q
        let inverse = group.pow(remote_gx2, &(&self.x2 * (group.q() - secret)));

        // K = (A / g^(x4 * x2 * s))^x2
        let inner = group.mul(remote_a, &inverse);
        let key = group.pow(&inner, &self.x2);

        self.key = Some(key.clone());
        debug!("key derived");
        Ok(key)
    }

    /// [`Session::derive_key`] as minimal big endian bytes.
    pub fn derive_key_bytes(&mut self) -> Result<Vec<u8>> {
        Ok(self.derive_key()?.to_bytes_be())
    }

    fn local_round1(&mut self) -> Result<&Round1Message> {
        let message = match self.round1.take() {
            Some(message) => message,
            None => {
                let message = self.compute_round1()?;
                debug!("round 1 computed");
                message
            }
        };
        Ok(&*self.round1.insert(message))
    }

    fn compute_round1(&mut self) -> Result<Round1Message> {
        let group = self.group;
        let g = group.g();
        let schnorr = Schnorr::new(group, &self.hash);

        let gx1 = group.pow(g, &self.x1);
        let gx2 = group.pow(g, &self.x2);
        let zkp_x1 = schnorr.prove(&mut self.rng, g, &self.x1, &gx1, &self.signer_id)?;
        let zkp_x2 = schnorr.prove(&mut self.rng, g, &self.x2, &gx2, &self.signer_id)?;

        Ok(Round1Message {
            gx1,
            zkp_x1,
            gx2,
            zkp_x2,
        })
    }

    fn reduce_remote_round1(&self, gx1: &BigUint, gx2: &BigUint) -> Result<(BigUint, BigUint)> {
        let gx1 = self.group.reduce(gx1);
        let gx2 = self.group.reduce(gx2);

        if gx1.is_zero() {
            warn!("peer sent a degenerate gx1");
            return Err(Error::InvalidInput { name: "gx1" });
        }
        // g^x4 = 1 would remove x4 from the exponent of A
        if gx2.is_zero() || gx2.is_one() {
            warn!("peer sent a degenerate gx2");
            return Err(Error::InvalidInput { name: "gx2" });
        }

        Ok((gx1, gx2))
    }

    // A = 0 would force K = 0 regardless of the secret
    fn reduce_remote_round2(&self, a: &BigUint) -> Result<BigUint> {
        let a = self.group.reduce(a);
        if a.is_zero() {
            warn!("peer sent a degenerate A");
            return Err(Error::InvalidInput { name: "a" });
        }
        Ok(a)
    }

    // Returns the peer's `gx1` if round 1 is done and round 2 still open.
    fn remote_round2_pending(&self, operation: &'static str) -> Result<BigUint> {
        match (&self.remote_round1, &self.remote_round2) {
            (Some(round1), None) => Ok(round1.gx1.clone()),
            _ => Err(Error::OutOfSequence { operation }),
        }
    }
}

impl<R, H> fmt::Debug for Session<'_, R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("signer_id", &self.signer_id)
            .field("group_bits", &self.group.bits())
            .field("secret_set", &self.secret.is_some())
            .field("round1_consumed", &self.remote_round1.is_some())
            .field("round2_consumed", &self.remote_round2.is_some())
            .finish_non_exhaustive()
    }
}

/// Configures and creates a [`Session`], optionally resuming an exchange
/// that was interrupted.
pub struct SessionBuilder<'a, H = Sha1Challenge> {
    group: &'a JpakeGroup,
    hash: H,
    signer_id: Option<Vec<u8>>,
    x1: Option<BigUint>,
    x2: Option<BigUint>,
    secret: Option<Secret>,
    remote_round1: Option<(BigUint, BigUint)>,
    remote_round2: Option<BigUint>,
}

impl<'a> SessionBuilder<'a> {
    /// Start configuring a session over `group`.
    pub fn new(group: &'a JpakeGroup) -> Self {
        Self {
            group,
            hash: Sha1Challenge::new(),
            signer_id: None,
            x1: None,
            x2: None,
            secret: None,
            remote_round1: None,
            remote_round2: None,
        }
    }
}

impl<'a, H: ChallengeHash> SessionBuilder<'a, H> {
    /// Identity bound into our proofs. Defaults to
    /// [`DEFAULT_SIGNER_ID_LEN`] random bytes.
    pub fn signer_id(mut self, signer_id: impl AsRef<[u8]>) -> Self {
        self.signer_id = Some(signer_id.as_ref().to_vec());
        self
    }

    /// Use a different challenge hash. Both ends must agree on it.
    pub fn challenge_hash<H2: ChallengeHash>(self, hash: H2) -> SessionBuilder<'a, H2> {
        SessionBuilder {
            group: self.group,
            hash,
            signer_id: self.signer_id,
            x1: self.x1,
            x2: self.x2,
            secret: self.secret,
            remote_round1: self.remote_round1,
            remote_round2: self.remote_round2,
        }
    }

    /// Fixed private exponents, `x1` in `[0, q)` and `x2` in `[1, q)`.
    pub fn exponents(mut self, x1: BigUint, x2: BigUint) -> Self {
        self.x1 = Some(x1);
        self.x2 = Some(x2);
        self
    }

    /// Set the secret at construction.
    pub fn secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Peer's first round values, accepted without verification.
    pub fn remote_round1(mut self, gx1: BigUint, gx2: BigUint) -> Self {
        self.remote_round1 = Some((gx1, gx2));
        self
    }

    /// Peer's second round value, accepted without verification.
    pub fn remote_round2(mut self, a: BigUint) -> Self {
        self.remote_round2 = Some(a);
        self
    }

    /// Create the session using the provided RNG.
    pub fn build_with_rng<R: RandomSource>(self, rng: R) -> Result<Session<'a, R, H>> {
        let q = self.group.q();

        if self.remote_round2.is_some() && self.remote_round1.is_none() {
            return Err(Error::InvalidInput {
                name: "remote_round2",
            });
        }
        if matches!(&self.x1, Some(x1) if x1 >= q) {
            return Err(Error::InvalidInput { name: "x1" });
        }
        if matches!(&self.x2, Some(x2) if x2.is_zero() || x2 >= q) {
            return Err(Error::InvalidInput { name: "x2" });
        }

        let mut session =
            Session::from_parts(self.group, self.signer_id, rng, self.hash, self.x1, self.x2);

        if let Some((gx1, gx2)) = &self.remote_round1 {
            session.resume_round1(gx1, gx2)?;
        }
        if let Some(secret) = self.secret {
            session.set_secret(secret)?;
        }
        if let Some(a) = &self.remote_round2 {
            session.resume_round2(a)?;
        }

        Ok(session)
    }

    /// Create the session using the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn build(self) -> Result<Session<'a, OsRng, H>> {
        self.build_with_rng(OsRng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::{NamedGroup, G1024};
    use rand::{rngs::StdRng, SeedableRng};

    fn session<'a>(group: &'a JpakeGroup, id: &[u8], seed: u64) -> Session<'a, StdRng> {
        Session::new_with_rng(group, id, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn exponents_in_range() {
        let group = G1024::group();
        let s = session(&group, b"alice", 1);

        assert!(s.x1 < *group.q());
        assert!(!s.x2.is_zero() && s.x2 < *group.q());
        assert_eq!(s.state(), SessionState::default());
    }

    #[test]
    fn random_signer_id() {
        let group = G1024::group();
        let a = SessionBuilder::new(&group)
            .build_with_rng(StdRng::seed_from_u64(1))
            .unwrap();
        let b = SessionBuilder::new(&group)
            .build_with_rng(StdRng::seed_from_u64(2))
            .unwrap();

        assert_eq!(a.signer_id().len(), DEFAULT_SIGNER_ID_LEN);
        assert_ne!(a.signer_id(), b.signer_id());
    }

    #[test]
    fn round1_values() {
        let group = G1024::group();
        let mut s = session(&group, b"alice", 3);
        let msg = s.produce_round1().unwrap();

        assert_eq!(msg.gx1, group.pow(group.g(), &s.x1));
        assert_eq!(msg.gx2, group.pow(group.g(), &s.x2));
        assert_eq!(msg.zkp_x1.signer_id, b"alice");
        assert_eq!(msg.zkp_x2.signer_id, b"alice");
    }

    #[test]
    fn failed_consume_leaves_state() {
        let group = G1024::group();
        let mut alice = session(&group, b"alice", 4);
        let mut bob = session(&group, b"bob", 5);

        let mut msg = bob.produce_round1().unwrap();
        msg.zkp_x2.blind += 1u32;
        assert_eq!(
            alice.consume_round1(&msg),
            Err(Error::InvalidProof { proof: "zkp_x2" })
        );
        assert!(alice.remote_round1.is_none());

        let msg = bob.produce_round1().unwrap();
        alice.consume_round1(&msg).unwrap();
        assert!(alice.state().round1_consumed);
    }

    #[test]
    fn secret_range() {
        let group = G1024::group();
        let mut s = session(&group, b"alice", 6);

        assert_eq!(
            s.set_secret(Secret::new(group.q().clone())),
            Err(Error::InvalidInput { name: "secret" })
        );
        assert!(!s.state().secret_set);
        s.set_secret(Secret::new(group.q() - 1u32)).unwrap();
        assert!(s.state().secret_set);
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::from_be_bytes(b"hunter42");
        assert_eq!(format!("{secret:?}"), "Secret(..)");
    }
}
