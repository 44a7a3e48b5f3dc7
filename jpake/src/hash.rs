//! Fiat-Shamir challenge hashing.
//!
//! The default transcript is compatible with the OpenSSL J-PAKE code:
//!
//! ```text
//! H( len(G) | G | len(Gr) | Gr | len(Gx) | Gx | len(id) | id )
//! ```
//!
//! where integers are written as minimal big endian bytes and every `len`
//! is a 2-byte big endian length. Encodings that prepend a zero byte to
//! integers with the top bit set (`255` as `00 ff`) produce different
//! challenges and are not interoperable.

use alloc::vec::Vec;
use core::marker::PhantomData;
use digest::Digest;
use num_bigint::BigUint;
use sha1::Sha1;

use crate::errors::{Error, Result};

/// Maps a proof transcript to the challenge scalar `h`.
pub trait ChallengeHash {
    /// Compute the challenge for `generator`, `commitment` (`G^r`),
    /// `public` (`G^x`) and the prover's `signer_id`.
    fn challenge(
        &self,
        generator: &BigUint,
        commitment: &BigUint,
        public: &BigUint,
        signer_id: &[u8],
    ) -> Result<BigUint>;
}

/// [`ChallengeHash`] over the length-prefixed transcript using digest `D`.
pub struct DigestChallenge<D: Digest = Sha1> {
    d: PhantomData<D>,
}

/// The interoperable default challenge hash.
pub type Sha1Challenge = DigestChallenge<Sha1>;

impl<D: Digest> DigestChallenge<D> {
    /// Create a new challenge hasher.
    pub const fn new() -> Self {
        Self { d: PhantomData }
    }
}

impl<D: Digest> Default for DigestChallenge<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> Clone for DigestChallenge<D> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<D: Digest> core::fmt::Debug for DigestChallenge<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("DigestChallenge")
    }
}

impl<D: Digest> ChallengeHash for DigestChallenge<D> {
    fn challenge(
        &self,
        generator: &BigUint,
        commitment: &BigUint,
        public: &BigUint,
        signer_id: &[u8],
    ) -> Result<BigUint> {
        let transcript = encode_transcript(generator, commitment, public, signer_id)?;
        Ok(BigUint::from_bytes_be(&D::digest(&transcript)))
    }
}

/// Build the length-prefixed challenge transcript.
pub fn encode_transcript(
    generator: &BigUint,
    commitment: &BigUint,
    public: &BigUint,
    signer_id: &[u8],
) -> Result<Vec<u8>> {
    let generator = generator.to_bytes_be();
    let commitment = commitment.to_bytes_be();
    let public = public.to_bytes_be();

    let mut out =
        Vec::with_capacity(8 + generator.len() + commitment.len() + public.len() + signer_id.len());
    put_prefixed(&mut out, &generator, "generator")?;
    put_prefixed(&mut out, &commitment, "commitment")?;
    put_prefixed(&mut out, &public, "public")?;
    put_prefixed(&mut out, signer_id, "signer_id")?;
    Ok(out)
}

fn put_prefixed(out: &mut Vec<u8>, bytes: &[u8], name: &'static str) -> Result<()> {
    let len = u16::try_from(bytes.len()).map_err(|_| Error::InvalidInput { name })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn transcript_layout() {
        let t = encode_transcript(
            &BigUint::from(2u32),
            &BigUint::from(256u32),
            &BigUint::from(255u32),
            b"alice",
        )
        .unwrap();
        // 255 is written as `ff`, without a sign byte
        assert_eq!(t, hex!("0001 02 0002 0100 0001 ff 0005 616c696365"));
    }

    #[test]
    fn zero_and_empty_id() {
        let t = encode_transcript(
            &BigUint::from(0u32),
            &BigUint::from(1u32),
            &(BigUint::from(1u32) << 64u32),
            b"",
        )
        .unwrap();
        assert_eq!(t, hex!("0001 00 0001 01 0009 010000000000000000 0000"));
    }

    #[test]
    fn sha1_challenge() {
        let h = Sha1Challenge::new()
            .challenge(
                &BigUint::from(2u32),
                &BigUint::from(256u32),
                &BigUint::from(255u32),
                b"alice",
            )
            .unwrap();
        assert_eq!(
            h.to_bytes_be(),
            hex!("ee3d29c479104fc3c244c8344d099b7e04cd9b47")
        );

        let h = Sha1Challenge::new()
            .challenge(
                &BigUint::from(0u32),
                &BigUint::from(1u32),
                &(BigUint::from(1u32) << 64u32),
                b"",
            )
            .unwrap();
        assert_eq!(
            h.to_bytes_be(),
            hex!("04365ba0c154dde050e5f9dbcd30309bbcc20a38")
        );
    }

    #[test]
    fn other_digests() {
        let h = DigestChallenge::<sha2::Sha256>::new()
            .challenge(
                &BigUint::from(2u32),
                &BigUint::from(256u32),
                &BigUint::from(255u32),
                b"alice",
            )
            .unwrap();
        assert!(h.bits() <= 256);
        assert_ne!(h.bits(), 0);
    }

    #[test]
    fn oversized_components() {
        let huge = BigUint::from_bytes_be(&vec![0xffu8; 65_536]);
        let one = BigUint::from(1u32);

        assert_eq!(
            encode_transcript(&huge, &one, &one, b"id"),
            Err(Error::InvalidInput { name: "generator" })
        );
        assert_eq!(
            encode_transcript(&one, &one, &huge, b"id"),
            Err(Error::InvalidInput { name: "public" })
        );
        assert_eq!(
            encode_transcript(&one, &one, &one, &vec![0u8; 65_536]),
            Err(Error::InvalidInput { name: "signer_id" })
        );

        let max = BigUint::from_bytes_be(&vec![0xffu8; 65_535]);
        assert!(encode_transcript(&max, &one, &one, b"id").is_ok());
    }
}
