//! Error types.

use core::{error, fmt};

/// [`Result`][`core::result::Result`] type with `jpake`'s [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// J-PAKE errors.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// An operation was called before its prerequisites were met, or a
    /// second time when it may only run once.
    OutOfSequence {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// A received zero-knowledge proof failed verification.
    InvalidProof {
        /// Which proof was rejected
        proof: &'static str,
    },

    /// A received proof carries our own signer identity.
    DuplicateSigner,

    /// A malformed or degenerate value was supplied.
    InvalidInput {
        /// Name of the offending value
        name: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfSequence { operation } => {
                write!(f, "out of sequence: '{operation}' is not allowed in the current state")
            }
            Error::InvalidProof { proof } => {
                write!(f, "invalid proof: '{proof}' failed verification")
            }
            Error::DuplicateSigner => write!(
                f,
                "other party uses the same signer id, each end must use a distinct id"
            ),
            Error::InvalidInput { name } => write!(f, "invalid input: bad '{name}' value"),
        }
    }
}

impl error::Error for Error {}
