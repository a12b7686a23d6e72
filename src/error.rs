use thiserror::Error;

use crate::hasher::{MAX_COST, MAX_PASSWORD_LEN, MIN_COST};

/// Errors that may occur when using this crate
///
/// A password that simply doesn't match a hash is not an error; verification returns `false`
/// in that case.
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// The requested cost is outside the range bcrypt accepts
    #[error("Invalid cost {0}: must be between {min} and {max}", min = MIN_COST, max = MAX_COST)]
    InvalidCost(u32),

    /// The password is longer than bcrypt can use without truncating it
    #[error("Password is {0} bytes long; bcrypt accepts at most {max} bytes", max = MAX_PASSWORD_LEN)]
    PasswordTooLong(usize),

    /// A hash string was expected to be valid, but could not be decoded. This usually points
    /// to corrupted or foreign data in storage rather than a wrong password.
    #[error("Malformed hash: {0}")]
    MalformedHash(&'static str),

    /// A hashing policy has parameters that contradict one another
    #[error("Invalid policy: {0}")]
    InvalidPolicy(&'static str),

    /// The operating system's secure random source could not produce a salt. Do not retry
    /// with a weaker source of randomness.
    #[error("Secure random source unavailable: {0}")]
    RandomSource(#[from] rand::Error),

    /// An error that is unhandled by the crate, but is reported by the bcrypt primitive
    #[error("Error from bcrypt: {0}")]
    Primitive(#[from] bcrypt::BcryptError),

    /// The blocking worker task running a hash or verification failed to complete
    #[cfg(feature = "tokio")]
    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
