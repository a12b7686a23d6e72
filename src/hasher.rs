use crate::error::PasswordHashError;
use crate::lexer::TokenizedHash;

use base64::alphabet::BCRYPT;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// The lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// The highest cost bcrypt accepts
pub const MAX_COST: u32 = 31;

/// The cost used when none is specified. This matches the default of most other bcrypt
/// implementations, so hashes generated here won't look stale to them (or vice versa).
pub const DEFAULT_COST: u32 = 10;

/// bcrypt only mixes the first 72 bytes of a password into the hash. Longer passwords are
/// rejected when hashing rather than silently truncated.
pub const MAX_PASSWORD_LEN: usize = 72;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 23;

const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(&BCRYPT, NO_PAD);

/// The revision of the bcrypt format, identified by the letter after `$2` in a hash string.
///
/// This crate computes all four revisions the same way; they differ only in how historical
/// implementations handled non-ASCII and very long passwords. `2b` is the current revision
/// and a good default. The others are accepted so that hashes written by other software can
/// be verified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Version {
    /// `$2a$`, the original revision
    #[serde(rename = "2a")]
    TwoA,

    /// `$2b$`, the current OpenBSD revision
    #[default]
    #[serde(rename = "2b")]
    TwoB,

    /// `$2x$`, used by crypt_blowfish to mark hashes from its buggy releases
    #[serde(rename = "2x")]
    TwoX,

    /// `$2y$`, used by crypt_blowfish (and PHP) for corrected hashes
    #[serde(rename = "2y")]
    TwoY,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self {
            Version::TwoA => "2a",
            Version::TwoB => "2b",
            Version::TwoX => "2x",
            Version::TwoY => "2y",
        };

        f.write_str(v)
    }
}

impl From<Version> for bcrypt::Version {
    fn from(version: Version) -> Self {
        match version {
            Version::TwoA => bcrypt::Version::TwoA,
            Version::TwoB => bcrypt::Version::TwoB,
            Version::TwoX => bcrypt::Version::TwoX,
            Version::TwoY => bcrypt::Version::TwoY,
        }
    }
}

/// A builder for a hash. The salt is always generated internally using a
/// cryptographically-secure random number generator and can't be supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct Hasher {
    cost: u32,
    version: Version,
}

impl Default for Hasher {
    /// Create a new `Hasher` with default values.
    ///
    /// The defaults are as follows:
    ///
    /// * Cost: 10 (2^10 rounds of the key schedule)
    /// * Version: 2b
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
            version: Version::TwoB,
        }
    }
}

impl Hasher {
    /// Create a new `Hasher` with default values. See [`Hasher::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The work factor for the hash. Each increment doubles the time it takes to compute
    /// (and to brute-force) the hash. Must be between [`MIN_COST`] and [`MAX_COST`],
    /// inclusive; anything else is rejected by [`Hasher::hash()`], never clamped.
    ///
    /// Pick the highest cost your login path can afford. On current hardware, 10 takes
    /// somewhere around 50-100 milliseconds.
    pub fn cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// The revision prefix written into the hash string. Unless the hash must be read by
    /// software that only understands an older prefix, leave this as the default `2b`.
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Consumes the `Hasher` and returns a hash.
    ///
    /// Fails with [`PasswordHashError::InvalidCost`] if the cost is out of range and with
    /// [`PasswordHashError::PasswordTooLong`] if the password is longer than
    /// [`MAX_PASSWORD_LEN`] bytes.
    ///
    /// This is an expensive operation. For some applications, it might make sense to move this
    /// operation to a separate thread (see `hash_async()` with the `tokio` feature) to avoid
    /// blocking latency-sensitive threads.
    pub fn hash<P>(self, password: &P) -> Result<Hash, PasswordHashError>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        if !(MIN_COST..=MAX_COST).contains(&self.cost) {
            return Err(PasswordHashError::InvalidCost(self.cost));
        }

        let password = password.as_ref();

        if password.len() > MAX_PASSWORD_LEN {
            return Err(PasswordHashError::PasswordTooLong(password.len()));
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt)?;

        let parts = bcrypt::hash_with_salt(password, self.cost, salt)?;
        let hash = Hash::from_str(&parts.format_for_version(self.version.into()))?;

        debug!(cost = self.cost, version = %self.version, "Generated bcrypt hash");

        Ok(hash)
    }
}

#[cfg(feature = "tokio")]
impl Hasher {
    /// Like [`Hasher::hash()`], but runs on tokio's blocking thread pool so that async
    /// executor threads stay responsive. The password is copied into a buffer that is zeroed
    /// once hashing completes.
    pub async fn hash_async<P>(self, password: &P) -> Result<Hash, PasswordHashError>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        let password = zeroize::Zeroizing::new(password.as_ref().to_vec());
        tokio::task::spawn_blocking(move || self.hash(&*password)).await?
    }
}

/// A container for a bcrypt hash, the salt that was used to generate it, and the parameters
/// used for hashing
///
/// `Hash` has no `==`: a byte-by-byte digest comparison is not constant-time. Always
/// check passwords with [`Hash::verify()`].
#[derive(Clone, Debug)]
pub struct Hash {
    version: Version,
    cost: u32,
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl fmt::Display for Hash {
    /// Generates a hash string. Aside from the hash, the hash string also includes the salt
    /// and cost used to generate the hash, making it easy to store in a database. The format
    /// is the one shared by every bcrypt implementation, so other libraries (in any language)
    /// can verify it.
    ///
    /// A hash string looks something like this:
    ///
    /// _$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy_
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.version,
            self.cost,
            BCRYPT_B64.encode(self.salt),
            BCRYPT_B64.encode(self.digest),
        )
    }
}

impl FromStr for Hash {
    type Err = PasswordHashError;

    /// Deserializes a hash string into parts (the version, the cost, the salt, and the
    /// digest). Fails with [`PasswordHashError::MalformedHash`] if the string is not a
    /// well-formed bcrypt hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokenized_hash = TokenizedHash::from_str(s)?;

        if !(MIN_COST..=MAX_COST).contains(&tokenized_hash.cost) {
            return Err(PasswordHashError::MalformedHash("Cost is out of range"));
        }

        let salt: [u8; SALT_LEN] = match BCRYPT_B64.decode(tokenized_hash.b64_salt) {
            Ok(s) => s.try_into().map_err(|_| {
                PasswordHashError::MalformedHash("Salt has the wrong length")
            })?,
            Err(_) => {
                return Err(PasswordHashError::MalformedHash(
                    "Invalid base64-encoded salt",
                ))
            }
        };

        let digest: [u8; DIGEST_LEN] = match BCRYPT_B64.decode(tokenized_hash.b64_digest) {
            Ok(d) => d.try_into().map_err(|_| {
                PasswordHashError::MalformedHash("Hash has the wrong length")
            })?,
            Err(_) => {
                return Err(PasswordHashError::MalformedHash(
                    "Invalid base64-encoded hash",
                ))
            }
        };

        Ok(Self {
            version: tokenized_hash.version,
            cost: tokenized_hash.cost,
            salt,
            digest,
        })
    }
}

impl Hash {
    /// Returns a reference to a byte slice of the computed digest.
    pub fn as_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Returns a reference to a byte slice of the salt used to generate the hash.
    pub fn salt_bytes(&self) -> &[u8] {
        &self.salt
    }

    /// Returns the cost the hash was generated with.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Returns the revision prefix of the hash.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Checks whether the hash was generated with a cost lower than `min_cost`. A hash that
    /// needs rehashing is still valid; rehash the password the next time it is successfully
    /// verified.
    pub fn needs_rehash(&self, min_cost: u32) -> bool {
        self.cost < min_cost
    }

    /// Checks if the hash matches the provided password. The comparison itself is done in
    /// constant time by the bcrypt primitive.
    ///
    /// Because verification requires re-hashing the password, this is an expensive operation.
    pub fn verify<P>(&self, password: &P) -> bool
    where
        P: AsRef<[u8]> + ?Sized,
    {
        self.try_verify(password).unwrap_or_else(|e| {
            debug!("bcrypt rejected a parsed hash: {e}");
            false
        })
    }

    /// Like [`Hash::verify()`], but reports a failure inside the bcrypt primitive as
    /// [`PasswordHashError::Primitive`] instead of treating it as a mismatch.
    ///
    /// Passwords longer than [`MAX_PASSWORD_LEN`] bytes are not rejected here; only their first
    /// 72 bytes are compared, as every other bcrypt implementation does.
    pub fn try_verify<P>(&self, password: &P) -> Result<bool, PasswordHashError>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        let matches = bcrypt::verify(password.as_ref(), &self.to_string())?;
        trace!(matches, cost = self.cost, "Verified password against bcrypt hash");

        Ok(matches)
    }
}

#[cfg(feature = "tokio")]
impl Hash {
    /// Like [`Hash::verify()`], but runs on tokio's blocking thread pool. The password is
    /// copied into a buffer that is zeroed once verification completes.
    pub async fn verify_async<P>(&self, password: &P) -> Result<bool, PasswordHashError>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        let hash = self.clone();
        let password = zeroize::Zeroizing::new(password.as_ref().to_vec());

        tokio::task::spawn_blocking(move || hash.try_verify(&*password)).await?
    }
}

/// Hashes a password with [`DEFAULT_COST`] and returns the hash string.
pub fn hash_password<P>(password: &P) -> Result<String, PasswordHashError>
where
    P: AsRef<[u8]> + ?Sized,
{
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hashes a password with the given cost and returns the hash string. A cost that came from
/// configuration is validated here; out-of-range values produce
/// [`PasswordHashError::InvalidCost`].
pub fn hash_password_with_cost<P>(password: &P, cost: u32) -> Result<String, PasswordHashError>
where
    P: AsRef<[u8]> + ?Sized,
{
    Ok(Hasher::new().cost(cost).hash(password)?.to_string())
}

/// Checks a password against a stored hash string.
///
/// Returns `Ok(false)` if the password is wrong and [`PasswordHashError::MalformedHash`] if the
/// stored hash can't be decoded, so that a corrupted record isn't mistaken for a failed login.
/// A failure inside the primitive is returned as [`PasswordHashError::Primitive`].
pub fn verify_password<P>(hash: &str, password: &P) -> Result<bool, PasswordHashError>
where
    P: AsRef<[u8]> + ?Sized,
{
    parse_stored(hash)?.try_verify(password)
}

/// Reads the cost out of a stored hash string without doing any hashing.
pub fn extract_cost(hash: &str) -> Result<u32, PasswordHashError> {
    Ok(parse_stored(hash)?.cost())
}

fn parse_stored(hash: &str) -> Result<Hash, PasswordHashError> {
    Hash::from_str(hash).map_err(|e| {
        debug!("Rejected stored hash: {e}");
        e
    })
}


#[cfg(all(test, feature = "tokio"))]
mod async_tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_async() {
        let hash = Hasher::new()
            .cost(4)
            .hash_async("@Pa$$20rd-Test")
            .await
            .unwrap();

        assert!(hash.verify_async("@Pa$$20rd-Test").await.unwrap());
        assert!(!hash.verify_async("@Pa$$20rd-Tesd").await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_async_invalid_cost() {
        assert!(matches!(
            Hasher::new().cost(3).hash_async("password").await,
            Err(PasswordHashError::InvalidCost(3))
        ));
    }
}
