use crate::error::PasswordHashError;
use crate::hasher::Version;

use std::str::FromStr;

/// 16 bytes, bcrypt-base64-encoded (no padding)
pub const SALT_B64_LEN: usize = 22;

/// 23 bytes, bcrypt-base64-encoded (no padding)
pub const DIGEST_B64_LEN: usize = 31;

pub struct TokenizedHash {
    pub version: Version,
    pub cost: u32,
    pub b64_salt: String,
    pub b64_digest: String,
}

impl FromStr for TokenizedHash {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum HashStates {
            Start,
            Major,
            Minor,
            VersionComplete,
            CostTens,
            CostOnes,
            CostComplete,
            Salt,
            Digest,
        }

        let mut state = HashStates::Start;

        let mut version = Version::TwoB;
        let mut cost = 0u32;

        let mut salt = String::with_capacity(SALT_B64_LEN);
        let mut digest = String::with_capacity(DIGEST_B64_LEN);

        for c in s.chars() {
            match state {
                HashStates::Start => {
                    state = match c {
                        '$' => HashStates::Major,
                        _ => return Err(PasswordHashError::MalformedHash("Must begin with $2")),
                    };
                }

                HashStates::Major => {
                    state = match c {
                        '2' => HashStates::Minor,
                        _ => {
                            return Err(PasswordHashError::MalformedHash(
                                "Unsupported algorithm; expected bcrypt",
                            ))
                        }
                    };
                }

                HashStates::Minor => {
                    version = match c {
                        'a' => Version::TwoA,
                        'b' => Version::TwoB,
                        'x' => Version::TwoX,
                        'y' => Version::TwoY,
                        _ => {
                            return Err(PasswordHashError::MalformedHash(
                                "Unsupported bcrypt version",
                            ))
                        }
                    };

                    state = HashStates::VersionComplete;
                }

                HashStates::VersionComplete => {
                    state = match c {
                        '$' => HashStates::CostTens,
                        _ => {
                            return Err(PasswordHashError::MalformedHash(
                                "Missing '$' delimiter after version",
                            ))
                        }
                    };
                }

                HashStates::CostTens => {
                    cost = match c.to_digit(10) {
                        Some(d) => d * 10,
                        None => {
                            return Err(PasswordHashError::MalformedHash(
                                "Cost must be two decimal digits",
                            ))
                        }
                    };

                    state = HashStates::CostOnes;
                }

                HashStates::CostOnes => {
                    cost += match c.to_digit(10) {
                        Some(d) => d,
                        None => {
                            return Err(PasswordHashError::MalformedHash(
                                "Cost must be two decimal digits",
                            ))
                        }
                    };

                    state = HashStates::CostComplete;
                }

                HashStates::CostComplete => {
                    state = match c {
                        '$' => HashStates::Salt,
                        _ => {
                            return Err(PasswordHashError::MalformedHash(
                                "Missing '$' delimiter after cost",
                            ))
                        }
                    };
                }

                HashStates::Salt => {
                    if !is_bcrypt_b64(c) {
                        return Err(PasswordHashError::MalformedHash(
                            "Invalid character in base64-encoded salt",
                        ));
                    }

                    salt.push(c);

                    if salt.len() == SALT_B64_LEN {
                        state = HashStates::Digest;
                    }
                }

                HashStates::Digest => {
                    if !is_bcrypt_b64(c) {
                        return Err(PasswordHashError::MalformedHash(
                            "Invalid character in base64-encoded hash",
                        ));
                    }

                    if digest.len() == DIGEST_B64_LEN {
                        return Err(PasswordHashError::MalformedHash("Hash is too long"));
                    }

                    digest.push(c);
                }
            }
        }

        if !matches!(state, HashStates::Digest) || digest.len() != DIGEST_B64_LEN {
            return Err(PasswordHashError::MalformedHash("Hash is incomplete"));
        }

        Ok(Self {
            version,
            cost,
            b64_salt: salt,
            b64_digest: digest,
        })
    }
}

// bcrypt uses its own base64 alphabet: ./A-Za-z0-9
#[inline]
fn is_bcrypt_b64(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '/'
}
