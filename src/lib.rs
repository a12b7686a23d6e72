#![deny(missing_docs)]

//! A library for hashing and verifying passwords using
//! [bcrypt](https://en.wikipedia.org/wiki/Bcrypt). bcrypt is an adaptive password hashing
//! function: its cost parameter can be raised as hardware gets faster so that brute-forcing a
//! stolen hash stays expensive.
//!
//! The bcrypt algorithm itself comes from the [bcrypt crate](https://docs.rs/bcrypt). This
//! crate puts a small, hard-to-misuse API in front of it:
//!
//! * Salts are always generated from the operating system's secure random source and can't be
//!   supplied by the caller.
//! * Out-of-range costs and over-long passwords are reported as errors instead of being
//!   clamped or silently truncated.
//! * A wrong password (`Ok(false)`) is kept distinct from a stored hash that can't be decoded
//!   (`Err(PasswordHashError::MalformedHash)`).
//! * Nothing panics.
//!
//! Hash strings use the standard `$2b$10$...` format, so they can be shared with bcrypt
//! implementations in other languages.
//!
//! # Usage
//!
//! To use bcrypt-hasher, add the following to your Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! bcrypt-hasher = "1.0.0"
//! ```
//!
//! Enable the `tokio` feature for `hash_async()` and `verify_async()`, which move the hashing
//! work onto tokio's blocking thread pool.
//!
//! # Examples
//!
//! Hash a password, then verify it:
//!
//! ```rust
//! use bcrypt_hasher::{hash_password, verify_password};
//!
//! let hash = hash_password("correct horse battery staple").unwrap();
//!
//! assert!(verify_password(&hash, "correct horse battery staple").unwrap());
//! assert!(!verify_password(&hash, "wrong").unwrap());
//! ```
//!
//! Change the parameters used for hashing:
//!
//! ```rust
//! use bcrypt_hasher::{Hasher, Version};
//!
//! let hash = Hasher::new()
//!         .cost(12)
//!         .version(Version::TwoY)
//!         .hash(b"password")
//!         .unwrap();
//!
//! assert!(hash.verify(b"password"));
//! assert_eq!(hash.cost(), 12);
//! assert!(hash.to_string().starts_with("$2y$12$"));
//! ```
//!
//! Verify a hash from a hash string:
//!
//! ```rust
//! use bcrypt_hasher::Hash;
//! use std::str::FromStr;
//!
//! let hash_string = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
//!
//! let hash = Hash::from_str(hash_string).unwrap();
//! assert!(hash.verify("U*U"));
//! ```
//!
//! Tell a corrupted hash apart from a wrong password:
//!
//! ```rust
//! use bcrypt_hasher::{verify_password, PasswordHashError};
//!
//! assert!(matches!(
//!     verify_password("not-a-hash", "anything"),
//!     Err(PasswordHashError::MalformedHash(_))
//! ));
//! ```
//!
//! Reject costs that came from a bad configuration value:
//!
//! ```rust
//! use bcrypt_hasher::{hash_password_with_cost, PasswordHashError};
//!
//! assert!(matches!(
//!     hash_password_with_cost("password", 3),
//!     Err(PasswordHashError::InvalidCost(3))
//! ));
//! ```
//!
//! Upgrade stale hashes after a successful login:
//!
//! ```rust
//! use bcrypt_hasher::{extract_cost, hash_password_with_cost, verify_password, HashPolicy};
//!
//! let policy = HashPolicy { cost: 6, min_cost: 5, ..Default::default() };
//!
//! let mut stored = hash_password_with_cost("hunter2", 4).unwrap();
//!
//! if verify_password(&stored, "hunter2").unwrap() && extract_cost(&stored).unwrap() < policy.min_cost {
//!     stored = policy.hasher().unwrap().hash("hunter2").unwrap().to_string();
//! }
//!
//! assert_eq!(extract_cost(&stored).unwrap(), 6);
//! ```

mod config;
mod error;
mod hasher;
mod lexer;

pub use config::HashPolicy;
pub use error::PasswordHashError;
pub use hasher::{
    extract_cost, hash_password, hash_password_with_cost, verify_password, Hash, Hasher,
    Version, DEFAULT_COST, MAX_COST, MAX_PASSWORD_LEN, MIN_COST,
};
