// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification.
//!
//! - Argon2id with the crate's default (OWASP) parameters
//! - Random 16-byte salt per hash, PHC string output
//! - Plaintext is NFKC-normalised, never cloned, and zeroized on drop
//! - Verification is constant-time inside `argon2`
//!
//! Nothing in this module logs. Callers must not log plaintext either.

use std::fmt;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Password hashing/verification errors.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The underlying primitive rejected the input.
    #[error("password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored verifier is not a valid PHC string.
    #[error("stored password verifier is malformed")]
    MalformedVerifier,
}

/// Clear text password, zeroized when dropped.
///
/// Not `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Wrap a raw password, applying NFKC normalisation.
    pub fn new(raw: impl Into<String>) -> Self {
        let mut raw = raw.into();
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    /// Length in Unicode code points, as used by the length policy.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Argon2id verifier in PHC string format. Safe to store.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Wrap a stored PHC string, rejecting anything that does not parse.
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordError::MalformedVerifier)?;
        Ok(Self(hash))
    }

    pub fn into_phc_string(self) -> String {
        self.0
    }

    /// Check a candidate password against this verifier.
    ///
    /// Mismatch is `Ok(false)`, not an error.
    pub fn verify(&self, password: &ClearTextPassword) -> Result<bool, PasswordError> {
        verify_password(password, &self.0)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HashedPassword").field(&"[HASH]").finish()
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &ClearTextPassword) -> Result<HashedPassword, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    Ok(HashedPassword(hash.to_string()))
}

/// Verify a password against a stored PHC verifier.
pub fn verify_password(password: &ClearTextPassword, verifier: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(verifier).map_err(|_| PasswordError::MalformedVerifier)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::HashingFailed(e.to_string())),
    }
}

/// Spend the same work as a real verification without any account behind it.
///
/// Used on login for unknown emails so response timing does not reveal
/// whether the email is registered.
pub fn verify_against_dummy(password: &ClearTextPassword) {
    static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();

    let dummy = DUMMY.get_or_init(|| {
        hash_password(&ClearTextPassword::new("quill-dummy-verifier")).ok()
    });

    if let Some(verifier) = dummy {
        let _ = verifier.verify(password);
    }
}

/// Hash on the blocking pool so request tasks are not stalled by Argon2.
pub async fn hash_password_blocking(
    password: ClearTextPassword,
) -> Result<HashedPassword, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}

/// Verify on the blocking pool.
pub async fn verify_password_blocking(
    password: ClearTextPassword,
    verifier: HashedPassword,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verifier.verify(&password))
        .await
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let password = ClearTextPassword::new("password123");
        let hashed = hash_password(&password).unwrap();

        assert!(hashed.clone().into_phc_string().starts_with("$argon2id$"));
        assert!(hashed.verify(&password).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password(&ClearTextPassword::new("password123")).unwrap();
        let wrong = ClearTextPassword::new("password124");

        assert!(!hashed.verify(&wrong).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let password = ClearTextPassword::new("password123");
        let first = hash_password(&password).unwrap();
        let second = hash_password(&password).unwrap();

        assert_ne!(first, second);
        assert!(first.verify(&password).unwrap());
        assert!(second.verify(&password).unwrap());
    }

    #[test]
    fn malformed_verifier_is_an_error() {
        let password = ClearTextPassword::new("password123");

        assert!(matches!(
            verify_password(&password, "not_a_valid_hash"),
            Err(PasswordError::MalformedVerifier)
        ));
        assert!(matches!(
            HashedPassword::from_phc_string("plaintext"),
            Err(PasswordError::MalformedVerifier)
        ));
    }

    #[test]
    fn phc_string_survives_storage() {
        let password = ClearTextPassword::new("TestPassword123!");
        let stored = hash_password(&password).unwrap().into_phc_string();

        let restored = HashedPassword::from_phc_string(stored).unwrap();
        assert!(restored.verify(&password).unwrap());
    }

    #[test]
    fn nfkc_equivalent_passwords_match() {
        // U+FF41 (fullwidth 'a') normalises to 'a' under NFKC.
        let hashed = hash_password(&ClearTextPassword::new("\u{ff41}bcdefgh1")).unwrap();
        assert!(hashed.verify(&ClearTextPassword::new("abcdefgh1")).unwrap());
    }

    #[test]
    fn char_count_uses_code_points() {
        assert_eq!(ClearTextPassword::new("パスワード").char_count(), 5);
    }

    #[test]
    fn debug_output_is_redacted() {
        let password = ClearTextPassword::new("secret-value");
        let hashed = hash_password(&password).unwrap();

        assert!(!format!("{password:?}").contains("secret-value"));
        assert!(!format!("{hashed:?}").contains("argon2"));
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip() {
        let hashed = hash_password_blocking(ClearTextPassword::new("password123"))
            .await
            .unwrap();

        let ok = verify_password_blocking(ClearTextPassword::new("password123"), hashed.clone())
            .await
            .unwrap();
        assert!(ok);

        let wrong = verify_password_blocking(ClearTextPassword::new("password321"), hashed)
            .await
            .unwrap();
        assert!(!wrong);
    }
}
