// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, exp}`. The signing key lives in a
//! [`TokenConfig`] built once at startup and moved into the
//! [`TokenService`]; nothing here is global or mutable after construction,
//! so a shared `Arc<TokenService>` can verify from any number of tasks.
//!
//! ## Verification
//!
//! - Exactly one accepted algorithm. A token whose header names any other
//!   algorithm is rejected before its signature is looked at.
//! - `exp` and `sub` are required claims.
//! - Clock-skew leeway defaults to zero since issuer and verifier are the
//!   same process.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedUser, TokenClaims};
use crate::models::AccountId;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum HMAC secret length accepted by the configuration loader.
pub const MIN_SECRET_LENGTH: usize = 32;

/// HMAC algorithms a shared secret can sign with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HmacAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl From<HmacAlgorithm> for Algorithm {
    fn from(algorithm: HmacAlgorithm) -> Self {
        match algorithm {
            HmacAlgorithm::HS256 => Algorithm::HS256,
            HmacAlgorithm::HS384 => Algorithm::HS384,
            HmacAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// Token service configuration.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    /// Lifetime of issued tokens
    pub ttl: Duration,
    /// The one HMAC algorithm tokens are signed and accepted with
    pub algorithm: HmacAlgorithm,
    /// Accepted clock skew in seconds when checking `exp`
    pub leeway: u64,
}

impl TokenConfig {
    /// Create a configuration with the default TTL and no leeway.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: DEFAULT_TOKEN_TTL,
            algorithm: HmacAlgorithm::default(),
            leeway: 0,
        }
    }

    /// Set the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Pin a different HMAC algorithm.
    pub fn with_algorithm(mut self, algorithm: HmacAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the clock-skew leeway.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway = leeway_secs;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .field("algorithm", &self.algorithm)
            .field("leeway", &self.leeway)
            .finish()
    }
}

/// A freshly minted token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies identity tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Build the keys and validation rules from a configuration.
    pub fn new(config: TokenConfig) -> Self {
        let algorithm = Algorithm::from(config.algorithm);
        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            header: Header::new(algorithm),
            validation,
            ttl: config.ttl,
        }
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(&self, subject: AccountId) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if minted at `issued_at`.
    pub fn issue_at(
        &self,
        subject: AccountId,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let exp = issued_at.timestamp().saturating_add(ttl_secs);
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::SigningFailed(format!("expiry {exp} out of range")))?;

        let claims = TokenClaims::new(subject, exp);
        let token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> Result<AccountId, AuthError> {
        self.verify_claims(token)?.subject()
    }

    /// Verify a token and return the authenticated caller.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        AuthenticatedUser::from_claims(&self.verify_claims(token)?)
    }

    /// Verify signature, algorithm and expiry, returning the decoded claims.
    pub fn verify_claims(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::Malformed,
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use std::sync::Arc;

    const SECRET: &[u8] = b"unit-test-secret-that-is-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new(SECRET))
    }

    fn segments(token: &str) -> Vec<String> {
        token.split('.').map(str::to_string).collect()
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let tokens = service();
        let issued = tokens.issue(AccountId(17)).unwrap();

        assert_eq!(tokens.verify(&issued.token).unwrap(), AccountId(17));
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let tokens = TokenService::new(TokenConfig::new(SECRET).with_ttl(Duration::from_secs(60)));
        let now = Utc::now();
        let issued = tokens.issue_at(AccountId(1), now).unwrap();

        assert_eq!(issued.expires_at.timestamp(), now.timestamp() + 60);
        let user = tokens.authenticate(&issued.token).unwrap();
        assert_eq!(user.expires_at, now.timestamp() + 60);
    }

    #[test]
    fn token_past_its_ttl_is_expired() {
        let ttl = Duration::from_secs(3600);
        let tokens = TokenService::new(TokenConfig::new(SECRET).with_ttl(ttl));
        let issued_at = Utc::now() - chrono::Duration::seconds(3600 + 5);
        let issued = tokens.issue_at(AccountId(1), issued_at).unwrap();

        assert_eq!(tokens.verify(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn token_just_inside_its_ttl_is_accepted() {
        let ttl = Duration::from_secs(3600);
        let tokens = TokenService::new(TokenConfig::new(SECRET).with_ttl(ttl));
        let issued_at = Utc::now() - chrono::Duration::seconds(3600 - 30);
        let issued = tokens.issue_at(AccountId(1), issued_at).unwrap();

        assert_eq!(tokens.verify(&issued.token), Ok(AccountId(1)));
    }

    #[test]
    fn leeway_tolerates_small_clock_skew() {
        let tokens = TokenService::new(
            TokenConfig::new(SECRET)
                .with_ttl(Duration::from_secs(60))
                .with_leeway(30),
        );
        let issued_at = Utc::now() - chrono::Duration::seconds(70);
        let issued = tokens.issue_at(AccountId(1), issued_at).unwrap();

        assert_eq!(tokens.verify(&issued.token), Ok(AccountId(1)));
    }

    #[test]
    fn different_secret_is_invalid_signature() {
        let issued = service().issue(AccountId(1)).unwrap();
        let other = TokenService::new(TokenConfig::new(&b"another-secret-that-is-32-bytes-long"[..]));

        assert_eq!(other.verify(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_is_invalid_signature() {
        let tokens = service();
        let issued = tokens.issue(AccountId(1)).unwrap();
        let parts = segments(&issued.token);

        let forged_claims = TokenClaims::new(AccountId(2), Utc::now().timestamp() + 3600);
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(tokens.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn token_signed_with_other_hmac_algorithm_is_rejected() {
        let claims = TokenClaims::new(AccountId(1), Utc::now().timestamp() + 3600);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn pinned_algorithm_rejects_the_default_one() {
        let hs512 = TokenService::new(TokenConfig::new(SECRET).with_algorithm(HmacAlgorithm::HS512));
        let issued = hs512.issue(AccountId(3)).unwrap();

        assert_eq!(hs512.verify(&issued.token), Ok(AccountId(3)));
        assert_eq!(service().verify(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn every_configurable_algorithm_can_sign() {
        for algorithm in [HmacAlgorithm::HS256, HmacAlgorithm::HS384, HmacAlgorithm::HS512] {
            let tokens = TokenService::new(TokenConfig::new(SECRET).with_algorithm(algorithm));
            let issued = tokens.issue(AccountId(5)).unwrap();

            assert_eq!(tokens.verify(&issued.token), Ok(AccountId(5)));
            let header = jsonwebtoken::decode_header(&issued.token).unwrap();
            assert_eq!(header.alg, Algorithm::from(algorithm));
        }
    }

    #[test]
    fn header_claiming_asymmetric_algorithm_is_rejected() {
        let tokens = service();
        let issued = tokens.issue(AccountId(1)).unwrap();
        let parts = segments(&issued.token);

        let rs256_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", rs256_header, parts[1], parts[2]);

        assert_eq!(tokens.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = TokenClaims::new(AccountId(1), Utc::now().timestamp() + 3600);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let token = format!("{header}.{payload}.");

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().verify("not-a-token"), Err(AuthError::Malformed));
        assert_eq!(service().verify(""), Err(AuthError::Malformed));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        #[derive(serde::Serialize)]
        struct OddClaims {
            sub: &'static str,
            exp: i64,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &OddClaims {
                sub: "user_123",
                exp: Utc::now().timestamp() + 3600,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(AuthError::Malformed));
    }

    #[test]
    fn missing_expiry_is_rejected() {
        #[derive(serde::Serialize)]
        struct NoExp {
            sub: &'static str,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExp { sub: "1" },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn concurrent_verification_is_consistent() {
        let tokens = Arc::new(service());
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let tokens = Arc::clone(&tokens);
                std::thread::spawn(move || {
                    let issued = tokens.issue(AccountId(i)).unwrap();
                    (0..50).all(|_| tokens.verify(&issued.token) == Ok(AccountId(i)))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn config_debug_hides_secret() {
        let rendered = format!("{:?}", TokenConfig::new(SECRET));
        assert!(!rendered.contains("unit-test-secret"));
    }
}
