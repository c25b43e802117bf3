// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::models::AccountId;

/// Claims carried by an identity token.
///
/// Exactly one identity claim (`sub`) plus the expiry. `sub` holds the
/// account id in decimal, following the JWT convention of string subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (account id)
    pub sub: String,
    /// Expiration timestamp (seconds since the Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(subject: AccountId, expires_at: i64) -> Self {
        Self {
            sub: subject.to_string(),
            exp: expires_at,
        }
    }

    /// Parse the subject back into an account id.
    pub fn subject(&self) -> Result<AccountId, AuthError> {
        self.sub
            .parse::<u64>()
            .map(AccountId)
            .map_err(|_| AuthError::Malformed)
    }
}

/// Authenticated caller extracted from a verified token.
///
/// This is the type handlers receive from the `Auth` extractor and the type
/// the authentication middleware stores in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Verified account id (token `sub`)
    pub account_id: AccountId,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: &TokenClaims) -> Result<Self, AuthError> {
        Ok(Self {
            account_id: claims.subject()?,
            expires_at: claims.exp,
        })
    }
}
