// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential hashing plus bearer-token identity for the Quill API.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with email + password
//! 2. Server verifies the password against its Argon2id verifier and
//!    issues an HS256 token with `sub` = account id
//! 3. Client sends `Authorization: Bearer <token>`
//! 4. Server:
//!    - Verifies signature, algorithm and expiry
//!    - Extracts `sub` → [`AuthenticatedUser::account_id`]
//!
//! ## Security
//!
//! - Only registration, login, reads and health endpoints are public
//! - Every rejection renders as the same 401 body
//! - No clock skew tolerance by default

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use middleware::require_auth;
pub use password::{ClearTextPassword, HashedPassword, PasswordError};
pub use token::{HmacAlgorithm, IssuedToken, TokenConfig, TokenService};

/// Client-facing message for every authentication failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "invalid or missing credentials";
