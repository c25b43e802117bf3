// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain and API Data Models
//!
//! This module defines the persisted entities (accounts and posts), the
//! change sets handed to the repositories, and the request and response
//! structures used by the REST API. API-facing types derive `ToSchema` for
//! OpenAPI documentation.
//!
//! ## Identifiers
//!
//! [`AccountId`] and [`PostId`] are numeric newtypes. They serialize as plain
//! integers so the wire format stays `{"id": 7}`.
//!
//! ## Partial updates
//!
//! Update payloads use `Option` per field: `None` means "leave unchanged" and
//! is distinct from any present value, including the empty string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique numeric account identifier.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique numeric post identifier.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// A registered account as persisted by the account repository.
///
/// The serialized form carries the password verifier and is only ever
/// written to storage. API responses use [`AccountResponse`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    /// Email exactly as supplied at registration (case preserved).
    pub email: String,
    /// PHC-formatted Argon2id verifier.
    pub password_hash: String,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[HASH]")
            .field("is_active", &self.is_active)
            .field("is_locked", &self.is_locked)
            .finish()
    }
}

/// Account to be inserted. The secret is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Validated changes to apply to an existing account.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    /// Deactivated accounts cannot log in.
    pub is_active: Option<bool>,
    /// Locked accounts cannot log in.
    pub is_locked: Option<bool>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.is_active.is_none()
            && self.is_locked.is_none()
    }
}

// =============================================================================
// Posts
// =============================================================================

/// A blog post.
///
/// Persisted posts always have an owner; the type makes that non-optional.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Post {
    /// Unique post identifier.
    pub id: PostId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Account that created the post.
    pub owner_id: AccountId,
    /// Whether the post is world-readable.
    pub published: bool,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Post to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub owner_id: AccountId,
}

/// Validated changes to apply to an existing post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub published: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.published.is_none()
    }

    /// Apply these changes to a post in place.
    ///
    /// `published` only ever moves from false to true.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(body) = self.body {
            post.body = body;
        }
        if self.published == Some(true) {
            post.published = true;
        }
    }
}

// =============================================================================
// Request Models
// =============================================================================

/// Credentials submitted to register or log in.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password (minimum 8 characters at registration).
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Request to create a post. New posts always start unpublished.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    /// Post title (must not be blank).
    pub title: String,
    /// Post body (must not be blank).
    pub body: String,
}

/// Partial update of a post. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New body.
    #[serde(default)]
    pub body: Option<String>,
    /// Set to `true` to publish. Published posts cannot be unpublished.
    #[serde(default)]
    pub published: Option<bool>,
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(request: UpdatePostRequest) -> Self {
        Self {
            title: request.title,
            body: request.body,
            published: request.published,
        }
    }
}

/// Partial update of the caller's own account.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountRequest {
    /// New email (must not be taken by another account).
    #[serde(default)]
    pub email: Option<String>,
    /// New password (minimum 8 characters).
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for UpdateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateAccountRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Query parameters for listing published posts.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListPostsQuery {
    /// Maximum number of posts to return (default 10, at most 100).
    pub limit: Option<usize>,
}

// =============================================================================
// Response Models
// =============================================================================

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Compact signed token to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// The caller's own account. Never includes the password verifier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
    pub is_active: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            is_active: account.is_active,
            is_locked: account.is_locked,
            created_at: account.created_at,
        }
    }
}

/// What anyone may see about an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AccountProfile {
    pub id: AccountId,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            created_at: account.created_at,
        }
    }
}
