// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Repository contracts for accounts and posts, and the two engines that
//! implement them:
//!
//! - [`memory::InMemoryStore`]: tables behind one `RwLock`, for tests and
//!   throwaway instances
//! - [`database::BlogDatabase`]: embedded redb file (pure Rust, ACID)
//!
//! ## Contract
//!
//! - Ids are assigned by the store and never reused.
//! - Email uniqueness is enforced here, atomically with the write. Two
//!   concurrent registrations of the same email produce exactly one
//!   account and one [`StorageError::DuplicateEmail`].
//! - Emails are compared exactly as stored.
//! - Lists are newest first.
//!
//! Repositories are synchronous. Both engines do short, bounded work per
//! call, so handlers call them directly.

pub mod database;
pub mod memory;

pub use database::BlogDatabase;
pub use memory::InMemoryStore;

use crate::models::{
    Account, AccountChanges, AccountId, NewAccount, NewPost, Post, PostChanges, PostId,
};

/// Page size used when a listing does not ask for one (or asks for zero).
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Largest page a listing will return.
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Resource kind that does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email is already taken")]
    DuplicateEmail,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Clamp a requested page size to `1..=MAX_LIST_LIMIT`.
pub fn effective_limit(limit: Option<usize>) -> usize {
    match limit {
        None | Some(0) => DEFAULT_LIST_LIMIT,
        Some(n) => n.min(MAX_LIST_LIMIT),
    }
}

pub trait AccountRepository: Send + Sync {
    /// Insert a new active, unlocked account.
    fn create_account(&self, account: NewAccount) -> StorageResult<AccountId>;

    fn find_account(&self, id: AccountId) -> StorageResult<Account>;

    /// Exact-match lookup.
    fn find_account_by_email(&self, email: &str) -> StorageResult<Account>;

    /// Apply changes. Moving to an email held by another account fails with
    /// `DuplicateEmail` and leaves the account untouched.
    fn update_account(&self, id: AccountId, changes: AccountChanges) -> StorageResult<()>;
}

pub trait PostRepository: Send + Sync {
    /// Insert a new, unpublished post.
    fn create_post(&self, post: NewPost) -> StorageResult<PostId>;

    fn find_post(&self, id: PostId) -> StorageResult<Post>;

    fn update_post(&self, id: PostId, changes: PostChanges) -> StorageResult<()>;

    fn delete_post(&self, id: PostId) -> StorageResult<()>;

    /// Newest published posts, at most [`effective_limit`] of them.
    fn list_published(&self, limit: Option<usize>) -> StorageResult<Vec<Post>>;

    /// Every post of `owner`, newest first. Unpublished posts are only
    /// included when asked for.
    fn list_by_owner(&self, owner: AccountId, include_unpublished: bool)
        -> StorageResult<Vec<Post>>;
}

/// A complete storage engine.
pub trait Store: AccountRepository + PostRepository {
    /// Cheap liveness probe used by the readiness endpoint.
    fn health_check(&self) -> StorageResult<()>;
}
