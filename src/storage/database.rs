// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded blog database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: account id → serialized Account (JSON bytes)
//! - `account_emails`: email (as given) → account id
//! - `posts`: post id → serialized Post (JSON bytes)
//! - `sequences`: name → last assigned id
//!
//! redb runs one write transaction at a time, so the email index lookup and
//! the account insert it guards commit together or not at all.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};

use super::{
    effective_limit, AccountRepository, PostRepository, StorageError, StorageResult, Store,
};
use crate::models::{
    Account, AccountChanges, AccountId, NewAccount, NewPost, Post, PostChanges, PostId,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: account id → serialized Account.
const ACCOUNTS: TableDefinition<u64, &[u8]> = TableDefinition::new("accounts");

/// Unique index: email → account id.
const ACCOUNT_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("account_emails");

/// Primary table: post id → serialized Post.
const POSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("posts");

/// Id sequences: "account" | "post" → last assigned id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const ACCOUNT_SEQUENCE: &str = "account";
const POST_SEQUENCE: &str = "post";

/// Advance a sequence and return the new id.
fn next_id(sequences: &mut Table<'_, &'static str, u64>, name: &str) -> StorageResult<u64> {
    let last = sequences.get(name)?.map(|v| v.value()).unwrap_or(0);
    let next = last + 1;
    sequences.insert(name, next)?;
    Ok(next)
}

// =============================================================================
// BlogDatabase
// =============================================================================

/// Persistent store for accounts and posts.
pub struct BlogDatabase {
    db: Database,
}

impl BlogDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(ACCOUNT_EMAILS)?;
            let _ = write_txn.open_table(POSTS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl AccountRepository for BlogDatabase {
    fn create_account(&self, account: NewAccount) -> StorageResult<AccountId> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            if emails.get(account.email.as_str())?.is_some() {
                return Err(StorageError::DuplicateEmail);
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = AccountId(next_id(&mut sequences, ACCOUNT_SEQUENCE)?);
            let now = Utc::now();
            let stored = Account {
                id,
                email: account.email,
                password_hash: account.password_hash,
                is_active: true,
                is_locked: false,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&stored)?;
            write_txn.open_table(ACCOUNTS)?.insert(id.0, json.as_slice())?;
            emails.insert(stored.email.as_str(), id.0)?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    fn find_account(&self, id: AccountId) -> StorageResult<Account> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        let account = table
            .get(id.0)?
            .map(|v| serde_json::from_slice::<Account>(v.value()))
            .transpose()?;
        account.ok_or(StorageError::NotFound("account"))
    }

    fn find_account_by_email(&self, email: &str) -> StorageResult<Account> {
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;
        let id = emails
            .get(email)?
            .map(|v| v.value())
            .ok_or(StorageError::NotFound("account"))?;

        let accounts = read_txn.open_table(ACCOUNTS)?;
        let account = accounts
            .get(id)?
            .map(|v| serde_json::from_slice::<Account>(v.value()))
            .transpose()?;
        account.ok_or(StorageError::NotFound("account"))
    }

    fn update_account(&self, id: AccountId, changes: AccountChanges) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            let existing_bytes = accounts
                .get(id.0)?
                .map(|v| v.value().to_vec())
                .ok_or(StorageError::NotFound("account"))?;
            let mut account: Account = serde_json::from_slice(&existing_bytes)?;

            if let Some(email) = changes.email {
                let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
                let holder = emails.get(email.as_str())?.map(|v| v.value());
                match holder {
                    Some(holder) if holder != id.0 => return Err(StorageError::DuplicateEmail),
                    Some(_) => {}
                    None => {
                        emails.remove(account.email.as_str())?;
                        emails.insert(email.as_str(), id.0)?;
                    }
                }
                account.email = email;
            }
            if let Some(hash) = changes.password_hash {
                account.password_hash = hash;
            }
            if let Some(is_active) = changes.is_active {
                account.is_active = is_active;
            }
            if let Some(is_locked) = changes.is_locked {
                account.is_locked = is_locked;
            }
            account.updated_at = Utc::now();

            let json = serde_json::to_vec(&account)?;
            accounts.insert(id.0, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl PostRepository for BlogDatabase {
    fn create_post(&self, post: NewPost) -> StorageResult<PostId> {
        let write_txn = self.db.begin_write()?;
        let id = {
            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let id = PostId(next_id(&mut sequences, POST_SEQUENCE)?);
            let now = Utc::now();
            let stored = Post {
                id,
                title: post.title,
                body: post.body,
                owner_id: post.owner_id,
                published: false,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&stored)?;
            write_txn.open_table(POSTS)?.insert(id.0, json.as_slice())?;
            id
        };
        write_txn.commit()?;
        Ok(id)
    }

    fn find_post(&self, id: PostId) -> StorageResult<Post> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POSTS)?;
        let post = table
            .get(id.0)?
            .map(|v| serde_json::from_slice::<Post>(v.value()))
            .transpose()?;
        post.ok_or(StorageError::NotFound("post"))
    }

    fn update_post(&self, id: PostId, changes: PostChanges) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(POSTS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = table
                .get(id.0)?
                .map(|v| v.value().to_vec())
                .ok_or(StorageError::NotFound("post"))?;

            let mut post: Post = serde_json::from_slice(&existing_bytes)?;
            changes.apply_to(&mut post);
            post.updated_at = Utc::now();

            let json = serde_json::to_vec(&post)?;
            table.insert(id.0, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_post(&self, id: PostId) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        let removed = write_txn.open_table(POSTS)?.remove(id.0)?.is_some();
        if !removed {
            return Err(StorageError::NotFound("post"));
        }
        write_txn.commit()?;
        Ok(())
    }

    fn list_published(&self, limit: Option<usize>) -> StorageResult<Vec<Post>> {
        let limit = effective_limit(limit);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POSTS)?;

        let mut results = Vec::with_capacity(limit);
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            let post: Post = serde_json::from_slice(value.value())?;
            if post.published {
                results.push(post);
                if results.len() >= limit {
                    break;
                }
            }
        }
        Ok(results)
    }

    fn list_by_owner(
        &self,
        owner: AccountId,
        include_unpublished: bool,
    ) -> StorageResult<Vec<Post>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POSTS)?;

        let mut results = Vec::new();
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            let post: Post = serde_json::from_slice(value.value())?;
            if post.owner_id == owner && (include_unpublished || post.published) {
                results.push(post);
            }
        }
        Ok(results)
    }
}

impl Store for BlogDatabase {
    fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;
    use std::sync::Arc;

    fn temp_db() -> (BlogDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = BlogDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn account_crud() {
        let (db, _dir) = temp_db();
        contract::account_crud(&db);
    }

    #[test]
    fn duplicate_email() {
        let (db, _dir) = temp_db();
        contract::duplicate_email(&db);
    }

    #[test]
    fn duplicate_email_race() {
        let (db, _dir) = temp_db();
        contract::duplicate_email_race(Arc::new(db));
    }

    #[test]
    fn post_crud() {
        let (db, _dir) = temp_db();
        contract::post_crud(&db);
    }

    #[test]
    fn publish_is_terminal() {
        let (db, _dir) = temp_db();
        contract::publish_is_terminal(&db);
    }

    #[test]
    fn listings() {
        let (db, _dir) = temp_db();
        contract::listings(&db);
    }

    #[test]
    fn account_flags() {
        let (db, _dir) = temp_db();
        contract::account_flags(&db);
    }

    #[test]
    fn healthy() {
        let (db, _dir) = temp_db();
        contract::healthy(&db);
    }

    #[test]
    fn data_and_sequences_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quill.redb");

        let (account, post) = {
            let db = BlogDatabase::open(&path).unwrap();
            let account = db
                .create_account(NewAccount {
                    email: "a@x.com".into(),
                    password_hash: "$argon2id$hash".into(),
                })
                .unwrap();
            let post = db
                .create_post(NewPost {
                    title: "Persisted".into(),
                    body: "Still here".into(),
                    owner_id: account,
                })
                .unwrap();
            (account, post)
        };

        let db = BlogDatabase::open(&path).unwrap();
        assert_eq!(db.find_account_by_email("a@x.com").unwrap().id, account);
        assert_eq!(db.find_post(post).unwrap().title, "Persisted");

        let next = db
            .create_post(NewPost {
                title: "Another".into(),
                body: "Body".into(),
                owner_id: account,
            })
            .unwrap();
        assert!(next > post);
    }
}
