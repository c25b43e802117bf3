// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store.
//!
//! All tables sit behind a single `RwLock`, so the email-uniqueness check
//! and the insert that depends on it happen under one write guard. Data is
//! lost when the process exits.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{
    effective_limit, AccountRepository, PostRepository, StorageError, StorageResult, Store,
};
use crate::models::{
    Account, AccountChanges, AccountId, NewAccount, NewPost, Post, PostChanges, PostId,
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<AccountId, Account>,
    /// email → account id
    emails: HashMap<String, AccountId>,
    posts: BTreeMap<PostId, Post>,
    last_account_id: u64,
    last_post_id: u64,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::Unavailable("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl AccountRepository for InMemoryStore {
    fn create_account(&self, account: NewAccount) -> StorageResult<AccountId> {
        let mut tables = self.write()?;
        if tables.emails.contains_key(&account.email) {
            return Err(StorageError::DuplicateEmail);
        }

        tables.last_account_id += 1;
        let id = AccountId(tables.last_account_id);
        let now = Utc::now();

        tables.emails.insert(account.email.clone(), id);
        tables.accounts.insert(
            id,
            Account {
                id,
                email: account.email,
                password_hash: account.password_hash,
                is_active: true,
                is_locked: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn find_account(&self, id: AccountId) -> StorageResult<Account> {
        self.read()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound("account"))
    }

    fn find_account_by_email(&self, email: &str) -> StorageResult<Account> {
        let tables = self.read()?;
        tables
            .emails
            .get(email)
            .and_then(|id| tables.accounts.get(id))
            .cloned()
            .ok_or(StorageError::NotFound("account"))
    }

    fn update_account(&self, id: AccountId, changes: AccountChanges) -> StorageResult<()> {
        let mut tables = self.write()?;
        let Tables {
            accounts, emails, ..
        } = &mut *tables;

        let account = accounts.get_mut(&id).ok_or(StorageError::NotFound("account"))?;

        if let Some(email) = &changes.email {
            if emails.get(email).is_some_and(|holder| *holder != id) {
                return Err(StorageError::DuplicateEmail);
            }
        }

        if let Some(email) = changes.email {
            emails.remove(&account.email);
            emails.insert(email.clone(), id);
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
        Ok(())
    }
}

impl PostRepository for InMemoryStore {
    fn create_post(&self, post: NewPost) -> StorageResult<PostId> {
        let mut tables = self.write()?;
        tables.last_post_id += 1;
        let id = PostId(tables.last_post_id);
        let now = Utc::now();

        tables.posts.insert(
            id,
            Post {
                id,
                title: post.title,
                body: post.body,
                owner_id: post.owner_id,
                published: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn find_post(&self, id: PostId) -> StorageResult<Post> {
        self.read()?
            .posts
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound("post"))
    }

    fn update_post(&self, id: PostId, changes: PostChanges) -> StorageResult<()> {
        let mut tables = self.write()?;
        let post = tables.posts.get_mut(&id).ok_or(StorageError::NotFound("post"))?;
        changes.apply_to(post);
        post.updated_at = Utc::now();
        Ok(())
    }

    fn delete_post(&self, id: PostId) -> StorageResult<()> {
        self.write()?
            .posts
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound("post"))
    }

    fn list_published(&self, limit: Option<usize>) -> StorageResult<Vec<Post>> {
        Ok(self
            .read()?
            .posts
            .values()
            .rev()
            .filter(|post| post.published)
            .take(effective_limit(limit))
            .cloned()
            .collect())
    }

    fn list_by_owner(
        &self,
        owner: AccountId,
        include_unpublished: bool,
    ) -> StorageResult<Vec<Post>> {
        Ok(self
            .read()?
            .posts
            .values()
            .rev()
            .filter(|post| post.owner_id == owner && (include_unpublished || post.published))
            .cloned()
            .collect())
    }
}

impl Store for InMemoryStore {
    fn health_check(&self) -> StorageResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;
    use std::sync::Arc;

    #[test]
    fn account_crud() {
        contract::account_crud(&InMemoryStore::new());
    }

    #[test]
    fn duplicate_email() {
        contract::duplicate_email(&InMemoryStore::new());
    }

    #[test]
    fn duplicate_email_race() {
        contract::duplicate_email_race(Arc::new(InMemoryStore::new()));
    }

    #[test]
    fn post_crud() {
        contract::post_crud(&InMemoryStore::new());
    }

    #[test]
    fn publish_is_terminal() {
        contract::publish_is_terminal(&InMemoryStore::new());
    }

    #[test]
    fn listings() {
        contract::listings(&InMemoryStore::new());
    }

    #[test]
    fn account_flags() {
        contract::account_flags(&InMemoryStore::new());
    }

    #[test]
    fn healthy() {
        contract::healthy(&InMemoryStore::new());
    }

    #[test]
    fn poisoned_lock_reports_unavailable() {
        let store = Arc::new(InMemoryStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.tables.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.health_check(), Err(StorageError::Unavailable(_))));
        assert!(matches!(
            store.find_post(PostId(1)),
            Err(StorageError::Unavailable(_))
        ));
    }
}
