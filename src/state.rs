// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::{InMemoryStore, Store};

/// Shared handler state. Cloning is cheap; both members are read-only
/// handles that are safe to use from any number of tasks.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), tokens)
    }
}
