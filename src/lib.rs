// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quill - Blogging Backend
//!
//! Accounts authenticate with email and password and receive a signed
//! bearer token. Posts belong to the account that wrote them, start out
//! unpublished, and become world-readable once their owner publishes them.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, tokens and request gating
//! - `policy` - Read, mutate and registration decisions
//! - `storage` - Account and post repositories (in-memory, redb)
//! - `config` / `telemetry` - Environment configuration and tracing setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod state;
pub mod storage;
pub mod telemetry;
