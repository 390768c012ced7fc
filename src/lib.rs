// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Library Auth - Stateless Token Authentication for the Library Service
//!
//! Signed bearer tokens are issued at login and checked on every request
//! without server-side session state. Logout and admin revocation feed an
//! in-memory registry that rejects a token until it would have expired anyway.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, revocation registry and request authenticator
//! - `config` - Environment-driven runtime configuration
//! - `session` - Client-side session persistence and teardown

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
