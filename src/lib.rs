// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth Gateway - Bearer Token Issuance and Request Gating
//!
//! This crate issues signed, time-limited bearer tokens on login and checks
//! them on every request that is not explicitly allow-listed.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token codec, credential store, allow-list and gateway middleware
//! - `config` - Environment-driven startup configuration
//! - `state` - Shared, read-only application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
