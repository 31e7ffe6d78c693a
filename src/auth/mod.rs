// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token issuance and request gating for the API.
//!
//! ## Auth Flow
//!
//! 1. Client posts `{username, password}` to `/api/login`
//! 2. Credentials are checked against the [`CredentialStore`]
//! 3. The [`TokenCodec`] mints an HS256 token carrying `username` and `exp`
//! 4. Client sends `Authorization: Bearer <token>` on later requests
//! 5. The gateway middleware:
//!    - forwards pre-flight and allow-listed requests untouched
//!    - verifies signature and expiry for everything else
//!    - attaches the [`AuthenticatedUser`] to the request, or answers 401
//!
//! ## Security
//!
//! - The gateway is stateless: no session table, no revocation list
//! - Signature comparison is constant-time
//! - Clients get one generic message for every token failure

pub mod allow_list;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod token;

pub use allow_list::{AllowList, AllowRule};
pub use claims::{AuthenticatedUser, TokenClaims};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::{auth_middleware, Admission, AuthGateway};
pub use token::{TokenCodec, TokenError, TokenTier, VerifyError};
