// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every variant renders as `{"error": "<message>"}`. Token verification
//! failures share one message so that a caller cannot tell an expired token
//! from a forged one; the precise reason is only available to logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::token::VerifyError;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// Login body missing username or password
    MissingCredentials,
    /// Username unknown or password wrong
    InvalidCredentials,
    /// No `Authorization: Bearer <token>` header
    MissingAuthHeader,
    /// Token failed verification
    InvalidToken(VerifyError),
    /// Token could not be signed
    TokenIssuance(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    /// Stable error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::TokenIssuance(_) => "token_issuance_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingAuthHeader
            | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::TokenIssuance(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal verification failure, if this is a token rejection.
    pub fn verify_error(&self) -> Option<VerifyError> {
        match self {
            AuthError::InvalidToken(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "Username and password are required"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingAuthHeader => write!(f, "No valid Authorization header found"),
            AuthError::InvalidToken(_) => write!(f, "Invalid token"),
            AuthError::TokenIssuance(_) => write!(f, "Error generating token"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<VerifyError> for AuthError {
    fn from(reason: VerifyError) -> Self {
        AuthError::InvalidToken(reason)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::TokenIssuance(detail) = &self {
            tracing::error!(detail = %detail, "Token issuance failed");
        }

        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
