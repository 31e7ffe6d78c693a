// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    auth::{AuthError, TokenTier},
    state::AppState,
};

/// Credentials submitted to `POST /api/login`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields, if present and non-empty.
    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Access token for the `Authorization: Bearer` header
    pub token: String,
}

/// Exchange a username and password for an access token.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Token could not be generated"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(rejection = %rejection.body_text(), "Login failed: unreadable request body");
            return Err(AuthError::MissingCredentials);
        }
    };

    let Some((username, password)) = request.credentials() else {
        warn!("Login failed: username or password is missing");
        return Err(AuthError::MissingCredentials);
    };

    info!(username, "Login attempt");

    if !state.credentials.authenticate(username, password) {
        warn!(username, "Login failed: invalid credentials");
        return Err(AuthError::InvalidCredentials);
    }

    let token = state
        .codec
        .issue_for(username, TokenTier::Access)
        .map_err(|e| AuthError::TokenIssuance(e.to_string()))?;

    info!(username, "Login successful");
    Ok(Json(LoginResponse { token }))
}
