// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{middleware::bearer_token, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Behind [`auth_middleware`](super::middleware::auth_middleware) the user is
/// already in the request extensions. A handler mounted outside the gateway
/// still gets the same guarantee: the bearer token is verified here instead.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers)?;
        let claims = state.codec.verify(token)?;

        Ok(Auth(AuthenticatedUser::from_claims(claims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::token::VerifyError, config::GatewayConfig};
    use axum::http::Request;
    use chrono::{Duration, Utc};

    fn create_test_state() -> AppState {
        AppState::from_config(&GatewayConfig::default())
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = parts_with_auth(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_verifies_token_without_middleware() {
        let state = create_test_state();
        let token = state.codec.issue("admin", Duration::hours(1)).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "admin");
    }

    #[tokio::test]
    async fn auth_extractor_rejects_expired_token() {
        let state = create_test_state();
        let token = state
            .codec
            .issue_at("admin", Duration::days(7), Utc::now() - Duration::days(8))
            .unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(VerifyError::Expired))
        ));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let state = create_test_state();
        let mut parts = parts_with_auth(Some("Bearer garbage"));

        parts.extensions.insert(AuthenticatedUser {
            username: "user_from_middleware".to_string(),
            expires_at: 0,
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "user_from_middleware");
    }
}
