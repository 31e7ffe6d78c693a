// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gating for Axum.
//!
//! Every request passes through [`auth_middleware`] before routing:
//!
//! 1. Pre-flight (`OPTIONS`) requests and allow-listed routes are forwarded
//!    without looking at any header.
//! 2. Otherwise the `Authorization: Bearer <token>` header is required and
//!    the token is verified by the [`TokenCodec`].
//! 3. On success the [`AuthenticatedUser`] is inserted into the request
//!    extensions and the request is forwarded; on failure the gateway answers
//!    with 401 itself and the handler never runs.
//!
//! Usage:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/me", get(get_current_user))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{allow_list::AllowList, token::TokenCodec, AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Authorization scheme prefix, including the separating space.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Outcome of a request that may proceed to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Pre-flight or allow-listed; no token was inspected.
    Allowed,
    /// Token verified for this user.
    Authenticated(AuthenticatedUser),
}

/// Stateless request classifier shared by all requests.
#[derive(Clone)]
pub struct AuthGateway {
    codec: Arc<TokenCodec>,
    allow_list: Arc<AllowList>,
}

impl AuthGateway {
    pub fn new(codec: Arc<TokenCodec>, allow_list: Arc<AllowList>) -> Self {
        Self { codec, allow_list }
    }

    /// Decide whether a request may reach its handler.
    pub fn admit(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Admission, AuthError> {
        self.admit_at(method, path, headers, Utc::now())
    }

    /// [`AuthGateway::admit`] with an explicit clock for token expiry.
    pub fn admit_at(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<Admission, AuthError> {
        if method == Method::OPTIONS {
            debug!(path, "Pre-flight request, skipping authentication");
            return Ok(Admission::Allowed);
        }

        if let Some(rule) = self.allow_list.find(method, path) {
            debug!(%method, path, rule = %rule, "Allow-listed route, skipping authentication");
            return Ok(Admission::Allowed);
        }

        let token = bearer_token(headers)?;
        let claims = self.codec.verify_at(token, now)?;
        debug!(username = %claims.username, path, "Token validated");

        Ok(Admission::Authenticated(AuthenticatedUser::from_claims(claims)))
    }
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingAuthHeader)?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::MissingAuthHeader)
}

/// Authentication middleware function.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let admission = state
        .gateway
        .admit(request.method(), request.uri().path(), request.headers());

    match admission {
        Ok(Admission::Allowed) => next.run(request).await,
        Ok(Admission::Authenticated(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(error) => {
            warn!(
                method = %request.method(),
                path = request.uri().path(),
                error_code = error.error_code(),
                reason = error.verify_error().map(|r| r.as_str()),
                "Rejected unauthenticated request"
            );
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{allow_list::AllowRule, token::VerifyError};
    use crate::config::GatewayConfig;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(
            b"gateway-test-secret",
            Duration::days(7),
            Duration::days(30),
        ))
    }

    fn gateway(codec: Arc<TokenCodec>) -> AuthGateway {
        let allow_list = AllowList::new(vec![
            AllowRule::exact("/api/login").with_method(Method::POST),
            AllowRule::exact("/time"),
            AllowRule::subtree("/health"),
        ]);
        AuthGateway::new(codec, Arc::new(allow_list))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn raw_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn allow_listed_route_ignores_garbage_header() {
        let gateway = gateway(codec());
        for headers in [HeaderMap::new(), raw_auth("garbage"), bearer("not.a.token")] {
            assert_eq!(
                gateway.admit(&Method::POST, "/time", &headers).unwrap(),
                Admission::Allowed
            );
            assert_eq!(
                gateway.admit(&Method::GET, "/health/live", &headers).unwrap(),
                Admission::Allowed
            );
        }
    }

    #[test]
    fn preflight_is_always_allowed() {
        let gateway = gateway(codec());
        for path in ["/api/me", "/anything/else", "/"] {
            assert_eq!(
                gateway.admit(&Method::OPTIONS, path, &HeaderMap::new()).unwrap(),
                Admission::Allowed
            );
        }
    }

    #[test]
    fn method_scoped_rule_does_not_open_other_methods() {
        let gateway = gateway(codec());
        assert_eq!(
            gateway.admit(&Method::POST, "/api/login", &HeaderMap::new()).unwrap(),
            Admission::Allowed
        );
        assert!(matches!(
            gateway.admit(&Method::GET, "/api/login", &HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn protected_route_requires_bearer_header() {
        let gateway = gateway(codec());
        for headers in [
            HeaderMap::new(),
            raw_auth("Basic YWRtaW46cGFzc3dvcmQ="),
            raw_auth("bearer lowercase-scheme"),
            raw_auth("Bearer"),
        ] {
            assert!(matches!(
                gateway.admit(&Method::GET, "/api/me", &headers),
                Err(AuthError::MissingAuthHeader)
            ));
        }
    }

    #[test]
    fn invalid_token_is_rejected_with_reason() {
        let codec = codec();
        let gateway = gateway(codec.clone());

        let result = gateway.admit(&Method::GET, "/api/me", &bearer("garbage"));
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(VerifyError::MalformedToken))
        ));

        let expired = codec
            .issue_at("admin", Duration::days(7), Utc::now() - Duration::days(8))
            .unwrap();
        let result = gateway.admit(&Method::GET, "/api/me", &bearer(&expired));
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(VerifyError::Expired))
        ));

        let foreign = TokenCodec::new(b"other", Duration::days(7), Duration::days(30))
            .issue("admin", Duration::hours(1))
            .unwrap();
        let result = gateway.admit(&Method::GET, "/api/me", &bearer(&foreign));
        assert!(matches!(
            result,
            Err(AuthError::InvalidToken(VerifyError::BadSignature))
        ));
    }

    #[test]
    fn valid_token_yields_identity() {
        let codec = codec();
        let gateway = gateway(codec.clone());
        let token = codec.issue("admin", Duration::hours(1)).unwrap();

        match gateway.admit(&Method::GET, "/api/me", &bearer(&token)).unwrap() {
            Admission::Authenticated(user) => assert_eq!(user.username, "admin"),
            other => panic!("expected authenticated admission, got {other:?}"),
        }
    }

    #[test]
    fn admit_at_uses_supplied_clock() {
        let codec = codec();
        let gateway = gateway(codec.clone());
        let now = Utc::now();
        let token = codec.issue_at("admin", Duration::minutes(10), now).unwrap();

        assert!(gateway
            .admit_at(&Method::GET, "/api/me", &bearer(&token), now + Duration::minutes(9))
            .is_ok());
        assert!(gateway
            .admit_at(&Method::GET, "/api/me", &bearer(&token), now + Duration::minutes(10))
            .is_err());
    }

    #[test]
    fn bearer_token_trims_whitespace() {
        assert_eq!(bearer_token(&raw_auth("Bearer  abc.def.ghi ")).unwrap(), "abc.def.ghi");
    }

    #[tokio::test]
    async fn middleware_attaches_identity_and_blocks_handler_on_failure() {
        let state = AppState::from_config(&GatewayConfig::default());
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();

        let app = Router::new()
            .route(
                "/protected",
                get(move |Extension(user): Extension<AuthenticatedUser>| {
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        user.username
                    }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            ))
            .with_state(state.clone());

        let rejected = app
            .clone()
            .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));

        let token = state.codec.issue("carol", Duration::hours(1)).unwrap();
        let accepted = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(accepted.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));
        let body = to_bytes(accepted.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"carol");
    }
}
