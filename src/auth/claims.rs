// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried in the payload segment of a gateway token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username the token was issued to
    pub username: String,

    /// Issued at timestamp (Unix seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix seconds); the token is expired once `now >= exp`
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Authenticated user information extracted from a verified token.
///
/// Attached to the request extensions by the gateway and dropped with the
/// request; it is never stored between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Username from the token claims
    pub username: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            username: claims.username,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_claims() -> TokenClaims {
        TokenClaims {
            username: "admin".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        }
    }

    #[test]
    fn from_claims_keeps_username_and_expiry() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.username, "admin");
        assert_eq!(user.expires_at, 1_700_003_600);
    }

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let claims = sample_claims();
        let before = Utc.timestamp_opt(claims.exp - 1, 0).unwrap();
        let at = Utc.timestamp_opt(claims.exp, 0).unwrap();
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(at));
    }

    #[test]
    fn claims_serialize_with_registered_names() {
        let json = serde_json::to_value(sample_claims()).unwrap();
        assert_eq!(json["username"], "admin");
        assert_eq!(json["exp"], 1_700_003_600);
        assert_eq!(json["iat"], 1_700_000_000);
    }
}
