// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are compact JWTs: `base64url(header).base64url(claims).base64url(sig)`
//! with an HS256 signature over the first two segments. The codec holds the
//! static signing secret and the per-tier lifetimes; it never touches shared
//! mutable state, so one instance can be used from any number of tasks.
//!
//! Verification runs in a fixed order and stops at the first failure:
//!
//! 1. structure (three non-empty base64url segments) → [`VerifyError::MalformedToken`]
//! 2. HMAC signature, compared in constant time → [`VerifyError::BadSignature`]
//! 3. claims decoding → [`VerifyError::MalformedToken`]
//! 4. expiry (`exp <= now`) → [`VerifyError::Expired`]

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::TokenClaims;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Lifetime class of an issued token.
///
/// Both tiers share the same verification path; they differ only in TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTier {
    Access,
    Refresh,
}

/// Why a token was rejected.
///
/// Kept for logs and tests; clients only ever see a generic "Invalid token".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    MalformedToken,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

impl VerifyError {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyError::MalformedToken => "malformed_token",
            VerifyError::BadSignature => "bad_signature",
            VerifyError::Expired => "expired",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token TTL must be at least one second, got {0}")]
    InvalidTtl(Duration),

    #[error("token expiry is out of range: {ttl} after {issued_at}")]
    ExpiryOutOfRange {
        issued_at: DateTime<Utc>,
        ttl: Duration,
    },

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 tokens with a single static secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Configured lifetime of a tier.
    pub fn ttl(&self, tier: TokenTier) -> Duration {
        match tier {
            TokenTier::Access => self.access_ttl,
            TokenTier::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a token for `username` valid for `ttl` from now.
    pub fn issue(&self, username: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(username, ttl, Utc::now())
    }

    /// Issue a token using the configured lifetime of `tier`.
    pub fn issue_for(&self, username: &str, tier: TokenTier) -> Result<String, TokenError> {
        self.issue(username, self.ttl(tier))
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        username: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if ttl < Duration::seconds(1) {
            return Err(TokenError::InvalidTtl(ttl));
        }

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange { issued_at: now, ttl })?;

        let claims = TokenClaims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?)
    }

    /// Verify a token against the wall clock.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, VerifyError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, VerifyError> {
        check_structure(token)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => VerifyError::BadSignature,
                _ => VerifyError::MalformedToken,
            },
        )?;

        if data.claims.is_expired_at(now) {
            return Err(VerifyError::Expired);
        }

        Ok(data.claims)
    }
}

/// Exactly three non-empty, unpadded base64url segments.
fn check_structure(token: &str) -> Result<(), VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(VerifyError::MalformedToken);
    }

    for segment in segments {
        if segment.is_empty() || Base64UrlUnpadded::decode_vec(segment).is_err() {
            return Err(VerifyError::MalformedToken);
        }
    }

    Ok(())
}
