// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::{AllowList, AuthGateway, CredentialStore, TokenCodec},
    config::GatewayConfig,
};

/// Shared, read-only state handed to handlers and the gateway middleware.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub credentials: Arc<CredentialStore>,
    pub gateway: AuthGateway,
}

impl AppState {
    pub fn new(codec: TokenCodec, credentials: CredentialStore, allow_list: AllowList) -> Self {
        let codec = Arc::new(codec);
        let gateway = AuthGateway::new(codec.clone(), Arc::new(allow_list));
        Self {
            codec,
            credentials: Arc::new(credentials),
            gateway,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        let codec = TokenCodec::new(
            config.jwt_secret.as_bytes(),
            config.access_token_ttl,
            config.refresh_token_ttl,
        );
        let credentials = CredentialStore::with_random_key(config.users.iter().cloned());
        Self::new(codec, credentials, config.allow_list.clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}
