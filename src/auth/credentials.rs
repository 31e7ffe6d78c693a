// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed username → password store used by the login endpoint.
//!
//! Passwords are compared by HMAC-SHA256 tag with a constant-time verify, and
//! unknown usernames go through the same comparison as known ones.

use std::{collections::HashMap, fmt};

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const COMPARISON_KEY_LEN: usize = 32;

/// In-memory credential map, read-only after construction.
pub struct CredentialStore {
    users: HashMap<String, String>,
    key: Vec<u8>,
}

impl CredentialStore {
    /// Build a store from `(username, password)` pairs.
    ///
    /// `key` only keys the comparison MAC; it never leaves the store.
    pub fn new<I>(key: impl Into<Vec<u8>>, users: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            users: users.into_iter().collect(),
            key: key.into(),
        }
    }

    /// Build a store keyed with fresh random bytes, unrelated to any other
    /// secret in the process.
    pub fn with_random_key<I>(users: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut key = vec![0u8; COMPARISON_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(key, users)
    }

    /// Stored password for `username`, if the user exists.
    pub fn lookup(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }

    /// True iff `username` exists and `password` equals its stored password.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let stored = self.lookup(username);

        let (Some(submitted), Some(mut expected)) = (self.tag(password), self.mac()) else {
            return false;
        };
        expected.update(stored.unwrap_or_default().as_bytes());
        let matches = expected.verify_slice(&submitted).is_ok();

        matches && stored.is_some()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).ok()
    }

    fn tag(&self, value: &str) -> Option<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(value.as_bytes());
        Some(mac.finalize().into_bytes().to_vec())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}
