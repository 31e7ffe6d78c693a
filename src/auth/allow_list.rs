// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Routes reachable without a bearer token.
//!
//! Entries use the grammar `[METHOD ]PATH`. A path ending in `/*` matches
//! the base path and everything below it on a segment boundary
//! (`/health/*` matches `/health` and `/health/live`, but not `/healthz`);
//! any other path must match exactly.

use std::{fmt, str::FromStr};

use axum::http::Method;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid allow-list entry {entry:?}: {reason}")]
pub struct AllowListError {
    pub entry: String,
    pub reason: &'static str,
}

impl AllowListError {
    fn new(entry: &str, reason: &'static str) -> Self {
        Self {
            entry: entry.to_string(),
            reason,
        }
    }
}

/// How a rule compares against the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Path must be equal.
    Exact(String),
    /// Base path itself or anything below it.
    Subtree(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(expected) => path == expected,
            PathPattern::Subtree(base) => {
                path == base
                    || path
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// A single allow-list entry, optionally scoped to one HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowRule {
    method: Option<Method>,
    pattern: PathPattern,
}

impl AllowRule {
    pub fn exact(path: impl Into<String>) -> Self {
        Self {
            method: None,
            pattern: PathPattern::Exact(path.into()),
        }
    }

    pub fn subtree(base: impl Into<String>) -> Self {
        Self {
            method: None,
            pattern: PathPattern::Subtree(base.into()),
        }
    }

    /// Restrict the rule to a single method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

impl FromStr for AllowRule {
    type Err = AllowListError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let trimmed = entry.trim();
        let (method, path) = match trimmed.split_once(char::is_whitespace) {
            Some((method, path)) => {
                let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .map_err(|_| AllowListError::new(entry, "unknown HTTP method"))?;
                (Some(method), path.trim())
            }
            None => (None, trimmed),
        };

        if !path.starts_with('/') {
            return Err(AllowListError::new(entry, "path must start with '/'"));
        }
        if path.contains(char::is_whitespace) {
            return Err(AllowListError::new(entry, "path must not contain whitespace"));
        }

        let pattern = match path.strip_suffix("/*") {
            Some(base) => PathPattern::Subtree(base.to_string()),
            None if path.contains('*') => {
                return Err(AllowListError::new(entry, "wildcard is only allowed as a trailing '/*'"))
            }
            None => PathPattern::Exact(path.to_string()),
        };

        Ok(Self { method, pattern })
    }
}

impl fmt::Display for AllowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(method) = &self.method {
            write!(f, "{method} ")?;
        }
        match &self.pattern {
            PathPattern::Exact(path) => write!(f, "{path}"),
            PathPattern::Subtree(base) => write!(f, "{base}/*"),
        }
    }
}

/// Ordered set of [`AllowRule`]s, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    rules: Vec<AllowRule>,
}

impl AllowList {
    pub fn new(rules: Vec<AllowRule>) -> Self {
        Self { rules }
    }

    /// An allow-list with no entries: every non-pre-flight request needs a token.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Parse a comma-separated list of entries. Blank entries are skipped.
    pub fn parse(raw: &str) -> Result<Self, AllowListError> {
        let rules = raw
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First rule matching the request, in configured order.
    pub fn find(&self, method: &Method, path: &str) -> Option<&AllowRule> {
        self.rules.iter().find(|rule| rule.matches(method, path))
    }

    pub fn rules(&self) -> &[AllowRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for AllowList {
    /// Same rules as [`crate::config::DEFAULT_ALLOW_LIST`].
    fn default() -> Self {
        Self::new(vec![
            AllowRule::exact("/api/login"),
            AllowRule::exact("/time"),
            AllowRule::subtree("/health"),
            AllowRule::subtree("/docs"),
            AllowRule::subtree("/api-doc"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ALLOW_LIST;

    #[test]
    fn default_matches_documented_entries() {
        assert_eq!(AllowList::parse(DEFAULT_ALLOW_LIST).unwrap(), AllowList::default());
    }

    #[test]
    fn exact_rule_requires_equal_path() {
        let rule = AllowRule::exact("/api/login");
        assert!(rule.matches(&Method::POST, "/api/login"));
        assert!(rule.matches(&Method::GET, "/api/login"));
        assert!(!rule.matches(&Method::POST, "/api/login/"));
        assert!(!rule.matches(&Method::POST, "/api/loginx"));
    }

    #[test]
    fn subtree_rule_respects_segment_boundary() {
        let rule: AllowRule = "/health/*".parse().unwrap();
        assert!(rule.matches(&Method::GET, "/health"));
        assert!(rule.matches(&Method::GET, "/health/live"));
        assert!(rule.matches(&Method::GET, "/health/ready/deep"));
        assert!(!rule.matches(&Method::GET, "/healthz"));
        assert!(!rule.matches(&Method::GET, "/api/health"));
    }

    #[test]
    fn method_scoped_rule_only_matches_that_method() {
        let rule: AllowRule = "post /api/login".parse().unwrap();
        assert_eq!(rule, AllowRule::exact("/api/login").with_method(Method::POST));
        assert!(rule.matches(&Method::POST, "/api/login"));
        assert!(!rule.matches(&Method::GET, "/api/login"));
    }

    #[test]
    fn parse_skips_blank_entries_and_keeps_order() {
        let list = AllowList::parse(" /b , , GET /a/* ,").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.rules()[0], AllowRule::exact("/b"));
        assert_eq!(list.rules()[1], AllowRule::subtree("/a").with_method(Method::GET));
    }

    #[test]
    fn find_returns_first_matching_rule() {
        let list = AllowList::new(vec![
            AllowRule::subtree("/docs").with_method(Method::GET),
            AllowRule::subtree("/docs"),
        ]);
        let rule = list.find(&Method::GET, "/docs/index.html").unwrap();
        assert_eq!(rule, &AllowRule::subtree("/docs").with_method(Method::GET));
        let rule = list.find(&Method::POST, "/docs/index.html").unwrap();
        assert_eq!(rule, &AllowRule::subtree("/docs"));
    }

    #[test]
    fn invalid_entries_are_rejected() {
        assert!("api/login".parse::<AllowRule>().is_err());
        assert!("/api/*/x".parse::<AllowRule>().is_err());
        assert!("/api*".parse::<AllowRule>().is_err());
        assert!("GE\u{0}T /x".parse::<AllowRule>().is_err());
        assert!("GET /a b".parse::<AllowRule>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for entry in ["/time", "POST /api/login", "/docs/*"] {
            let rule: AllowRule = entry.parse().unwrap();
            assert_eq!(rule.to_string(), entry);
        }
    }

    #[test]
    fn empty_list_matches_nothing() {
        let list = AllowList::empty();
        assert!(list.is_empty());
        assert!(list.find(&Method::GET, "/").is_none());
    }
}
