// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reusable sign-in credentials for the bot identity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Browser cookies captured after an interactive sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub identity: String,
    pub cookies: Vec<Cookie>,
    pub saved_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(identity: impl Into<String>, cookies: Vec<Cookie>, saved_at: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            cookies,
            saved_at,
        }
    }

    /// A credential with no cookies cannot authenticate anything
    pub fn is_usable(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Cookies that apply to `host`. Cookies without a domain apply
    /// everywhere; a leading dot matches subdomains.
    pub fn cookies_for(&self, host: &str) -> Vec<Cookie> {
        self.cookies
            .iter()
            .filter(|c| match c.domain.as_deref() {
                None => true,
                Some(domain) => {
                    let bare = domain.trim_start_matches('.');
                    host == bare || host.ends_with(&format!(".{bare}"))
                }
            })
            .cloned()
            .collect()
    }
}
