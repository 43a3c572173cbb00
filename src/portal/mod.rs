// src/portal/mod.rs
//! HTTP plumbing shared by every call against the DAM portal.
//!
//! All endpoints live under `https://{domain}`; a base URL override replaces
//! that prefix so tests and proxies can point the client elsewhere.

pub mod auth;
pub mod derivatives;

use std::time::Duration;

use crate::error::PortalResult;
use crate::settings::config::SyncConfig;

pub const USER_AGENT: &str = concat!("bynder-usage-sync/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct PortalHttp {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl PortalHttp {
    pub fn new(timeout: Duration) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: None,
        })
    }

    pub fn from_config(cfg: &SyncConfig) -> PortalResult<Self> {
        let http = Self::new(cfg.http_timeout)?;
        Ok(match &cfg.base_url {
            Some(base) => http.with_base_url(base.clone()),
            None => http,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base: String = base_url.into();
        self.base_url = Some(base.trim_end_matches('/').to_string());
        self
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// `path` must start with `/`.
    pub(crate) fn url(&self, domain: &str, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{base}{path}"),
            None => format!("https://{}{path}", bare_host(domain)),
        }
    }
}

/// Settings accept `https://portal.example.com` as well as the bare host;
/// requests always need the bare host.
pub(crate) fn bare_host(domain: &str) -> &str {
    let d = domain.trim();
    let d = d
        .strip_prefix("https://")
        .or_else(|| d.strip_prefix("http://"))
        .unwrap_or(d);
    d.trim_end_matches('/')
}
