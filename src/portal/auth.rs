// src/portal/auth.rs
use std::fmt;

use metrics::counter;
use serde::Deserialize;

use super::PortalHttp;
use crate::error::{PortalError, PortalResult, MISSING_ACCESS_TOKEN};
use crate::settings::PortalConfig;

pub const TOKEN_PATH: &str = "/v6/authentication/oauth2/token";
pub const USAGE_SCOPE: &str = "asset.usage:read asset.usage:write";

/// Opaque OAuth access token. Only valid for the run that obtained it.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(len={})", self.0.len())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client-credentials exchange against the portal's identity endpoint.
/// Config in, token or failure out; it never caches.
#[derive(Clone, Debug)]
pub struct Authorizer {
    http: PortalHttp,
}

impl Authorizer {
    pub fn new(http: PortalHttp) -> Self {
        Self { http }
    }

    pub async fn authorize(&self, cfg: &PortalConfig) -> PortalResult<BearerToken> {
        let result = self.exchange(cfg).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        counter!("portal_authorize_total", "outcome" => outcome).increment(1);
        if let Err(e) = &result {
            tracing::warn!(target: "portal", domain = %cfg.domain, error = %e, "authorization failed");
        }
        result
    }

    async fn exchange(&self, cfg: &PortalConfig) -> PortalResult<BearerToken> {
        let url = self.http.url(&cfg.domain, TOKEN_PATH);
        let form = [
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", USAGE_SCOPE),
        ];

        let resp = self
            .http
            .client()
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| PortalError::authorization(format!("token request failed: {e}")))?;

        let status = resp.status();
        if status.as_u16() != 200 {
            return Err(PortalError::authorization(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PortalError::authorization(format!("reading token response: {e}")))?;
        if body.trim().is_empty() {
            return Err(PortalError::authorization("empty token response"));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| PortalError::authorization(format!("unparsable token response: {e}")))?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(BearerToken(token)),
            _ => Err(PortalError::authorization(MISSING_ACCESS_TOKEN)),
        }
    }
}

/// Token cache scoped to one logical run. Build a fresh one per run, or call
/// [`TokenSession::invalidate`] before reusing it.
#[derive(Debug, Default)]
pub struct TokenSession {
    token: Option<BearerToken>,
}

impl TokenSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.token = None;
    }

    /// Cached token, or authorize and remember the result. Failures are not cached.
    pub async fn token(
        &mut self,
        authorizer: &Authorizer,
        cfg: &PortalConfig,
    ) -> PortalResult<BearerToken> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let token = authorizer.authorize(cfg).await?;
        self.token = Some(token.clone());
        Ok(token)
    }
}
