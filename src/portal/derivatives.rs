// src/portal/derivatives.rs
use metrics::counter;
use serde::{Deserialize, Serialize};

use super::auth::{Authorizer, TokenSession};
use super::PortalHttp;
use crate::error::{PortalError, PortalResult};
use crate::settings::{PortalSettings, SettingsStore};

pub const PORTAL_CHECK_PATH: &str = "/feeds/media/is-bynder-portal/";
pub const DERIVATIVES_PATH: &str = "/api/v4/account/derivatives";

/// Legacy WebDAM portals have no derivatives API; these are always offered.
pub const WEBDAM_DERIVATIVES: [&str; 5] =
    ["webImage", "thumbnail", "mini", "original", "transformBaseURL"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalKind {
    Bynder,
    WebDam,
}

/// One entry of the account derivatives listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Derivative {
    pub prefix: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_on_the_fly: bool,
}

/// Public, pre-generated derivatives only, sorted by prefix.
pub fn public_prefixes(derivatives: Vec<Derivative>) -> Vec<String> {
    let mut out: Vec<String> = derivatives
        .into_iter()
        .filter(|d| d.is_public && !d.is_on_the_fly)
        .map(|d| d.prefix)
        .collect();
    out.sort();
    out
}

pub fn webdam_derivatives() -> Vec<String> {
    let mut out: Vec<String> = WEBDAM_DERIVATIVES.iter().map(|s| s.to_string()).collect();
    out.sort();
    out
}

#[derive(Clone, Debug)]
pub struct DerivativeClient {
    http: PortalHttp,
    authorizer: Authorizer,
}

impl DerivativeClient {
    pub fn new(http: PortalHttp) -> Self {
        let authorizer = Authorizer::new(http.clone());
        Self { http, authorizer }
    }

    /// A portal is Bynder unless the check endpoint reports a `webdam` key.
    pub async fn detect_portal(&self, domain: &str) -> PortalResult<PortalKind> {
        let url = self.http.url(domain, PORTAL_CHECK_PATH);
        let resp = self
            .http
            .client()
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            return Err(PortalError::DomainCheck { status });
        }

        let body = resp.text().await?;
        let is_webdam = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("webdam").map(|w| !w.is_null()))
            .unwrap_or(false);

        Ok(if is_webdam {
            PortalKind::WebDam
        } else {
            PortalKind::Bynder
        })
    }

    /// Whether the admin screen should enable "fetch derivatives": a domain is
    /// set, and either client credentials exist or the portal is not Bynder.
    pub async fn can_fetch(&self, settings: &PortalSettings) -> PortalResult<bool> {
        if settings.domain.is_empty() {
            return Ok(false);
        }
        if settings.has_client_credentials() {
            return Ok(true);
        }
        Ok(self.detect_portal(&settings.domain).await? != PortalKind::Bynder)
    }

    /// Resolve the derivatives selectable for this portal, sorted.
    pub async fn fetch_available(&self, settings: &PortalSettings) -> PortalResult<Vec<String>> {
        if settings.domain.is_empty() {
            return Err(PortalError::ConfigIncomplete);
        }

        match self.detect_portal(&settings.domain).await? {
            PortalKind::WebDam => Ok(webdam_derivatives()),
            PortalKind::Bynder => {
                let cfg = settings.portal_config();
                if !cfg.is_complete() {
                    return Err(PortalError::ConfigIncomplete);
                }

                // Interactive path never reuses a token from an earlier run.
                let mut session = TokenSession::new();
                let token = session.token(&self.authorizer, &cfg).await?;

                let url = self.http.url(&cfg.domain, DERIVATIVES_PATH);
                let resp = self
                    .http
                    .client()
                    .get(&url)
                    .bearer_auth(token.as_str())
                    .header(reqwest::header::CONTENT_TYPE, "application/json; charset=utf-8")
                    .send()
                    .await?;

                let status = resp.status().as_u16();
                if status != 200 {
                    return Err(PortalError::Derivatives { status });
                }
                let body = resp.text().await?;
                let listing: Vec<Derivative> = serde_json::from_str(&body)
                    .map_err(|e| PortalError::InvalidResponse(e.to_string()))?;
                Ok(public_prefixes(listing))
            }
        }
    }
}

/// Fetch derivatives and store them as the available set. Returns what was stored.
pub async fn refresh_derivatives(
    store: &dyn SettingsStore,
    client: &DerivativeClient,
) -> PortalResult<Vec<String>> {
    crate::metrics::ensure_described();
    let settings = store.get();
    match client.fetch_available(&settings).await {
        Ok(available) => {
            counter!("portal_derivative_fetch_total", "outcome" => "ok").increment(1);
            tracing::info!(target: "portal", count = available.len(), "derivatives retrieved");
            // Edits saved while the portal was answering must survive.
            store.update(&mut |s: &mut PortalSettings| {
                s.available_derivatives = Some(available.clone())
            });
            Ok(available)
        }
        Err(e) => {
            counter!("portal_derivative_fetch_total", "outcome" => "error").increment(1);
            tracing::warn!(target: "portal", error = %e, "derivative fetch failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(prefix: &str, public: bool, otf: bool) -> Derivative {
        Derivative {
            prefix: prefix.into(),
            is_public: public,
            is_on_the_fly: otf,
        }
    }

    #[test]
    fn keeps_public_pregenerated_sorted() {
        let out = public_prefixes(vec![
            d("webLarge", true, false),
            d("private", false, false),
            d("dynamic", true, true),
            d("banner", true, false),
        ]);
        assert_eq!(out, vec!["banner".to_string(), "webLarge".to_string()]);
    }

    #[test]
    fn webdam_list_is_sorted() {
        assert_eq!(
            webdam_derivatives(),
            vec!["mini", "original", "thumbnail", "transformBaseURL", "webImage"]
        );
    }

    #[test]
    fn derivative_listing_parses_camel_case() {
        let json = r#"[{"prefix":"hero","isPublic":true,"isOnTheFly":false,"width":1200}]"#;
        let v: Vec<Derivative> = serde_json::from_str(json).unwrap();
        assert_eq!(v, vec![d("hero", true, false)]);
    }
}
