// src/settings/sanitize.rs
use serde::{Deserialize, Serialize};
use url::Url;

use super::{PortalSettings, SelectionMode};

pub const INVALID_DOMAIN: &str = "Invalid domain, please only enter the domain name";

/// Administrator submission. Absent fields keep their stored value, which is how
/// an unchanged client secret survives a save without being posted again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub default_search_term: Option<String>,
    pub selection_mode: Option<SelectionMode>,
    /// Empty string clears the derivative.
    pub image_derivative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub settings: PortalSettings,
    pub errors: Vec<String>,
}

/// Merge an update over the existing settings, rejecting a malformed domain.
/// A rejected domain leaves the previous one in place; other fields still apply.
pub fn sanitize_settings(existing: &PortalSettings, update: SettingsUpdate) -> Sanitized {
    let mut settings = existing.clone();
    let mut errors = Vec::new();

    if let Some(domain) = update.domain {
        if domain.is_empty() || is_valid_domain(&domain) {
            settings.domain = domain;
        } else {
            tracing::warn!(target: "settings", domain = %domain, "rejected invalid portal domain");
            errors.push(INVALID_DOMAIN.to_string());
        }
    }
    if let Some(v) = update.client_id {
        settings.client_id = v;
    }
    if let Some(v) = update.client_secret {
        settings.client_secret = v;
    }
    if let Some(v) = update.default_search_term {
        settings.default_search_term = v;
    }
    if let Some(v) = update.selection_mode {
        settings.selection_mode = v;
    }
    if let Some(v) = update.image_derivative {
        settings.image_derivative = if v.is_empty() { None } else { Some(v) };
    }

    Sanitized { settings, errors }
}

/// A domain is accepted when, with `https://` prepended if it has no scheme, it
/// is an http(s) URL with a host and nothing a URL escaper would strip.
pub fn is_valid_domain(raw: &str) -> bool {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    if !candidate.chars().all(is_url_safe_char) {
        return false;
    }

    match Url::parse(&candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

fn is_url_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || !c.is_ascii()
        || matches!(
            c,
            '-' | '~'
                | '+'
                | '_'
                | '.'
                | '?'
                | '#'
                | '='
                | '!'
                | '&'
                | ';'
                | ','
                | '/'
                | ':'
                | '%'
                | '@'
                | '$'
                | '|'
                | '*'
                | '\''
                | '('
                | ')'
                | '['
                | ']'
        )
}
