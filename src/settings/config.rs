// src/settings/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::PortalSettings;

const ENV_SETTINGS_PATH: &str = "BYNDER_SETTINGS_PATH";
const ENV_DOMAIN: &str = "BYNDER_DOMAIN";
const ENV_CLIENT_ID: &str = "BYNDER_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "BYNDER_CLIENT_SECRET";

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONTENT_PATH: &str = "config/content.json";

/// Load settings from an explicit path. Supports TOML or JSON formats.
pub fn load_settings_from(path: &Path) -> Result<PortalSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading portal settings from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_settings(&content, ext.as_str())
}

/// Load settings using env var + fallbacks, then apply credential env overrides:
/// 1) $BYNDER_SETTINGS_PATH
/// 2) config/bynder.toml
/// 3) config/bynder.json
/// 4) defaults (everything empty, sync disabled)
pub fn load_settings_default() -> Result<PortalSettings> {
    let mut settings = load_settings_file()?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

fn load_settings_file() -> Result<PortalSettings> {
    if let Ok(p) = std::env::var(ENV_SETTINGS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_settings_from(&pb);
        } else {
            return Err(anyhow!("BYNDER_SETTINGS_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/bynder.toml");
    if toml_p.exists() {
        return load_settings_from(&toml_p);
    }
    let json_p = PathBuf::from("config/bynder.json");
    if json_p.exists() {
        return load_settings_from(&json_p);
    }
    Ok(PortalSettings::default())
}

/// Non-empty `BYNDER_DOMAIN` / `BYNDER_CLIENT_ID` / `BYNDER_CLIENT_SECRET` win over the file.
pub fn apply_env_overrides(settings: &mut PortalSettings) {
    let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    if let Some(v) = read(ENV_DOMAIN) {
        settings.domain = v.trim().to_string();
    }
    if let Some(v) = read(ENV_CLIENT_ID) {
        settings.client_id = v.trim().to_string();
    }
    if let Some(v) = read(ENV_CLIENT_SECRET) {
        settings.client_secret = v.trim().to_string();
    }
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<PortalSettings> {
    match hint_ext {
        "toml" => toml::from_str(s).context("parsing settings toml"),
        "json" => serde_json::from_str(s).context("parsing settings json"),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|_| anyhow!("unsupported settings format")),
    }
}

/// Runtime knobs for the sync service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    pub interval: Duration,
    pub http_timeout: Duration,
    /// Replaces `https://{domain}` for every portal call (tests, proxies).
    pub base_url: Option<String>,
    /// JSON export of content items consumed by the file-backed content store.
    pub content_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            base_url: None,
            content_path: PathBuf::from(DEFAULT_CONTENT_PATH),
        }
    }
}

impl SyncConfig {
    /// Reads `BYNDER_SYNC_INTERVAL_SECS`, `BYNDER_HTTP_TIMEOUT_SECS`,
    /// `BYNDER_BASE_URL` and `BYNDER_CONTENT_PATH`; unset or unparsable
    /// values fall back to defaults.
    pub fn from_env() -> Self {
        let secs = |key: &str, default: u64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        Self {
            interval: Duration::from_secs(secs(
                "BYNDER_SYNC_INTERVAL_SECS",
                DEFAULT_SYNC_INTERVAL_SECS,
            )),
            http_timeout: Duration::from_secs(secs(
                "BYNDER_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            base_url: std::env::var("BYNDER_BASE_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            content_path: std::env::var("BYNDER_CONTENT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SelectionMode;

    #[test]
    fn toml_and_json_formats_work() {
        let toml = r#"
domain = "myportal.getbynder.com"
client_id = "id"
client_secret = "secret"
selection_mode = "SingleSelectFile"
"#;
        let s = parse_settings(toml, "toml").unwrap();
        assert_eq!(s.domain, "myportal.getbynder.com");
        assert_eq!(s.selection_mode, SelectionMode::SingleSelectFile);
        assert!(s.portal_config().is_complete());

        let json = r#"{"domain":"x.webdamdb.com","available_derivatives":["mini"]}"#;
        let s = parse_settings(json, "json").unwrap();
        assert_eq!(s.domain, "x.webdamdb.com");
        assert_eq!(s.selection_mode, SelectionMode::SingleSelect);
        assert!(!s.portal_config().is_complete());
    }

    #[test]
    fn unknown_extension_sniffs_format() {
        let s = parse_settings(r#"domain = "a.getbynder.com""#, "").unwrap();
        assert_eq!(s.domain, "a.getbynder.com");
        assert!(parse_settings("{{{", "").is_err());
    }
}
