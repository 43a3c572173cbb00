// src/settings/mod.rs
pub mod config;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;

/// Compact View selection mode, only relevant to the single asset block.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SelectionMode {
    /// Compact View returns the configured derivative.
    #[default]
    SingleSelect,
    /// Enables derivative selection and the DAT UI in Compact View.
    SingleSelectFile,
}

/// Everything an administrator can configure for the portal integration.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalSettings {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    pub default_search_term: String,
    pub selection_mode: SelectionMode,
    pub image_derivative: Option<String>,
    /// `None` until derivatives have been fetched once.
    pub available_derivatives: Option<Vec<String>>,
}

impl PortalSettings {
    pub fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            domain: self.domain.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for PortalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalSettings")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret_len", &self.client_secret.len())
            .field("default_search_term", &self.default_search_term)
            .field("selection_mode", &self.selection_mode)
            .field("image_derivative", &self.image_derivative)
            .field("available_derivatives", &self.available_derivatives)
            .finish()
    }
}

/// The three values every portal call needs.
#[derive(Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
}

impl PortalConfig {
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Usage sync and OAuth calls are only attempted when this holds.
    pub fn is_complete(&self) -> bool {
        !self.domain.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret_len", &self.client_secret.len())
            .finish()
    }
}

/// Where the admin surface reads and writes settings.
pub trait SettingsStore: Send + Sync {
    fn get(&self) -> PortalSettings;
    fn put(&self, settings: PortalSettings);

    /// Read-modify-write against the current settings. Stores that can
    /// should hold their lock across `apply`.
    fn update(&self, apply: &mut dyn FnMut(&mut PortalSettings)) {
        let mut settings = self.get();
        apply(&mut settings);
        self.put(settings);
    }
}

/// Process-local store, seeded at start-up. Nothing is written to disk.
#[derive(Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<PortalSettings>,
}

impl InMemorySettingsStore {
    pub fn new(settings: PortalSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self) -> PortalSettings {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn put(&self, settings: PortalSettings) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
    }

    fn update(&self, apply: &mut dyn FnMut(&mut PortalSettings)) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut *guard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_all_three_fields() {
        assert!(PortalConfig::new("a.getbynder.com", "id", "secret").is_complete());
        assert!(!PortalConfig::new("", "id", "secret").is_complete());
        assert!(!PortalConfig::new("a.getbynder.com", "", "secret").is_complete());
        assert!(!PortalConfig::new("a.getbynder.com", "id", "").is_complete());
    }

    #[test]
    fn update_touches_only_what_it_sets() {
        let store = InMemorySettingsStore::new(PortalSettings {
            domain: "a.getbynder.com".into(),
            client_secret: "s".into(),
            ..Default::default()
        });
        store.update(&mut |s: &mut PortalSettings| {
            s.image_derivative = Some("thumb".into())
        });
        let got = store.get();
        assert_eq!(got.image_derivative.as_deref(), Some("thumb"));
        assert_eq!(got.domain, "a.getbynder.com");
        assert_eq!(got.client_secret, "s");
    }

    #[test]
    fn debug_output_never_contains_the_secret() {
        let cfg = PortalConfig::new("a.getbynder.com", "id", "hunter2");
        assert!(!format!("{cfg:?}").contains("hunter2"));

        let settings = PortalSettings {
            client_secret: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{settings:?}").contains("hunter2"));
    }

    #[test]
    fn store_round_trips_settings() {
        let store = InMemorySettingsStore::default();
        assert_eq!(store.get(), PortalSettings::default());
        let s = PortalSettings {
            domain: "a.getbynder.com".into(),
            ..Default::default()
        };
        store.put(s.clone());
        assert_eq!(store.get(), s);
    }
}
