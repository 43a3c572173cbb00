// src/lib.rs
// Public library surface for the service binary, tools and integration tests.

pub mod api;
pub mod blocks;
pub mod content;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod portal;
pub mod settings;
pub mod usage;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AdminState};
pub use crate::error::{PortalError, PortalResult};
pub use crate::settings::{PortalConfig, PortalSettings};
pub use crate::usage::{SyncRun, UsageSync};

use std::sync::Arc;

use crate::content::ContentStore;
use crate::portal::{derivatives::DerivativeClient, PortalHttp};
use crate::settings::SettingsStore;

/// Wire the admin state from its collaborators; the same HTTP client backs
/// the usage sync and the derivatives flow.
pub fn build_admin_state(
    settings: Arc<dyn SettingsStore>,
    content: Arc<dyn ContentStore>,
    http: PortalHttp,
) -> AdminState {
    let sync = Arc::new(UsageSync::new(settings.clone(), content, http.clone()));
    AdminState {
        settings,
        derivatives: DerivativeClient::new(http),
        sync,
    }
}
