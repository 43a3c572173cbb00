//! Usage sync service entrypoint.
//! Loads portal settings, schedules the hourly usage sync, and serves the
//! admin router (settings, derivatives, manual sync, metrics).

use std::sync::Arc;

use bynder_usage_sync::content::file::JsonFileContentStore;
use bynder_usage_sync::logging::init_tracing;
use bynder_usage_sync::metrics::Metrics;
use bynder_usage_sync::portal::PortalHttp;
use bynder_usage_sync::settings::config::{load_settings_default, SyncConfig};
use bynder_usage_sync::settings::InMemorySettingsStore;
use bynder_usage_sync::usage::scheduler::spawn_usage_sync;
use bynder_usage_sync::{build_admin_state, create_router};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SyncConfig::from_env();
    let settings = load_settings_default()?;
    tracing::info!(
        domain = %settings.domain,
        configured = settings.portal_config().is_complete(),
        content = %cfg.content_path.display(),
        "portal settings loaded"
    );

    let metrics = Metrics::init(cfg.interval.as_secs())?;
    let http = PortalHttp::from_config(&cfg).map_err(anyhow::Error::from)?;

    let state = build_admin_state(
        Arc::new(InMemorySettingsStore::new(settings)),
        Arc::new(JsonFileContentStore::new(cfg.content_path.clone())),
        http,
    );

    // Runs for the lifetime of the service; the handle is detached on drop.
    let _schedule = spawn_usage_sync(state.sync.clone(), cfg.interval);

    let router = create_router(state).merge(metrics.router());
    Ok(router.into())
}
