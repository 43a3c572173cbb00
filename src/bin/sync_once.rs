//! Runs a single usage sync against the configured portal and prints the run report.

use std::sync::Arc;

use anyhow::Result;
use bynder_usage_sync::content::file::JsonFileContentStore;
use bynder_usage_sync::logging::init_tracing;
use bynder_usage_sync::portal::PortalHttp;
use bynder_usage_sync::settings::config::{load_settings_default, SyncConfig};
use bynder_usage_sync::settings::InMemorySettingsStore;
use bynder_usage_sync::UsageSync;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SyncConfig::from_env();
    let settings = load_settings_default()?;
    let http = PortalHttp::from_config(&cfg)?;

    let sync = UsageSync::new(
        Arc::new(InMemorySettingsStore::new(settings)),
        Arc::new(JsonFileContentStore::new(cfg.content_path.clone())),
        http,
    );

    let run = sync.run_once().await;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}
