// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// Content scans are in-memory regex passes; most finish well under 50 ms.
const SCAN_MS_BUCKETS: &[f64] = &[1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1_000.0];

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder, describe the sync and portal series
    /// and publish the configured sync interval.
    pub fn init(sync_interval_secs: u64) -> Result<Self> {
        let handle = builder()?
            .install_recorder()
            .context("prometheus: install recorder")?;

        ensure_described();
        gauge!("usage_sync_interval_secs").set(sync_interval_secs as f64);

        Ok(Self { handle })
    }

    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full("usage_sync_scan_ms".into()), SCAN_MS_BUCKETS)
        .context("prometheus: scan histogram buckets")
}

fn describe_all() {
    describe_gauge!("usage_sync_interval_secs", "Configured usage sync period in seconds.");
    describe_counter!("usage_sync_runs_total", "Usage sync runs by result.");
    describe_counter!(
        "usage_sync_submissions_total",
        "Usage payload submissions by result."
    );
    describe_counter!("portal_authorize_total", "OAuth token exchanges by outcome.");
    describe_counter!(
        "portal_derivative_fetch_total",
        "Derivative refreshes from the admin screen by outcome."
    );
    describe_gauge!("usage_sync_usages", "Asset usages found by the last scan.");
    describe_gauge!("usage_sync_uris", "Content items covered by the last scan.");
    describe_gauge!("usage_sync_last_run_ts", "Unix ts when usage sync last ran.");
    describe_histogram!("usage_sync_scan_ms", "Content scan time in milliseconds.");
}

/// One-time registration so series show up on /metrics with help text.
pub(crate) fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_all);
}
