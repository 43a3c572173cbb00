// src/usage/mod.rs
//! Asset-usage synchronization: scan content for embedded assets and report
//! them to the portal's usage API.

pub mod payload;
pub mod reporter;
pub mod scanner;
pub mod scheduler;

use std::sync::Arc;

use metrics::{counter, gauge, histogram};
use serde::Serialize;

use crate::content::{ContentQuery, ContentStore};
use crate::portal::auth::{Authorizer, TokenSession};
use crate::portal::PortalHttp;
use crate::settings::SettingsStore;
use reporter::{SubmitOutcome, UsageReporter};

/// Result of one pass, for logs, tests and the manual trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncRun {
    /// Domain or credentials missing; nothing was contacted.
    Skipped,
    ContentUnavailable { message: String },
    AuthorizationFailed { message: String },
    Submitted {
        uris: usize,
        usages: usize,
        outcome: SubmitOutcome,
    },
}

impl SyncRun {
    fn label(&self) -> &'static str {
        match self {
            SyncRun::Skipped => "skipped",
            SyncRun::ContentUnavailable { .. } => "content_unavailable",
            SyncRun::AuthorizationFailed { .. } => "authorization_failed",
            SyncRun::Submitted { .. } => "submitted",
        }
    }
}

/// Owns the load config → scan → authorize → report sequence.
pub struct UsageSync {
    settings: Arc<dyn SettingsStore>,
    content: Arc<dyn ContentStore>,
    authorizer: Authorizer,
    reporter: UsageReporter,
}

impl UsageSync {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        content: Arc<dyn ContentStore>,
        http: PortalHttp,
    ) -> Self {
        Self {
            settings,
            content,
            authorizer: Authorizer::new(http.clone()),
            reporter: UsageReporter::new(http),
        }
    }

    /// Scheduled entrypoint: fire and forget.
    pub async fn run(&self) {
        let _ = self.run_once().await;
    }

    pub async fn run_once(&self) -> SyncRun {
        crate::metrics::ensure_described();
        let run = self.execute().await;

        counter!("usage_sync_runs_total", "result" => run.label()).increment(1);
        gauge!("usage_sync_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        match &run {
            SyncRun::Skipped => {
                tracing::debug!(target: "usage", "usage sync skipped: portal not configured")
            }
            SyncRun::ContentUnavailable { message } => {
                tracing::warn!(target: "usage", error = %message, "usage sync aborted: content store failed")
            }
            SyncRun::AuthorizationFailed { message } => {
                tracing::warn!(target: "usage", error = %message, "usage sync aborted: authorization failed")
            }
            SyncRun::Submitted {
                uris,
                usages,
                outcome,
            } => tracing::info!(
                target: "usage",
                uris = uris,
                usages = usages,
                result = outcome.label(),
                "usage sync run"
            ),
        }
        run
    }

    async fn execute(&self) -> SyncRun {
        let cfg = self.settings.get().portal_config();
        if !cfg.is_complete() {
            return SyncRun::Skipped;
        }

        let items = match self.content.query(&ContentQuery::usage_scan()).await {
            Ok(items) => items,
            Err(e) => {
                return SyncRun::ContentUnavailable {
                    message: format!("{e:#}"),
                }
            }
        };

        let t0 = std::time::Instant::now();
        let payload = scanner::scan_items(&items).into_payload();
        histogram!("usage_sync_scan_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("usage_sync_uris").set(payload.uris.len() as f64);
        gauge!("usage_sync_usages").set(payload.usages.len() as f64);

        // Fresh per run: a token never outlives the run that fetched it.
        let mut session = TokenSession::new();
        let token = match session.token(&self.authorizer, &cfg).await {
            Ok(t) => t,
            Err(e) => {
                return SyncRun::AuthorizationFailed {
                    message: e.to_string(),
                }
            }
        };

        let outcome = self.reporter.submit(&cfg, &token, &payload).await;
        SyncRun::Submitted {
            uris: payload.uris.len(),
            usages: payload.usages.len(),
            outcome,
        }
    }
}
