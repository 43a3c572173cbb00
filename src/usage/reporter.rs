// src/usage/reporter.rs
use metrics::counter;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use super::payload::UsageSyncPayload;
use crate::portal::auth::BearerToken;
use crate::portal::PortalHttp;
use crate::settings::PortalConfig;

pub const USAGE_SYNC_PATH: &str = "/api/media/usage/sync";

/// What happened to a submission. Callers treat every variant as "run done";
/// the distinction only feeds logs and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Sent { status: u16 },
    Rejected { status: u16 },
    TransportError { message: String },
}

impl SubmitOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Sent { .. } => "sent",
            SubmitOutcome::Rejected { .. } => "rejected",
            SubmitOutcome::TransportError { .. } => "transport_error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UsageReporter {
    http: PortalHttp,
}

impl UsageReporter {
    pub fn new(http: PortalHttp) -> Self {
        Self { http }
    }

    pub async fn submit(
        &self,
        cfg: &PortalConfig,
        token: &BearerToken,
        payload: &UsageSyncPayload,
    ) -> SubmitOutcome {
        let outcome = self.post(cfg, token, payload).await;
        counter!("usage_sync_submissions_total", "result" => outcome.label()).increment(1);
        match &outcome {
            SubmitOutcome::Sent { status } => {
                tracing::debug!(target: "usage", status, usages = payload.usages.len(), "usage submitted");
            }
            SubmitOutcome::Rejected { status } => {
                tracing::warn!(target: "usage", status, "usage sync rejected by portal");
            }
            SubmitOutcome::TransportError { message } => {
                tracing::warn!(target: "usage", error = %message, "usage sync request failed");
            }
        }
        outcome
    }

    async fn post(
        &self,
        cfg: &PortalConfig,
        token: &BearerToken,
        payload: &UsageSyncPayload,
    ) -> SubmitOutcome {
        let body = match serde_json::to_vec(payload) {
            Ok(b) => b,
            Err(e) => {
                return SubmitOutcome::TransportError {
                    message: format!("encoding payload: {e}"),
                }
            }
        };

        let url = self.http.url(&cfg.domain, USAGE_SYNC_PATH);
        let res = self
            .http
            .client()
            .post(&url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(body)
            .send()
            .await;

        match res {
            Ok(resp) if resp.status().is_success() => SubmitOutcome::Sent {
                status: resp.status().as_u16(),
            },
            Ok(resp) => SubmitOutcome::Rejected {
                status: resp.status().as_u16(),
            },
            Err(e) => SubmitOutcome::TransportError {
                message: e.to_string(),
            },
        }
    }
}
