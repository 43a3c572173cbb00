// src/api.rs
//! Admin HTTP surface: settings, derivatives and a manual usage sync.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::error::PortalError;
use crate::portal::derivatives::{refresh_derivatives, DerivativeClient};
use crate::settings::sanitize::{sanitize_settings, SettingsUpdate};
use crate::settings::{PortalSettings, SelectionMode, SettingsStore};
use crate::usage::{SyncRun, UsageSync};

#[derive(Clone)]
pub struct AdminState {
    pub settings: Arc<dyn SettingsStore>,
    pub derivatives: DerivativeClient,
    pub sync: Arc<UsageSync>,
}

pub fn create_router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/admin/settings", get(get_settings).put(put_settings))
        .route("/admin/derivatives", get(get_derivatives))
        .route("/admin/derivatives/fetch", post(fetch_derivatives))
        .route("/admin/usage/sync", post(trigger_sync))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Settings as shown to the administrator. The secret never leaves the service.
#[derive(serde::Serialize)]
struct SettingsView {
    domain: String,
    client_id: String,
    client_secret_set: bool,
    default_search_term: String,
    selection_mode: SelectionMode,
    image_derivative: Option<String>,
    available_derivatives: Option<Vec<String>>,
}

impl From<PortalSettings> for SettingsView {
    fn from(s: PortalSettings) -> Self {
        Self {
            client_secret_set: !s.client_secret.is_empty(),
            domain: s.domain,
            client_id: s.client_id,
            default_search_term: s.default_search_term,
            selection_mode: s.selection_mode,
            image_derivative: s.image_derivative,
            available_derivatives: s.available_derivatives,
        }
    }
}

#[derive(serde::Serialize)]
struct SaveResp {
    settings: SettingsView,
    errors: Vec<String>,
}

#[derive(serde::Serialize)]
struct DerivativesResp {
    available: Option<Vec<String>>,
    can_fetch: bool,
    message: Option<String>,
}

#[derive(serde::Serialize)]
struct ErrorResp {
    message: String,
}

async fn get_settings(State(state): State<AdminState>) -> Json<SettingsView> {
    Json(state.settings.get().into())
}

async fn put_settings(
    State(state): State<AdminState>,
    Json(update): Json<SettingsUpdate>,
) -> Json<SaveResp> {
    let mut update = Some(update);
    let mut errors = Vec::new();
    let mut saved = PortalSettings::default();
    state.settings.update(&mut |current: &mut PortalSettings| {
        if let Some(u) = update.take() {
            let out = sanitize_settings(current, u);
            *current = out.settings;
            errors = out.errors;
        }
        saved = current.clone();
    });
    tracing::info!(target: "settings", errors = errors.len(), "settings saved");
    Json(SaveResp {
        settings: saved.into(),
        errors,
    })
}

async fn get_derivatives(State(state): State<AdminState>) -> Json<DerivativesResp> {
    let settings = state.settings.get();
    let (can_fetch, message) = match state.derivatives.can_fetch(&settings).await {
        Ok(true) => (true, None),
        Ok(false) => (
            false,
            Some(
                "You must configure portal domain and client credentials to fetch derivatives (client credentials required for Bynder portals only)."
                    .to_string(),
            ),
        ),
        Err(e) => (false, Some(e.operator_message())),
    };
    Json(DerivativesResp {
        available: settings.available_derivatives,
        can_fetch,
        message,
    })
}

async fn fetch_derivatives(
    State(state): State<AdminState>,
) -> Result<Json<DerivativesResp>, (StatusCode, Json<ErrorResp>)> {
    match refresh_derivatives(state.settings.as_ref(), &state.derivatives).await {
        Ok(available) => Ok(Json(DerivativesResp {
            available: Some(available),
            can_fetch: true,
            message: Some("The following custom derivatives were retrieved".to_string()),
        })),
        Err(e) => Err((
            status_for(&e),
            Json(ErrorResp {
                message: e.operator_message(),
            }),
        )),
    }
}

async fn trigger_sync(State(state): State<AdminState>) -> Json<SyncRun> {
    Json(state.sync.run_once().await)
}

fn status_for(e: &PortalError) -> StatusCode {
    match e {
        PortalError::ConfigIncomplete => StatusCode::BAD_REQUEST,
        PortalError::Authorization { .. } => StatusCode::UNAUTHORIZED,
        PortalError::AssetNotPublic { .. } | PortalError::MissingFile { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PortalError::DomainCheck { .. }
        | PortalError::Derivatives { .. }
        | PortalError::InvalidResponse(_)
        | PortalError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}
