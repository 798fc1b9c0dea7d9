use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::member::NewAccessLog;
use crate::models::token::ActiveToken;
use crate::report::{self, AbsenceReport};
use crate::{qr, rotation, AppState};

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Serialize)]
pub struct CurrentTokenResponse {
    pub token: String,
    pub access_url: String,
    pub qr_url: String,
    pub expires_at: DateTime<Utc>,
    pub time_left: String,
}

#[derive(Serialize)]
pub struct GuestResponse {
    pub registered: bool,
}

#[derive(Deserialize)]
pub struct ReportParams {
    /// Name or email search, empty for everyone.
    #[serde(default)]
    pub q: String,
}

fn token_response(
    state: &AppState,
    token: ActiveToken,
    now: DateTime<Utc>,
) -> CurrentTokenResponse {
    let access_url = qr::access_url(&state.config.public_url, &token.value);
    let qr_url = qr::image_url(&access_url);
    CurrentTokenResponse {
        time_left: rotation::format_time_left(Some(token.expires_at), now),
        access_url,
        qr_url,
        expires_at: token.expires_at,
        token: token.value,
    }
}

// ── Handlers ─────────────────────────────────────────────────

/// GET /api/v1/access/current — the token on display, minting one first if
/// none is live
pub async fn current_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentTokenResponse>, AppError> {
    let now = Utc::now();
    let token = state.rotation.current(now).await?;
    Ok(Json(token_response(&state, token, now)))
}

/// POST /api/v1/access/rotate — force a rotation, invalidating the previous
/// code immediately
pub async fn rotate_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentTokenResponse>, AppError> {
    let now = Utc::now();
    let token = state.rotation.regenerate(now).await?;
    tracing::info!("access token regenerated on demand");
    Ok(Json(token_response(&state, token, now)))
}

/// POST /api/v1/access/guest — record a pre-authorized manual guest entry
pub async fn register_guest(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<GuestResponse>), AppError> {
    let entry = NewAccessLog::manual_guest(Utc::now());
    state.store.insert_access_log(&entry).await?;
    tracing::info!("manual guest access registered");
    Ok((StatusCode::CREATED, Json(GuestResponse { registered: true })))
}

/// GET /api/v1/reports/absences?q= — active members with no authorized
/// access for over a week
pub async fn absences_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<AbsenceReport>, AppError> {
    let now = Utc::now();
    let since = now - chrono::Duration::days(report::LOOKBACK_DAYS);
    let members = state.store.active_members().await?;
    let logs = state.store.authorized_accesses_since(since).await?;
    Ok(Json(report::build_report(&members, &logs, now, &params.q)))
}
