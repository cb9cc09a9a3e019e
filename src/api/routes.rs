//! Device Read API (spec §4.7, §6): the two device-facing routes. Every
//! response — success, 404, or an internal failure converted into a
//! `data_available=false` envelope — emits a `Date` header, because some
//! devices rely on it for clock sync and a proxy must never be allowed
//! to strip it (spec §9).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::{error, warn};

use crate::api::envelope::{self, EnvelopeVersion};
use crate::error::RepositoryError;
use crate::models::{DeviceView, Location};
use crate::AppState;

pub async fn legacy_data(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<i64>,
) -> Response {
    device_data(state, device_id, EnvelopeVersion::Legacy).await
}

pub async fn v2_data(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<i64>,
) -> Response {
    device_data(state, device_id, EnvelopeVersion::V2).await
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn device_data(state: Arc<AppState>, device_id: i64, version: EnvelopeVersion) -> Response {
    let now = Utc::now();

    let (device, user, conditions) = match state.repository.read_device_view(device_id).await {
        Ok(triple) => triple,
        Err(RepositoryError::DeviceNotFound) => {
            return with_date_header(
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "device not found" })),
                now,
            );
        }
        Err(RepositoryError::Database(e)) => {
            // The device itself isn't in question here, only a row read
            // failed, so this stays a 200 with data_available=false (spec
            // §7) rather than 404.
            error!(device_id, error = %e, "database error reading device view");
            return with_date_header(StatusCode::OK, Json(envelope::build_unavailable(version)), now);
        }
    };

    let location = match state.registry.get(&device.location).cloned() {
        Some(location) => location,
        None => {
            // Device and user are real; only the location config is
            // missing from the compiled Registry. That's a data/config
            // inconsistency, not an unknown device, so still answer with
            // a best-effort envelope instead of 404 (spec §7).
            error!(device_id, location = %device.location, "device location missing from registry");
            Location::fallback()
        }
    };

    let view = DeviceView {
        device: device.clone(),
        user,
        location,
        conditions,
    };

    let body = envelope::build(&view, now, version);

    // Best-effort; failure to update last_poll_time must not fail the
    // response (spec §4.7 step 5).
    if let Err(e) = state
        .repository
        .batch_update_device_last_poll(&[device.device_id], now)
        .await
    {
        warn!(device_id, error = %e, "failed to update device last_poll_time");
    }

    with_date_header(StatusCode::OK, Json(body), now)
}

fn with_date_header<T: serde::Serialize>(status: StatusCode, body: Json<T>, now: chrono::DateTime<Utc>) -> Response {
    let mut response = (status, body).into_response();
    if let Ok(value) = HeaderValue::from_str(&now.to_rfc2822()) {
        response.headers_mut().insert(axum::http::header::DATE, value);
    }
    response
}

