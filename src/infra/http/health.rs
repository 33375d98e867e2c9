//! Liveness endpoint reporting key-value store connectivity.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub key_value_store: KeyValueStoreStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueStoreStatus {
    pub connected: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.kv.ping().await.is_ok();
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(HealthResponse {
        status: "OK",
        timestamp,
        key_value_store: KeyValueStoreStatus { connected },
    })
}
