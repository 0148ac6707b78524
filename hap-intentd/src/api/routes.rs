use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use shared::intent::{
    ExecutePayload, FulfillmentRequest, FulfillmentResponse, IntentInput, QueryPayload, SyncDevice,
    INTENT_DISCONNECT, INTENT_EXECUTE, INTENT_QUERY, INTENT_SYNC,
};
use shared::protocol::API_PREFIX;
use crate::orchestrator::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub agent_user_id: Arc<str>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub services: usize,
    pub fingerprint: String,
    pub built_at: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(&format!("{}/smarthome", API_PREFIX), post(fulfill))
        .route(&format!("{}/devices", API_PREFIX), get(get_devices))
        .route(&format!("{}/devices/hash", API_PREFIX), get(get_hash))
        .route(&format!("{}/devices/:id", API_PREFIX), get(get_device))
        .route(&format!("{}/refresh", API_PREFIX), post(post_refresh))
        .with_state(state)
}

async fn fulfill(
    State(state): State<AppState>,
    Json(request): Json<FulfillmentRequest>,
) -> Json<FulfillmentResponse> {
    let payload = match request.inputs.first() {
        Some(input) => handle_intent(&state, input).await,
        None => json!({ "errorCode": "protocolError" }),
    };

    Json(FulfillmentResponse {
        request_id: request.request_id,
        payload,
    })
}

/// Dispatch one intent input to the orchestrator and shape its payload
pub async fn handle_intent(state: &AppState, input: &IntentInput) -> Value {
    match input.intent.as_str() {
        INTENT_SYNC => {
            let devices = state.orchestrator.build_sync_response();
            json!({
                "agentUserId": state.agent_user_id.as_ref(),
                "devices": devices,
            })
        }
        INTENT_QUERY => match serde_json::from_value::<QueryPayload>(input.payload.clone()) {
            Ok(payload) => {
                let ids: Vec<String> = payload.devices.into_iter().map(|d| d.id).collect();
                json!({ "devices": state.orchestrator.query_devices(&ids).await })
            }
            Err(e) => {
                tracing::warn!("Malformed QUERY payload: {}", e);
                json!({ "errorCode": "protocolError" })
            }
        },
        INTENT_EXECUTE => match serde_json::from_value::<ExecutePayload>(input.payload.clone()) {
            Ok(payload) => {
                json!({ "commands": state.orchestrator.execute_commands(&payload.commands).await })
            }
            Err(e) => {
                tracing::warn!("Malformed EXECUTE payload: {}", e);
                json!({ "errorCode": "protocolError" })
            }
        },
        INTENT_DISCONNECT => json!({}),
        other => {
            tracing::warn!("Unsupported intent {}", other);
            json!({ "errorCode": "notSupported" })
        }
    }
}

async fn get_devices(State(state): State<AppState>) -> Json<Vec<SyncDevice>> {
    Json(state.orchestrator.build_sync_response())
}

async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SyncDevice>, StatusCode> {
    state
        .orchestrator
        .sync_device(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_hash(State(state): State<AppState>) -> String {
    state.orchestrator.registry().snapshot().fingerprint().to_string()
}

async fn post_refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let outcome = state.orchestrator.refresh().await;
    Json(RefreshResponse {
        services: outcome.services,
        fingerprint: outcome.fingerprint,
        built_at: state.orchestrator.registry().snapshot().built_at(),
    })
}
