// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::api::state::ServerState;
use crate::error::ErrorReport;
use crate::types::settings::SettingsUpdate;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub language_id: String,
    pub card_id: String,
    pub correct: bool,
    #[serde(default)]
    pub response_ms: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub language_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub language_id: String,
    pub card_id: String,
}

pub async fn review(
    State(state): State<ServerState>,
    Json(request): Json<ReviewRequest>,
) -> (StatusCode, Json<Value>) {
    let now = Timestamp::now();
    let result = state
        .progress
        .record_review(
            &request.language_id,
            &request.card_id,
            request.correct,
            request.response_ms,
            now,
        )
        .await;
    match result {
        Ok(progress) => (StatusCode::OK, Json(json!(progress))),
        Err(e) => internal_error(e),
    }
}

pub async fn reset(
    State(state): State<ServerState>,
    Json(request): Json<ResetRequest>,
) -> (StatusCode, Json<Value>) {
    match state.progress.reset_progress(&request.language_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => internal_error(e),
    }
}

pub async fn pin(
    State(state): State<ServerState>,
    Json(request): Json<PinRequest>,
) -> (StatusCode, Json<Value>) {
    let result = state
        .pins
        .toggle_pin(&request.language_id, &request.card_id)
        .await;
    match result {
        Ok(pinned) => (StatusCode::OK, Json(json!({ "pinned": pinned }))),
        Err(e) => internal_error(e),
    }
}

pub async fn update_settings(
    State(state): State<ServerState>,
    Json(update): Json<SettingsUpdate>,
) -> (StatusCode, Json<Value>) {
    match state.progress.update_settings(update).await {
        Ok(settings) => (StatusCode::OK, Json(json!(settings))),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: ErrorReport) -> (StatusCode, Json<Value>) {
    log::error!("{e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}
