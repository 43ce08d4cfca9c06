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

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::net::TcpListener;

use crate::api::get::pinned;
use crate::api::get::pins;
use crate::api::get::queue;
use crate::api::get::repeat;
use crate::api::get::settings;
use crate::api::get::stats;
use crate::api::get::weekly;
use crate::api::post::pin;
use crate::api::post::reset;
use crate::api::post::review;
use crate::api::post::update_settings;
use crate::api::state::ServerState;
use crate::context::Context;
use crate::error::Fallible;

/// Start the JSON API server over the given data directory. Serves until
/// the process is stopped.
pub async fn start_server(directory: Option<String>, port: u16) -> Fallible<()> {
    let context = Context::open(directory)?;
    let state = ServerState {
        catalog: Arc::new(context.catalog),
        progress: context.progress,
        pins: context.pins,
    };

    let app = Router::new();
    let app = app.route("/queue", get(queue));
    let app = app.route("/repeat", get(repeat));
    let app = app.route("/stats", get(stats));
    let app = app.route("/weekly", get(weekly));
    let app = app.route("/pins", get(pins));
    let app = app.route("/pinned", get(pinned));
    let app = app.route("/settings", get(settings).post(update_settings));
    let app = app.route("/review", post(review));
    let app = app.route("/reset", post(reset));
    let app = app.route("/pin", post(pin));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);

    let bind = format!("0.0.0.0:{port}");
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
