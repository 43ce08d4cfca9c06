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
use axum::extract::Query;
use axum::extract::State;
use serde::Deserialize;

use crate::api::state::ServerState;
use crate::queue::StudyCard;
use crate::queue::build_queue;
use crate::repeat::DEFAULT_REPEAT_LIMIT;
use crate::repeat::WordToRepeat;
use crate::repeat::words_to_repeat;
use crate::stats::DayCount;
use crate::stats::LanguageStats;
use crate::stats::language_stats;
use crate::stats::weekly_review_counts;
use crate::types::settings::UserSettings;
use crate::types::timestamp::Timestamp;

#[derive(Deserialize)]
pub struct LanguageParams {
    /// Language deck id; defaults to the configured language.
    pub language: Option<String>,
    /// Maximum number of entries to return.
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct PinnedParams {
    pub language: Option<String>,
    pub card: String,
}

impl ServerState {
    /// The language a request targets: the query parameter if given,
    /// otherwise the configured language. An empty configured language
    /// (possible in a hand-edited record) resolves to the default deck.
    async fn resolve_language(&self, language: Option<String>) -> String {
        match language {
            Some(language) => language,
            None => {
                let settings = self.progress.settings().await;
                if settings.language_id.is_empty() {
                    self.catalog.default_deck_id().to_string()
                } else {
                    settings.language_id
                }
            }
        }
    }
}

pub async fn queue(
    State(state): State<ServerState>,
    Query(params): Query<LanguageParams>,
) -> Json<Vec<StudyCard>> {
    let now = Timestamp::now();
    let language = state.resolve_language(params.language).await;
    let limit = match params.limit {
        Some(limit) => limit,
        None => state.progress.settings().await.daily_goal,
    };
    let deck = state.catalog.deck_by_id(&language);
    let progress = state.progress.language_progress(&language).await;
    Json(build_queue(deck, &progress, now, limit))
}

pub async fn repeat(
    State(state): State<ServerState>,
    Query(params): Query<LanguageParams>,
) -> Json<Vec<WordToRepeat>> {
    let now = Timestamp::now();
    let language = state.resolve_language(params.language).await;
    let deck = state.catalog.deck_by_id(&language);
    let progress = state.progress.language_progress(&language).await;
    let pinned = state.pins.pinned_ids(&language).await;
    Json(words_to_repeat(
        deck,
        &progress,
        &pinned,
        now,
        params.limit.unwrap_or(DEFAULT_REPEAT_LIMIT),
    ))
}

pub async fn stats(
    State(state): State<ServerState>,
    Query(params): Query<LanguageParams>,
) -> Json<LanguageStats> {
    let now = Timestamp::now();
    let language = state.resolve_language(params.language).await;
    let deck = state.catalog.deck_by_id(&language);
    let progress = state.progress.language_progress(&language).await;
    Json(language_stats(deck, &progress, now))
}

pub async fn weekly(
    State(state): State<ServerState>,
    Query(params): Query<LanguageParams>,
) -> Json<Vec<DayCount>> {
    let now = Timestamp::now();
    let language = state.resolve_language(params.language).await;
    let progress = state.progress.language_progress(&language).await;
    Json(weekly_review_counts(&progress, now))
}

pub async fn pins(
    State(state): State<ServerState>,
    Query(params): Query<LanguageParams>,
) -> Json<Vec<String>> {
    let language = state.resolve_language(params.language).await;
    Json(state.pins.pinned_ids(&language).await)
}

pub async fn pinned(
    State(state): State<ServerState>,
    Query(params): Query<PinnedParams>,
) -> Json<serde_json::Value> {
    let language = state.resolve_language(params.language).await;
    let pinned = state.pins.is_pinned(&language, &params.card).await;
    Json(serde_json::json!({ "pinned": pinned }))
}

pub async fn settings(State(state): State<ServerState>) -> Json<UserSettings> {
    Json(state.progress.settings().await)
}
