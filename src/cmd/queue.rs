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

use crate::context::Context;
use crate::error::Fallible;
use crate::queue::build_queue;
use crate::types::timestamp::Timestamp;

pub async fn print_queue(
    directory: Option<String>,
    language: Option<String>,
    limit: Option<usize>,
) -> Fallible<()> {
    let context = Context::open(directory)?;
    let now = Timestamp::now();
    let language = context.resolve_language(language).await;
    let limit = match limit {
        Some(limit) => limit,
        None => context.progress.settings().await.daily_goal,
    };
    let deck = context.catalog.deck_by_id(&language);
    let progress = context.progress.language_progress(&language).await;
    let queue = build_queue(deck, &progress, now, limit);
    println!("{}", serde_json::to_string_pretty(&queue)?);
    Ok(())
}
