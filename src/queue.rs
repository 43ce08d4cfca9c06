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

use serde::Serialize;

use crate::catalog::LanguageDeck;
use crate::types::progress::CardProgress;
use crate::types::progress::LanguageProgress;
use crate::types::timestamp::Timestamp;

/// A deck card joined with its review state for a study session.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyCard {
    pub id: String,
    pub term: String,
    pub translation: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<CardProgress>,
    pub due: bool,
}

/// Select and order the next batch of cards for a study session.
///
/// Due cards that have been reviewed before come first, then cards never
/// seen, each partition in deck order. Review debt outranks new-word
/// introduction. No shuffling: the queue is deterministic for a fixed
/// progress snapshot.
pub fn build_queue(
    deck: &LanguageDeck,
    progress: &LanguageProgress,
    now: Timestamp,
    limit: usize,
) -> Vec<StudyCard> {
    let cards: Vec<StudyCard> = deck
        .cards
        .iter()
        .map(|card| {
            let progress = progress.progress_by_id.get(&card.id).cloned();
            let due = match &progress {
                Some(progress) => progress.is_due(now),
                None => true,
            };
            StudyCard {
                id: card.id.clone(),
                term: card.term.clone(),
                translation: card.translation.clone(),
                image_url: card.image_url(),
                progress,
                due,
            }
        })
        .collect();

    let mut queue: Vec<StudyCard> = cards
        .iter()
        .filter(|card| card.due && card.progress.is_some())
        .cloned()
        .collect();
    queue.extend(cards.iter().filter(|card| card.progress.is_none()).cloned());
    queue.truncate(limit);
    if queue.is_empty() {
        // Progress can exist for cards no longer in the deck; fall back to
        // anything due so the session is never spuriously empty.
        return cards.into_iter().filter(|card| card.due).take(limit).collect();
    }
    queue
}
