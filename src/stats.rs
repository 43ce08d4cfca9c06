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
use crate::ladder::mastered_stage;
use crate::types::progress::LanguageProgress;
use crate::types::timestamp::Timestamp;

/// Aggregate study statistics for one language.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStats {
    /// Cards whose most recent review fell on the current day.
    pub reviewed_today: usize,
    /// Cards at or above the mastery stage.
    pub mastered: usize,
    /// Lifetime accuracy, as a whole percentage.
    pub accuracy: u32,
    /// Deck cards currently due, counting never-seen cards.
    pub due_count: usize,
    pub total_cards: usize,
    pub streak_days: u32,
}

pub fn language_stats(
    deck: &LanguageDeck,
    progress: &LanguageProgress,
    now: Timestamp,
) -> LanguageStats {
    let today = now.day_key();
    let reviewed_today = progress
        .progress_by_id
        .values()
        .filter(|p| {
            p.last_reviewed_at
                .is_some_and(|ts| ts.day_key() == today)
        })
        .count();
    let mastered = progress
        .progress_by_id
        .values()
        .filter(|p| p.stage >= mastered_stage())
        .count();
    let accuracy = if progress.total_reviews > 0 {
        ((progress.correct_reviews as f64 / progress.total_reviews as f64) * 100.0).round() as u32
    } else {
        0
    };
    let due_count = deck
        .cards
        .iter()
        .filter(|card| {
            progress
                .progress_by_id
                .get(&card.id)
                .map_or(true, |p| p.is_due(now))
        })
        .count();
    LanguageStats {
        reviewed_today,
        mastered,
        accuracy,
        due_count,
        total_cards: deck.cards.len(),
        streak_days: progress.streak_days,
    }
}

/// One calendar day's review count.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    /// `YYYY-MM-DD` day key.
    pub date: String,
    pub count: u32,
}

/// Review counts for the last seven calendar days, oldest first. A card
/// counts towards the day of its most recent review.
pub fn weekly_review_counts(progress: &LanguageProgress, now: Timestamp) -> Vec<DayCount> {
    let mut days: Vec<DayCount> = (0..7)
        .map(|i| DayCount {
            date: now.minus_days(6 - i).day_key(),
            count: 0,
        })
        .collect();
    for card_progress in progress.progress_by_id.values() {
        let Some(last) = card_progress.last_reviewed_at else {
            continue;
        };
        let key = last.day_key();
        if let Some(day) = days.iter_mut().find(|day| day.date == key) {
            day.count += 1;
        }
    }
    days
}
