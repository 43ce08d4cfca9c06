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
use crate::ladder::interval_days_for_stage;
use crate::ladder::max_stage;
use crate::scheduler::STREAK_TO_ADVANCE;
use crate::types::progress::CardProgress;
use crate::types::progress::LanguageProgress;
use crate::types::timestamp::DAY_MS;
use crate::types::timestamp::Timestamp;

// Feature weights for the forgetting-risk model. These are product-tuned
// values, not fitted parameters; adjust them here.
const WEIGHT_OVERDUE: f64 = 1.6;
const WEIGHT_ERROR_RATE: f64 = 2.0;
const WEIGHT_NO_STREAK: f64 = 1.1;
const WEIGHT_EARLY_STAGE: f64 = 0.9;
const WEIGHT_SLOW_RECALL: f64 = 0.7;
const WEIGHT_RECENT_MISS: f64 = 0.6;
const WEIGHT_LOW_EXPOSURE: f64 = 0.4;

/// Shift applied to the feature sum before the logistic squash.
const SCORE_BIAS: f64 = 1.25;

/// Average answers slower than this count as slow recall, normalized over
/// a band of the same width.
const SLOW_RESPONSE_MS: f64 = 2500.0;

/// Days over which a recent mistake decays to ~1/e of its weight.
const MISS_DECAY_DAYS: f64 = 3.0;

/// Flat score bonus for cards that are currently due.
const DUE_BONUS: u32 = 10;

/// Flat score bonus for manually pinned cards.
const PIN_BONUS: u32 = 15;

/// Score assigned to pinned cards with no review history to score.
const PINNED_NEW_SCORE: u32 = 95;

/// Repeat-list length when the caller does not pass one.
pub const DEFAULT_REPEAT_LIMIT: usize = 50;

/// Accuracy below this fraction earns a reason on the repeat list.
const LOW_ACCURACY: f64 = 0.7;

/// A previously-seen card ranked by forgetting risk.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordToRepeat {
    pub id: String,
    pub term: String,
    pub translation: String,
    pub image_url: String,
    pub due: bool,
    /// Forgetting risk in `[0, 100]`.
    pub score: u32,
    /// Human-readable grounds for the card being on the list.
    pub reasons: Vec<String>,
    pub pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<CardProgress>,
}

/// Rank previously-seen cards by how likely they are to be forgotten.
///
/// Cards with no review history are skipped (the study queue handles
/// those), except for pinned ones, which surface with a fixed score.
/// Well-learned cards are filtered out so the list stays short; a pin
/// overrides that filter.
pub fn words_to_repeat(
    deck: &LanguageDeck,
    progress: &LanguageProgress,
    pinned_ids: &[String],
    now: Timestamp,
    limit: usize,
) -> Vec<WordToRepeat> {
    let mut remaining_pins: Vec<&str> = pinned_ids.iter().map(|id| id.as_str()).collect();
    let mut items: Vec<WordToRepeat> = Vec::new();

    for card in &deck.cards {
        let Some(card_progress) = progress.progress_by_id.get(&card.id) else {
            continue;
        };

        let interval_ms = interval_days_for_stage(card_progress.stage) as i64 * DAY_MS;
        let last_reviewed = card_progress
            .last_reviewed_at
            .map(|ts| ts.millis())
            .unwrap_or(0);
        let due_at = last_reviewed + interval_ms;
        let overdue_ms = now.millis() - due_at;
        let overdue_days = if overdue_ms > 0 {
            overdue_ms as f64 / DAY_MS as f64
        } else {
            0.0
        };
        let due = card_progress.last_reviewed_at.is_none() || due_at <= now.millis();

        let seen = card_progress.seen_count.max(1) as f64;
        let accuracy = card_progress.correct_count as f64 / seen;
        let error_rate = card_progress.incorrect_count as f64 / seen;
        let streak_norm =
            (card_progress.streak_known as f64 / STREAK_TO_ADVANCE as f64).clamp(0.0, 1.0);
        let stage_norm = (card_progress.stage as f64 / max_stage() as f64).clamp(0.0, 1.0);
        let avg_ms = card_progress
            .avg_response_ms
            .or(card_progress.last_response_ms)
            .unwrap_or(0) as f64;
        let slow_recall = if avg_ms > 0.0 {
            ((avg_ms - SLOW_RESPONSE_MS) / SLOW_RESPONSE_MS).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let low_exposure = (1.0 / seen.sqrt()).clamp(0.0, 1.0);
        let recent_miss = match card_progress.last_incorrect_at {
            Some(at) => (-now.days_since(at) / MISS_DECAY_DAYS).exp().clamp(0.0, 1.0),
            None => 0.0,
        };

        let feature = WEIGHT_OVERDUE * (overdue_days / 2.0).clamp(0.0, 2.0)
            + WEIGHT_ERROR_RATE * error_rate
            + WEIGHT_NO_STREAK * (1.0 - streak_norm)
            + WEIGHT_EARLY_STAGE * (1.0 - stage_norm)
            + WEIGHT_SLOW_RECALL * slow_recall
            + WEIGHT_RECENT_MISS * recent_miss
            + WEIGHT_LOW_EXPOSURE * low_exposure;

        let mut score = (sigmoid(feature - SCORE_BIAS) * 100.0).round() as u32;
        if due {
            score = (score + DUE_BONUS).min(100);
        }

        let mut reasons: Vec<String> = Vec::new();
        if due {
            if overdue_days >= 1.0 {
                reasons.push(format!("Overdue {}d", overdue_days.round() as i64));
            } else {
                reasons.push("Due now".to_string());
            }
        }
        if card_progress.last_correct == Some(false) {
            reasons.push("Last attempt was wrong".to_string());
        }
        if accuracy < LOW_ACCURACY {
            reasons.push(format!("Low accuracy ({}%)", (accuracy * 100.0).round() as i64));
        }
        if card_progress.incorrect_count >= 2 {
            reasons.push(format!("{} mistakes", card_progress.incorrect_count));
        }
        if slow_recall > 0.2 {
            reasons.push("Slow recall".to_string());
        }
        if card_progress.streak_known == 0 {
            reasons.push("No streak yet".to_string());
        }

        let pinned = remaining_pins.contains(&card.id.as_str());
        if pinned {
            reasons.insert(0, "Pinned".to_string());
        }

        // Skip cards that are under control: not due, never missed, and
        // past the early stages.
        let candidate = due
            || card_progress.last_correct == Some(false)
            || card_progress.incorrect_count > 0
            || (card_progress.stage <= 1 && card_progress.seen_count >= 2);
        if !candidate && !pinned {
            continue;
        }
        if pinned {
            score = (score + PIN_BONUS).min(100);
            remaining_pins.retain(|id| *id != card.id.as_str());
        }

        if reasons.is_empty() {
            reasons.push("Keep practicing".to_string());
        }
        items.push(WordToRepeat {
            id: card.id.clone(),
            term: card.term.clone(),
            translation: card.translation.clone(),
            image_url: card.image_url(),
            due,
            score,
            reasons,
            pinned,
            progress: Some(card_progress.clone()),
        });
    }

    // Pinned cards with no history yet still surface, at a fixed score.
    for id in remaining_pins {
        let Some(card) = deck.cards.iter().find(|card| card.id == id) else {
            continue;
        };
        items.push(WordToRepeat {
            id: card.id.clone(),
            term: card.term.clone(),
            translation: card.translation.clone(),
            image_url: card.image_url(),
            due: true,
            score: PINNED_NEW_SCORE,
            reasons: vec!["Pinned".to_string()],
            pinned: true,
            progress: None,
        });
    }

    // Stable sort: equal scores keep deck order.
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items.truncate(limit);
    items
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::Timestamp;

    fn deck() -> LanguageDeck {
        let toml = r#"
id = "es"
name = "Spanish"
from = "English"
to = "Spanish"
level = "Starter"

[[cards]]
id = "es-1"
term = "hola"
translation = "hello"
image = "hello"

[[cards]]
id = "es-2"
term = "agua"
translation = "water"
image = "water"

[[cards]]
id = "es-3"
term = "comida"
translation = "food"
image = "food"
"#;
        toml::from_str(toml).unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(1_705_320_000_000)
    }

    /// A card in good shape: high stage, long streak, no mistakes, fast,
    /// reviewed recently.
    fn well_learned(at: Timestamp) -> CardProgress {
        CardProgress {
            stage: 4,
            streak_known: 6,
            last_reviewed_at: Some(at),
            last_correct: Some(true),
            last_response_ms: Some(900),
            avg_response_ms: Some(1000),
            last_incorrect_at: None,
            seen_count: 8,
            correct_count: 8,
            incorrect_count: 0,
        }
    }

    /// A card in trouble: missed recently and often, slow.
    fn struggling(at: Timestamp) -> CardProgress {
        CardProgress {
            stage: 0,
            streak_known: 0,
            last_reviewed_at: Some(at),
            last_correct: Some(false),
            last_response_ms: Some(4000),
            avg_response_ms: Some(3800),
            last_incorrect_at: Some(at),
            seen_count: 6,
            correct_count: 2,
            incorrect_count: 4,
        }
    }

    fn lang_with(entries: &[(&str, CardProgress)]) -> LanguageProgress {
        let mut lang = LanguageProgress::empty("es");
        for (id, progress) in entries {
            lang.progress_by_id.insert(id.to_string(), progress.clone());
        }
        lang
    }

    #[test]
    fn test_never_reviewed_cards_are_not_listed() {
        let items = words_to_repeat(&deck(), &LanguageProgress::empty("es"), &[], now(), 50);
        assert!(items.is_empty());
    }

    #[test]
    fn test_well_learned_cards_are_filtered_out() {
        let lang = lang_with(&[("es-1", well_learned(now()))]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert!(items.is_empty());
    }

    #[test]
    fn test_struggling_cards_score_higher_than_stable_ones() {
        // es-2 becomes due by being reviewed two days past its stage-0
        // interval; es-1 is due at stage 4 but otherwise solid.
        let lang = lang_with(&[
            ("es-1", well_learned(now().minus_days(31))),
            ("es-2", struggling(now().minus_days(3))),
        ]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "es-2");
        assert!(items[0].score > items[1].score);
    }

    #[test]
    fn test_scores_stay_in_bounds() {
        let overdue = now().minus_days(400);
        let lang = lang_with(&[
            ("es-1", struggling(overdue)),
            ("es-2", well_learned(overdue)),
            ("es-3", struggling(now())),
        ]);
        let items = words_to_repeat(&deck(), &lang, &["es-2".to_string()], now(), 50);
        for item in items {
            assert!(item.score <= 100);
        }
    }

    #[test]
    fn test_due_cards_carry_a_due_reason() {
        let lang = lang_with(&[("es-1", struggling(now().minus_days(4)))]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 50);
        // Stage 0, reviewed four days ago: three days overdue.
        assert_eq!(items[0].reasons[0], "Overdue 3d");

        let lang = lang_with(&[("es-1", struggling(now().minus_days(1)))]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert_eq!(items[0].reasons[0], "Due now");
    }

    #[test]
    fn test_pin_overrides_the_qualification_filter() {
        let lang = lang_with(&[("es-1", well_learned(now()))]);
        let unpinned = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert!(unpinned.is_empty());

        let items = words_to_repeat(&deck(), &lang, &["es-1".to_string()], now(), 50);
        assert_eq!(items.len(), 1);
        assert!(items[0].pinned);
        assert_eq!(items[0].reasons[0], "Pinned");
    }

    #[test]
    fn test_pin_bonus_is_fifteen_points_capped() {
        // A solid but due card sits in the middle of the scale, so the
        // bonus is visible below the cap.
        let lang = lang_with(&[("es-1", well_learned(now().minus_days(31)))]);
        let unpinned = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert!(unpinned[0].score < 85);
        let pinned = words_to_repeat(&deck(), &lang, &["es-1".to_string()], now(), 50);
        assert_eq!(pinned[0].score, (unpinned[0].score + 15).min(100));

        // And an already-maximal card stays capped at 100.
        let lang = lang_with(&[("es-1", struggling(now().minus_days(30)))]);
        let pinned = words_to_repeat(&deck(), &lang, &["es-1".to_string()], now(), 50);
        assert_eq!(pinned[0].score, 100);
    }

    #[test]
    fn test_pinned_card_without_history_gets_a_synthetic_entry() {
        let items = words_to_repeat(
            &deck(),
            &LanguageProgress::empty("es"),
            &["es-3".to_string()],
            now(),
            50,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "es-3");
        assert_eq!(items[0].score, 95);
        assert_eq!(items[0].reasons, vec!["Pinned".to_string()]);
        assert!(items[0].progress.is_none());
    }

    #[test]
    fn test_pinned_id_not_in_the_deck_is_ignored() {
        let items = words_to_repeat(
            &deck(),
            &LanguageProgress::empty("es"),
            &["zz-9".to_string()],
            now(),
            50,
        );
        assert!(items.is_empty());
    }

    #[test]
    fn test_equal_scores_keep_deck_order() {
        let progress = struggling(now().minus_days(3));
        let lang = lang_with(&[("es-1", progress.clone()), ("es-2", progress)]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 50);
        assert_eq!(items[0].score, items[1].score);
        assert_eq!(items[0].id, "es-1");
        assert_eq!(items[1].id, "es-2");
    }

    #[test]
    fn test_limit_truncates_after_sorting() {
        let lang = lang_with(&[
            ("es-1", well_learned(now().minus_days(31))),
            ("es-2", struggling(now().minus_days(3))),
        ]);
        let items = words_to_repeat(&deck(), &lang, &[], now(), 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "es-2");
    }
}
