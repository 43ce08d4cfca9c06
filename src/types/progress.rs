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

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::ladder::interval_days_for_stage;
use crate::types::timestamp::DAY_MS;
use crate::types::timestamp::Timestamp;

/// Per-card review history and memory state.
///
/// Optional fields that are absent in a stored record mean the event never
/// happened; that is the migration policy for this record shape.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardProgress {
    /// Index into the interval ladder.
    pub stage: u32,
    /// Consecutive correct answers since the last mistake.
    pub streak_known: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_response_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_response_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_incorrect_at: Option<Timestamp>,
    pub seen_count: u32,
    pub correct_count: u32,
    pub incorrect_count: u32,
}

impl CardProgress {
    /// The instant this card next comes due. A card that has never been
    /// reviewed is treated as due since the epoch.
    pub fn due_at(&self) -> Timestamp {
        let last = self.last_reviewed_at.map(|ts| ts.millis()).unwrap_or(0);
        let interval = interval_days_for_stage(self.stage) as i64;
        Timestamp::from_millis(last + interval * DAY_MS)
    }

    /// Whether the scheduled next-review time has passed.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.last_reviewed_at.is_none() || self.due_at() <= now
    }
}

/// All review state for one language deck.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageProgress {
    pub language_id: String,
    pub progress_by_id: BTreeMap<String, CardProgress>,
    /// Day key of the most recent study day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_study_date: Option<String>,
    /// Consecutive calendar days with at least one review.
    pub streak_days: u32,
    pub total_reviews: u32,
    pub correct_reviews: u32,
}

impl LanguageProgress {
    pub fn empty(language_id: &str) -> Self {
        Self {
            language_id: language_id.to_string(),
            ..Self::default()
        }
    }
}

/// The whole persisted progress record, across all languages.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    pub by_language: BTreeMap<String, LanguageProgress>,
}

/// The persisted manual-repeat record: pinned card ids per language.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManualRepeatState {
    pub by_language: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_reviewed_is_due() {
        let progress = CardProgress::default();
        assert!(progress.is_due(Timestamp::from_millis(0)));
    }

    #[test]
    fn test_due_at_adds_the_stage_interval() {
        let progress = CardProgress {
            stage: 1,
            last_reviewed_at: Some(Timestamp::from_millis(1_000)),
            ..CardProgress::default()
        };
        // Stage 1 is a three-day interval.
        assert_eq!(progress.due_at().millis(), 1_000 + 3 * DAY_MS);
        assert!(!progress.is_due(Timestamp::from_millis(1_000 + 3 * DAY_MS - 1)));
        assert!(progress.is_due(Timestamp::from_millis(1_000 + 3 * DAY_MS)));
    }

    #[test]
    fn test_record_fields_are_camel_case() {
        let progress = CardProgress {
            streak_known: 2,
            last_reviewed_at: Some(Timestamp::from_millis(5)),
            seen_count: 3,
            ..CardProgress::default()
        };
        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"streakKnown\":2"));
        assert!(json.contains("\"lastReviewedAt\":5"));
        assert!(json.contains("\"seenCount\":3"));
        assert!(!json.contains("lastIncorrectAt"));
    }

    #[test]
    fn test_missing_optional_fields_mean_never_happened() {
        // A record written before a field existed deserializes with the
        // field absent, not an error.
        let json = r#"{"stage":2,"streakKnown":1,"seenCount":4,"correctCount":3,"incorrectCount":1}"#;
        let progress: CardProgress = serde_json::from_str(json).unwrap();
        assert_eq!(progress.stage, 2);
        assert_eq!(progress.last_reviewed_at, None);
        assert_eq!(progress.last_incorrect_at, None);
    }
}
