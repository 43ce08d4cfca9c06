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

use tokio::sync::Mutex;

use crate::error::Fallible;
use crate::scheduler::apply_review;
use crate::store::Store;
use crate::types::progress::CardProgress;
use crate::types::progress::LanguageProgress;
use crate::types::progress::ProgressState;
use crate::types::settings::SettingsUpdate;
use crate::types::settings::UserSettings;
use crate::types::timestamp::Timestamp;

/// Store key for the full per-language progress record. Bump the suffix
/// when the record shape changes incompatibly.
const PROGRESS_KEY: &str = "progress_v1";

/// Store key for the learner settings record.
const SETTINGS_KEY: &str = "settings_v1";

/// Read-modify-write transactions over the persisted progress record.
///
/// Every operation reads the whole record, mutates it, and writes it back.
/// The write lock is held across both halves, so overlapping calls
/// serialize instead of overwriting each other's updates. Nothing is
/// cached between calls.
#[derive(Clone)]
pub struct ProgressStore {
    store: Store,
    write_lock: Arc<Mutex<()>>,
}

impl ProgressStore {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The persisted progress for a language, or a fresh empty record.
    /// Reading never writes.
    pub async fn language_progress(&self, language_id: &str) -> LanguageProgress {
        let state: ProgressState = self.store.read_or_default(PROGRESS_KEY).await;
        state
            .by_language
            .get(language_id)
            .cloned()
            .unwrap_or_else(|| LanguageProgress::empty(language_id))
    }

    /// Record one review outcome and persist the updated record. Returns
    /// the card's new progress.
    pub async fn record_review(
        &self,
        language_id: &str,
        card_id: &str,
        correct: bool,
        response_ms: i64,
        now: Timestamp,
    ) -> Fallible<CardProgress> {
        let _guard = self.write_lock.lock().await;
        let mut state: ProgressState = self.store.read_or_default(PROGRESS_KEY).await;
        let lang = state
            .by_language
            .entry(language_id.to_string())
            .or_insert_with(|| LanguageProgress::empty(language_id));

        let prev = lang
            .progress_by_id
            .get(card_id)
            .cloned()
            .unwrap_or_default();
        let next = apply_review(&prev, correct, response_ms, now);
        log::debug!(
            "{language_id}/{card_id} {} stage={} streak={}",
            if correct { "correct" } else { "wrong" },
            next.stage,
            next.streak_known
        );
        lang.progress_by_id.insert(card_id.to_string(), next.clone());

        lang.total_reviews += 1;
        if correct {
            lang.correct_reviews += 1;
        }

        let today = now.day_key();
        let yesterday = now.minus_days(1).day_key();
        if lang.last_study_date.as_deref() == Some(today.as_str()) {
            // Already studied today; the day streak is unchanged.
        } else if lang.last_study_date.as_deref() == Some(yesterday.as_str()) {
            lang.streak_days += 1;
        } else {
            lang.streak_days = 1;
        }
        lang.last_study_date = Some(today);

        self.store.write(PROGRESS_KEY, &state).await?;
        Ok(next)
    }

    /// Wipe a language's progress. Other languages and the pin registry
    /// are separate records and survive this.
    pub async fn reset_progress(&self, language_id: &str) -> Fallible<()> {
        let _guard = self.write_lock.lock().await;
        let mut state: ProgressState = self.store.read_or_default(PROGRESS_KEY).await;
        state
            .by_language
            .insert(language_id.to_string(), LanguageProgress::empty(language_id));
        self.store.write(PROGRESS_KEY, &state).await
    }

    /// The learner settings, merged over defaults.
    pub async fn settings(&self) -> UserSettings {
        self.store.read_or_default(SETTINGS_KEY).await
    }

    /// Apply a partial settings update and return the merged result.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Fallible<UserSettings> {
        let _guard = self.write_lock.lock().await;
        let mut settings: UserSettings = self.store.read_or_default(SETTINGS_KEY).await;
        if let Some(language_id) = update.language_id {
            settings.language_id = language_id;
        }
        if let Some(daily_goal) = update.daily_goal {
            settings.daily_goal = daily_goal;
        }
        self.store.write(SETTINGS_KEY, &settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::fail;
    use crate::store::KeyValueStore;
    use crate::store::MemoryStore;

    fn progress_store() -> ProgressStore {
        ProgressStore::new(Store::new(MemoryStore::default()))
    }

    fn day(n: i64) -> Timestamp {
        // 2024-01-01T12:00:00Z plus n days.
        Timestamp::from_millis(1_704_110_400_000).plus_days(n)
    }

    #[tokio::test]
    async fn test_reading_never_creates_a_record() {
        let store = MemoryStore::default();
        let progress = ProgressStore::new(Store::new(store));
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.language_id, "es");
        assert!(lang.progress_by_id.is_empty());
        // A second read still sees an empty record.
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.total_reviews, 0);
    }

    #[tokio::test]
    async fn test_record_review_persists_card_progress() {
        let progress = progress_store();
        let card = progress
            .record_review("es", "es-1", true, 1200, day(0))
            .await
            .unwrap();
        assert_eq!(card.seen_count, 1);
        assert_eq!(card.streak_known, 1);

        let lang = progress.language_progress("es").await;
        assert_eq!(lang.total_reviews, 1);
        assert_eq!(lang.correct_reviews, 1);
        assert_eq!(lang.progress_by_id["es-1"], card);
    }

    #[tokio::test]
    async fn test_counters_stay_consistent_across_reviews() {
        let progress = progress_store();
        for correct in [true, false, true, true, false] {
            let card = progress
                .record_review("es", "es-1", correct, 900, day(0))
                .await
                .unwrap();
            assert_eq!(card.correct_count + card.incorrect_count, card.seen_count);
        }
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.total_reviews, 5);
        assert_eq!(lang.correct_reviews, 3);
    }

    #[tokio::test]
    async fn test_day_streak_increments_on_consecutive_days() {
        let progress = progress_store();
        progress
            .record_review("es", "es-1", true, 900, day(0))
            .await
            .unwrap();
        progress
            .record_review("es", "es-1", true, 900, day(1))
            .await
            .unwrap();
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.streak_days, 2);
    }

    #[tokio::test]
    async fn test_day_streak_resets_after_a_skipped_day() {
        let progress = progress_store();
        progress
            .record_review("es", "es-1", true, 900, day(0))
            .await
            .unwrap();
        progress
            .record_review("es", "es-1", true, 900, day(2))
            .await
            .unwrap();
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.streak_days, 1);
    }

    #[tokio::test]
    async fn test_same_day_reviews_leave_the_day_streak_alone() {
        let progress = progress_store();
        progress
            .record_review("es", "es-1", true, 900, day(0))
            .await
            .unwrap();
        progress
            .record_review("es", "es-2", true, 900, day(0))
            .await
            .unwrap();
        let lang = progress.language_progress("es").await;
        assert_eq!(lang.streak_days, 1);
        assert_eq!(lang.last_study_date, Some(day(0).day_key()));
    }

    #[tokio::test]
    async fn test_reset_only_touches_the_named_language() {
        let progress = progress_store();
        progress
            .record_review("es", "es-1", true, 900, day(0))
            .await
            .unwrap();
        progress
            .record_review("fr", "fr-1", true, 900, day(0))
            .await
            .unwrap();
        progress.reset_progress("es").await.unwrap();

        let es = progress.language_progress("es").await;
        assert!(es.progress_by_id.is_empty());
        assert_eq!(es.total_reviews, 0);
        let fr = progress.language_progress("fr").await;
        assert_eq!(fr.total_reviews, 1);
    }

    #[tokio::test]
    async fn test_settings_update_merges_over_stored_values() {
        let progress = progress_store();
        let settings = progress.settings().await;
        assert_eq!(settings.language_id, "es");

        let settings = progress
            .update_settings(SettingsUpdate {
                language_id: Some("fr".to_string()),
                daily_goal: None,
            })
            .await
            .unwrap();
        assert_eq!(settings.language_id, "fr");
        assert_eq!(settings.daily_goal, 12);

        let settings = progress.settings().await;
        assert_eq!(settings.language_id, "fr");
    }

    #[tokio::test]
    async fn test_corrupt_progress_record_reads_as_empty() {
        let inner = MemoryStore::default();
        inner
            .set(PROGRESS_KEY, "certainly not json".to_string())
            .await
            .unwrap();
        let progress = ProgressStore::new(Store::new(inner));
        let lang = progress.language_progress("es").await;
        assert!(lang.progress_by_id.is_empty());
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Fallible<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: String) -> Fallible<()> {
            fail("disk full")
        }

        async fn remove(&self, _key: &str) -> Fallible<()> {
            fail("disk full")
        }
    }

    #[tokio::test]
    async fn test_write_failures_surface_to_the_caller() {
        let progress = ProgressStore::new(Store::new(ReadOnlyStore));
        let result = progress
            .record_review("es", "es-1", true, 900, day(0))
            .await;
        assert!(result.is_err());
    }
}
