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
use crate::store::Store;
use crate::types::progress::ManualRepeatState;

/// Store key for the manual repeat list.
const MANUAL_REPEAT_KEY: &str = "manual_repeat_v1";

/// The manual pin registry: cards the learner has forced onto the repeat
/// list. Lives under its own key, so progress resets leave it alone.
#[derive(Clone)]
pub struct PinRegistry {
    store: Store,
    write_lock: Arc<Mutex<()>>,
}

impl PinRegistry {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The pinned card ids for a language, in the order they were pinned.
    pub async fn pinned_ids(&self, language_id: &str) -> Vec<String> {
        let state: ManualRepeatState = self.store.read_or_default(MANUAL_REPEAT_KEY).await;
        state
            .by_language
            .get(language_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn is_pinned(&self, language_id: &str, card_id: &str) -> bool {
        self.pinned_ids(language_id)
            .await
            .iter()
            .any(|id| id == card_id)
    }

    /// Flip a card's pinned state, returning the new state.
    pub async fn toggle_pin(&self, language_id: &str, card_id: &str) -> Fallible<bool> {
        let _guard = self.write_lock.lock().await;
        let mut state: ManualRepeatState = self.store.read_or_default(MANUAL_REPEAT_KEY).await;
        let list = state
            .by_language
            .entry(language_id.to_string())
            .or_default();
        let pinned = match list.iter().position(|id| id == card_id) {
            Some(position) => {
                list.remove(position);
                false
            }
            None => {
                list.push(card_id.to_string());
                true
            }
        };
        log::debug!(
            "{language_id}/{card_id} {}",
            if pinned { "pinned" } else { "unpinned" }
        );
        self.store.write(MANUAL_REPEAT_KEY, &state).await?;
        Ok(pinned)
    }
}
