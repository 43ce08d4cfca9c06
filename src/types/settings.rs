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

use serde::Deserialize;
use serde::Serialize;

/// Deck selected for fresh installs: the built-in starter deck.
const DEFAULT_LANGUAGE_ID: &str = "es";

/// Default number of cards per study session.
const DEFAULT_DAILY_GOAL: usize = 12;

/// Learner settings, persisted outside the progress record. Missing fields
/// in a stored record fall back to the defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    /// The language deck the learner is currently studying.
    pub language_id: String,
    /// How many cards a study session should contain.
    pub daily_goal: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language_id: DEFAULT_LANGUAGE_ID.to_string(),
            daily_goal: DEFAULT_DAILY_GOAL,
        }
    }
}

/// A partial settings update: only the present fields change.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub language_id: Option<String>,
    pub daily_goal: Option<usize>,
}
