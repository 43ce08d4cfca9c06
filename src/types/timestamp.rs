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

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Milliseconds in a calendar day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A UTC timestamp with millisecond precision. Serialized as epoch
/// milliseconds, which is how review timestamps are persisted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Timestamp(#[serde(with = "chrono::serde::ts_milliseconds")] DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Out-of-range millisecond values saturate at the representable
    /// minimum rather than failing.
    pub fn from_millis(millis: i64) -> Self {
        match DateTime::from_timestamp_millis(millis) {
            Some(ts) => Self(ts),
            None => Self(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// The UTC calendar day this timestamp falls on, as a `YYYY-MM-DD` key.
    pub fn day_key(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn minus_days(self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    /// Fractional days elapsed since an earlier timestamp.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        (self.millis() - earlier.millis()) as f64 / DAY_MS as f64
    }

    #[cfg(test)]
    pub fn plus_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
}
