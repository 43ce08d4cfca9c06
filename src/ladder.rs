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

/// The review interval ladder, in days. A card's stage is an index into
/// this sequence.
const INTERVAL_DAYS: [u32; 6] = [1, 3, 7, 14, 30, 90];

/// The number of days until the next review for a card at the given stage.
/// Out-of-range stages saturate at the top of the ladder.
pub fn interval_days_for_stage(stage: u32) -> u32 {
    let index = (stage as usize).min(INTERVAL_DAYS.len() - 1);
    INTERVAL_DAYS[index]
}

/// The highest stage a card can reach.
pub const fn max_stage() -> u32 {
    (INTERVAL_DAYS.len() - 1) as u32
}

/// The stage at which a card counts as mastered: the second-to-last rung.
pub const fn mastered_stage() -> u32 {
    max_stage() - 1
}
