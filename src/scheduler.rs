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

use crate::ladder::max_stage;
use crate::types::progress::CardProgress;
use crate::types::timestamp::Timestamp;

/// Correct answers in a row before a card can climb the ladder.
pub const STREAK_TO_ADVANCE: u32 = 3;

/// Answers at or above this latency do not advance the stage, even on a
/// qualifying streak. Slow recall is a difficulty proxy.
pub const FAST_RESPONSE_MS: u32 = 2500;

/// Apply one review outcome to a card's progress.
///
/// A correct answer extends the streak and, on a fast answer with a full
/// streak, climbs one stage. An incorrect answer clears the streak and
/// drops one stage. The stage never leaves `[0, max_stage()]`.
pub fn apply_review(
    prev: &CardProgress,
    correct: bool,
    response_ms: i64,
    now: Timestamp,
) -> CardProgress {
    // Negative latencies can arrive from callers with skewed clocks; treat
    // them as zero.
    let response_ms = response_ms.clamp(0, u32::MAX as i64) as u32;

    let mut stage = prev.stage;
    let mut streak = prev.streak_known;
    if correct {
        streak += 1;
        if streak >= STREAK_TO_ADVANCE && response_ms < FAST_RESPONSE_MS {
            stage = (stage + 1).min(max_stage());
        }
    } else {
        streak = 0;
        stage = stage.saturating_sub(1);
    }

    let seen_count = prev.seen_count + 1;
    let avg_response_ms = match prev.avg_response_ms {
        Some(avg) => {
            let total = avg as u64 * (seen_count as u64 - 1) + response_ms as u64;
            (total as f64 / seen_count as f64).round() as u32
        }
        None => response_ms,
    };

    CardProgress {
        stage,
        streak_known: streak,
        last_reviewed_at: Some(now),
        last_correct: Some(correct),
        last_response_ms: Some(response_ms),
        avg_response_ms: Some(avg_response_ms),
        last_incorrect_at: if correct {
            prev.last_incorrect_at
        } else {
            Some(now)
        },
        seen_count,
        correct_count: prev.correct_count + if correct { 1 } else { 0 },
        incorrect_count: prev.incorrect_count + if correct { 0 } else { 1 },
    }
}
