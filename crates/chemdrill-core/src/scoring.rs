//! Answer scoring with time decay and streak bonuses.

use crate::model::ScoreEvent;

/// Points awarded for a correct answer before any decay or bonus.
pub const BASE_POINTS: i64 = 1000;
/// Points removed per whole elapsed second.
pub const TIME_PENALTY_PER_SECOND: i64 = 50;
/// The time-decayed value never drops below this for a correct answer.
pub const MIN_CORRECT_POINTS: i64 = 100;
/// Compounding per-streak bonus, applied as `1.1^(streak-1)` when the same
/// question has been answered correctly more than once in a row.
pub const STREAK_MULTIPLIER: f64 = 1.1;
/// Bonus multiplier when the session runs with shuffling on.
pub const SHUFFLE_MULTIPLIER: f64 = 1.5;

/// Convert a single answer event into a point value.
///
/// Pure and total: an incorrect answer scores 0, a correct answer never
/// scores below [`MIN_CORRECT_POINTS`], and the result is never negative.
pub fn score(event: &ScoreEvent) -> u32 {
    if !event.is_correct {
        return 0;
    }

    let whole_seconds = (event.elapsed_ms / 1000) as i64;
    let decayed = (BASE_POINTS - whole_seconds * TIME_PENALTY_PER_SECOND).max(MIN_CORRECT_POINTS);

    let mut points = decayed as f64;
    if event.streak > 1 {
        points = (points * STREAK_MULTIPLIER.powi(event.streak as i32 - 1)).floor();
    }
    if event.shuffle_active {
        points = (points * SHUFFLE_MULTIPLIER).round();
    }

    points as u32
}
