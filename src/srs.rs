//! Fixed-table spaced repetition scheduling.
//!
//! Stages 1..=5 map onto the interval table below; an item graduates out of
//! the rotation the stage strictly after the last table entry. All functions
//! are pure and operate on epoch-millisecond timestamps.

/// Review cadence in days, indexed by stage - 1. Order is load-bearing.
pub const REVIEW_INTERVAL_DAYS: [i64; 5] = [1, 3, 7, 15, 30];

/// `next_review_time` sentinel: item has never been learned.
pub const NOT_LEARNED: i64 = 0;

/// `next_review_time` sentinel: item graduated past the last stage.
pub const FULLY_MASTERED: i64 = -1;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Outcome of a review-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub stage: i32,
    pub next_review_time: i64,
}

/// Days until the next review for a given stage. Stage 0 (and below) is not
/// in rotation and maps to 0; stages beyond the table clamp to the last entry.
pub fn interval_days(stage: i32) -> i64 {
    if stage <= 0 {
        return 0;
    }
    let index = ((stage - 1) as usize).min(REVIEW_INTERVAL_DAYS.len() - 1);
    REVIEW_INTERVAL_DAYS[index]
}

/// Absolute next-review timestamp, anchored to the first-learn date.
pub fn next_review_time(first_learn_date: i64, stage: i32) -> i64 {
    if stage <= 0 {
        return NOT_LEARNED;
    }
    first_learn_date + interval_days(stage) * MILLIS_PER_DAY
}

/// Whether an item is due. Sentinel values are never due.
pub fn needs_review(next_review: i64, now: i64) -> bool {
    if next_review == NOT_LEARNED || next_review == FULLY_MASTERED {
        return false;
    }
    now >= next_review
}

/// Advance one stage, capped at the table length.
pub fn advance_stage(stage: i32) -> i32 {
    (stage + 1).min(REVIEW_INTERVAL_DAYS.len() as i32)
}

/// A failed review always drops back to stage 1.
pub fn reset_stage() -> i32 {
    1
}

/// First-time learn: enter the rotation at stage 1, anchored to `now`.
pub fn initialize_review(now: i64) -> ReviewUpdate {
    ReviewUpdate {
        stage: 1,
        next_review_time: next_review_time(now, 1),
    }
}

/// Successful review. Advancing strictly past the last table entry graduates
/// the item out of the rotation.
pub fn on_remembered(first_learn_date: i64, stage: i32) -> ReviewUpdate {
    let raw_next = stage + 1;
    if raw_next > REVIEW_INTERVAL_DAYS.len() as i32 {
        return ReviewUpdate {
            stage: advance_stage(stage),
            next_review_time: FULLY_MASTERED,
        };
    }
    ReviewUpdate {
        stage: raw_next,
        next_review_time: next_review_time(first_learn_date, raw_next),
    }
}

/// Failed review. The stage resets but the cadence stays anchored to the
/// original first-learn date, not to the time of the failure.
pub fn on_forgotten(first_learn_date: i64) -> ReviewUpdate {
    let stage = reset_stage();
    ReviewUpdate {
        stage,
        next_review_time: next_review_time(first_learn_date, stage),
    }
}
