//! XP and level calculator.
//!
//! Pure, stateless functions mapping (difficulty, streak, current XP,
//! category) to XP awards, levels, and stat bonuses:
//! - Stepped streak multiplier: 1.1 per completed 5-day interval, capped at 2.0
//! - Square-root level curve: level L starts at (L-1)^2 * 100 XP
//! - Category-driven stat bonuses: 1 point per 25 XP gained
//!
//! Everything here is deterministic given its inputs; there is no clock
//! and no randomness.

use serde::{Deserialize, Serialize};

use crate::stats::{Stat, StatBonuses, UserStats};
use crate::task::DifficultyTier;

/// Streak length of one multiplier step.
pub const STREAK_INTERVAL: u32 = 5;

/// Multiplier growth per completed streak interval.
pub const MULTIPLIER_STEP: f64 = 1.1;

/// Hard cap on the streak multiplier.
pub const MAX_STREAK_MULTIPLIER: f64 = 2.0;

/// XP gained per stat bonus point.
pub const XP_PER_STAT_POINT: u32 = 25;

/// Base XP for a difficulty tier (Easy=10, Medium=25, Hard=50).
pub fn base_xp(difficulty: DifficultyTier) -> u32 {
    difficulty.base_xp()
}

/// Streak multiplier as a step function of completed 5-day intervals.
///
/// Streaks below 5 earn no multiplier; streaks 5..=9 all earn 1.1,
/// 10..=14 earn 1.21, and so on, clamped at [`MAX_STREAK_MULTIPLIER`].
pub fn streak_multiplier(streak_count: u32) -> f64 {
    if streak_count < STREAK_INTERVAL {
        return 1.0;
    }
    let intervals = (streak_count / STREAK_INTERVAL) as i32;
    MULTIPLIER_STEP.powi(intervals).min(MAX_STREAK_MULTIPLIER)
}

/// Level for a running XP total: `floor(sqrt(xp/100)) + 1`.
///
/// Negative totals clamp to level 1.
pub fn level_for_xp(total_xp: i64) -> u32 {
    let xp = total_xp.max(0) as f64;
    (xp / 100.0).sqrt().floor() as u32 + 1
}

/// Absolute XP threshold where a level begins: `(level-1)^2 * 100`.
/// Zero for level 1 and below; saturates at the top of the curve.
pub fn xp_required_for_level(level: u32) -> i64 {
    if level <= 1 {
        return 0;
    }
    let steps = level as i64 - 1;
    steps.saturating_mul(steps).saturating_mul(100)
}

/// Additional XP needed to reach the next level from the given total.
pub fn xp_to_next_level(current_total_xp: i64) -> i64 {
    let level = level_for_xp(current_total_xp);
    xp_required_for_level(level + 1).saturating_sub(current_total_xp)
}

/// Stat bonuses for a completion: 1 point per 25 XP gained, credited to
/// the stat the category trains. Unknown categories and zero-point
/// results yield an empty map.
pub fn stat_bonuses(category: &str, xp_gained: u32) -> StatBonuses {
    let mut bonuses = StatBonuses::new();
    let Some(stat) = Stat::for_category(category) else {
        return bonuses;
    };
    let points = xp_gained / XP_PER_STAT_POINT;
    if points > 0 {
        bonuses.insert(stat, points);
    }
    bonuses
}

/// Outcome of pricing one task completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpAward {
    /// Base XP from the difficulty tier.
    pub base_xp: u32,
    /// Streak multiplier applied, in [1.0, 2.0].
    pub streak_multiplier: f64,
    /// `floor(base_xp * streak_multiplier)`.
    pub final_xp: u32,
    /// Running total after this award.
    pub total_xp_after: i64,
    /// Level implied by the total before the award.
    pub level_before: u32,
    /// Level implied by the total after the award.
    pub level_after: u32,
    /// Whether this award crossed a level threshold.
    pub leveled_up: bool,
    /// Stat bonuses earned by this award.
    pub stat_bonuses: StatBonuses,
}

/// Price a single task completion. The one entry point completion flow
/// should call; composes base XP, multiplier, level detection, and stat
/// bonuses. No I/O, fully deterministic.
pub fn calculate_task_xp(
    difficulty: DifficultyTier,
    streak_count: u32,
    current_total_xp: i64,
    category: &str,
) -> XpAward {
    let base = difficulty.base_xp();
    let multiplier = streak_multiplier(streak_count);
    let final_xp = (base as f64 * multiplier).floor() as u32;
    let total_after = current_total_xp + final_xp as i64;
    let level_before = level_for_xp(current_total_xp);
    let level_after = level_for_xp(total_after);

    XpAward {
        base_xp: base,
        streak_multiplier: multiplier,
        final_xp,
        total_xp_after: total_after,
        level_before,
        level_after,
        leveled_up: level_after > level_before,
        stat_bonuses: stat_bonuses(category, final_xp),
    }
}

/// Add stat bonuses onto the current stats. Absent keys add zero.
/// Pure, total, never fails.
pub fn apply_stat_bonuses(stats: &UserStats, bonuses: &StatBonuses) -> UserStats {
    stats.with_bonuses(bonuses)
}

/// Simulate `completions` consecutive on-time completions, feeding each
/// award's total into the next and extending the streak by one per day.
///
/// This is an idealized planning helper: it does not consult the streak
/// state machine and assumes every day is completed on cadence. Use
/// [`calculate_task_xp`] (via the aggregator) for authoritative awards.
pub fn simulate_xp_gain(
    difficulty: DifficultyTier,
    start_streak: u32,
    start_xp: i64,
    category: &str,
    completions: u32,
) -> Vec<XpAward> {
    let mut awards = Vec::with_capacity(completions as usize);
    let mut total_xp = start_xp;
    let mut streak = start_streak;

    for _ in 0..completions {
        streak += 1;
        let award = calculate_task_xp(difficulty, streak, total_xp, category);
        total_xp = award.total_xp_after;
        awards.push(award);
    }

    awards
}

/// Position of a running XP total within its level bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgression {
    pub current_level: u32,
    /// Absolute threshold where the current level begins.
    pub xp_required_for_current_level: i64,
    /// Absolute threshold where the next level begins.
    pub xp_required_for_next_level: i64,
    /// XP earned inside the current level bracket.
    pub xp_in_current_level: i64,
    /// Percent progress toward the next level, clamped to [0, 100].
    pub progress_to_next_level: f64,
}

/// Describe where a total sits on the level curve.
pub fn level_progression(total_xp: i64) -> LevelProgression {
    let current_level = level_for_xp(total_xp);
    let current_floor = xp_required_for_level(current_level);
    let next_floor = xp_required_for_level(current_level + 1);
    let xp_in_level = total_xp.saturating_sub(current_floor);
    let span = next_floor.saturating_sub(current_floor);

    let progress = if span <= 0 {
        100.0
    } else {
        (xp_in_level as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
    };

    LevelProgression {
        current_level,
        xp_required_for_current_level: current_floor,
        xp_required_for_next_level: next_floor,
        xp_in_current_level: xp_in_level,
        progress_to_next_level: progress,
    }
}

/// Where a streak sits relative to the 5-day multiplier boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierMilestones {
    pub current_streak: u32,
    pub current_multiplier: f64,
    /// Next 5-day boundary at or above the current streak; the current
    /// streak itself once the multiplier is capped.
    pub next_milestone: u32,
    pub streaks_to_next_milestone: u32,
    /// Multiplier at the next boundary, clamped to the cap.
    pub next_multiplier: f64,
    pub is_at_max_multiplier: bool,
}

/// Describe the streak's multiplier position and the next 5-day boundary.
pub fn streak_milestones(current_streak: u32) -> MultiplierMilestones {
    let current_multiplier = streak_multiplier(current_streak);
    let is_at_max = current_multiplier >= MAX_STREAK_MULTIPLIER;

    let next_milestone = if is_at_max {
        current_streak
    } else {
        current_streak.div_ceil(STREAK_INTERVAL) * STREAK_INTERVAL
    };

    MultiplierMilestones {
        current_streak,
        current_multiplier,
        next_milestone,
        streaks_to_next_milestone: next_milestone - current_streak,
        next_multiplier: streak_multiplier(next_milestone),
        is_at_max_multiplier: is_at_max,
    }
}
