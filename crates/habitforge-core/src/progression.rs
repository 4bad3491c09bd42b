//! Progression aggregator.
//!
//! Orchestrates one completion end to end: the streak machine decides
//! eligibility and the resulting streak value, the XP calculator prices
//! it, and this module merges the award into the character's running
//! totals: level-up detection, stat-point grants, feature unlocks, and
//! milestone rewards. Everything is a pure transform over
//! caller-supplied snapshots; the caller persists the proposed values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::recurrence::parse_timezone;
use crate::rewards::{self, StreakReward};
use crate::stats::{Stat, UserStats};
use crate::streak::{check_streak_status, StreakStatus};
use crate::task::TaskSnapshot;
use crate::xp::{self, XpAward};

/// Stat points every character starts with (5 stats at 5 each).
pub const BASE_STAT_POOL: u32 = 25;

/// Stat points granted per level gained.
pub const STAT_POINTS_PER_LEVEL: u32 = 2;

/// Hard ceiling on any single stat.
pub const STAT_CEILING: u32 = 100;

/// Features unlocked at specific levels.
const LEVEL_UNLOCKS: &[(u32, &str)] = &[
    (5, "Advanced Task Categories"),
    (10, "Custom Recurrence Rules"),
    (15, "Prestige Equipment Slots"),
    (20, "Guild Challenges"),
    (30, "Legendary Quests"),
];

/// Requested point spend per stat. Values are signed so adapters can
/// pass untrusted input; out-of-range counts are rejected, never
/// truncated.
pub type StatAllocation = BTreeMap<Stat, i64>;

/// Consequences of crossing one or more level thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUp {
    pub levels_gained: u32,
    /// `2 x levels_gained`.
    pub stat_points_granted: u32,
    /// Feature identifiers unlocked by the levels crossed.
    pub unlocked_features: Vec<String>,
}

/// Features unlocked when moving from `level_before` (exclusive) to
/// `level_after` (inclusive).
pub fn unlocks_between(level_before: u32, level_after: u32) -> Vec<String> {
    LEVEL_UNLOCKS
        .iter()
        .filter(|(level, _)| *level > level_before && *level <= level_after)
        .map(|(_, feature)| feature.to_string())
        .collect()
}

/// Stat points earned by a character of the given level, minus points
/// already allocated.
pub fn available_stat_points(level: u32, stats: &UserStats) -> u32 {
    let earned = BASE_STAT_POOL + STAT_POINTS_PER_LEVEL * level.saturating_sub(1);
    earned.saturating_sub(stats.total())
}

/// Spend earned stat points. Validates the whole request before
/// producing anything, so a rejection leaves the caller's stats
/// untouched and no partial allocation can leak out.
pub fn allocate_stat_points(
    stats: &UserStats,
    allocation: &StatAllocation,
    total_xp: i64,
) -> Result<UserStats> {
    let mut requested: u32 = 0;
    let mut validated: Vec<(Stat, u32)> = Vec::with_capacity(allocation.len());
    for (stat, points) in allocation {
        let points = u32::try_from(*points).map_err(|_| EngineError::InputOutOfRange {
            field: "allocation",
            message: format!("point count {points} for {} is out of range", stat.name()),
        })?;
        requested = requested.saturating_add(points);
        validated.push((*stat, points));
    }

    let level = xp::level_for_xp(total_xp);
    let available = available_stat_points(level, stats);
    if requested > available {
        return Err(EngineError::InsufficientStatPoints {
            requested,
            available,
        });
    }

    let mut next = *stats;
    for (stat, points) in validated {
        let would_reach = next.get(stat).saturating_add(points);
        if would_reach > STAT_CEILING {
            return Err(EngineError::StatCeilingExceeded {
                stat: stat.name(),
                would_reach,
                ceiling: STAT_CEILING,
            });
        }
        next.set(stat, would_reach);
    }

    Ok(next)
}

/// Everything one completion event produces. The caller persists the
/// pieces it cares about; nothing here has been written anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    /// Whether the completion was productive at all.
    pub eligible: bool,
    /// Streak evaluation at the completion instant.
    pub streak: StreakStatus,
    /// Proposed streak count after the completion.
    pub new_streak_count: u32,
    /// XP pricing, absent for ineligible completions.
    pub award: Option<XpAward>,
    /// Milestone reward, present only when the new streak hits one exactly.
    pub reward: Option<StreakReward>,
    /// Level-up consequences, if a threshold was crossed.
    pub level_up: Option<LevelUp>,
    /// Stats with the award's bonuses applied.
    pub proposed_stats: UserStats,
    /// Running XP total including award and milestone bonus.
    pub total_xp_after: i64,
}

/// Process one task completion: eligibility, streak value, XP award,
/// milestone reward, and level-up detection, as a single pure transform.
pub fn process_completion(
    task: &TaskSnapshot,
    tz: Tz,
    now: DateTime<Utc>,
    total_xp: i64,
    stats: &UserStats,
) -> CompletionOutcome {
    let streak = check_streak_status(task, tz, now);

    if !streak.is_eligible_for_update {
        return CompletionOutcome {
            eligible: false,
            streak,
            new_streak_count: task.streak_count,
            award: None,
            reward: None,
            level_up: None,
            proposed_stats: *stats,
            total_xp_after: total_xp,
        };
    }

    let new_streak_count = streak.next_streak_count();
    let award = xp::calculate_task_xp(task.difficulty, new_streak_count, total_xp, &task.category);
    let reward = rewards::streak_reward(new_streak_count);

    // Milestone bonus XP counts toward the running total, so crossing a
    // milestone can itself trigger a level-up.
    let total_xp_after = award.total_xp_after
        + reward.as_ref().map_or(0, |r| r.bonus_xp as i64);

    let level_before = award.level_before;
    let level_after = xp::level_for_xp(total_xp_after);
    let level_up = (level_after > level_before).then(|| {
        let levels_gained = level_after - level_before;
        LevelUp {
            levels_gained,
            stat_points_granted: STAT_POINTS_PER_LEVEL * levels_gained,
            unlocked_features: unlocks_between(level_before, level_after),
        }
    });

    let proposed_stats = xp::apply_stat_bonuses(stats, &award.stat_bonuses);

    CompletionOutcome {
        eligible: true,
        streak,
        new_streak_count,
        award: Some(award),
        reward,
        level_up,
        proposed_stats,
        total_xp_after,
    }
}

/// Persistent per-user state the caller owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub total_xp: i64,
    pub stats: UserStats,
    /// IANA timezone identifier; UTC when absent.
    pub timezone: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            total_xp: 0,
            stats: UserStats::default(),
            timezone: None,
        }
    }
}

/// Read access to task and user snapshots, implemented by the
/// surrounding persistence layer.
pub trait ProgressStore {
    fn task(&self, task_id: &str) -> Option<TaskSnapshot>;
    fn user(&self, user_id: &str) -> Option<UserProfile>;
}

/// Thin by-id wrapper over the pure engine. The only place the
/// not-found errors can originate.
pub struct ProgressionService<S> {
    store: S,
}

impl<S: ProgressStore> ProgressionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fetch snapshots and run [`process_completion`].
    pub fn complete_task(
        &self,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome> {
        let task = self
            .store
            .task(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        let user = self
            .store
            .user(user_id)
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;
        let tz = parse_timezone(user.timezone.as_deref());
        Ok(process_completion(&task, tz, now, user.total_xp, &user.stats))
    }

    /// Fetch snapshots and evaluate the streak without completing.
    pub fn streak_status(
        &self,
        task_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StreakStatus> {
        let task = self
            .store
            .task(task_id)
            .ok_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        let user = self
            .store
            .user(user_id)
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))?;
        let tz = parse_timezone(user.timezone.as_deref());
        Ok(check_streak_status(&task, tz, now))
    }
}
