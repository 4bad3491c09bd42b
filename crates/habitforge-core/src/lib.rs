//! # Habitforge Core Library
//!
//! This library provides the progression and streak engine for the
//! Habitforge habit tracker: the pure computational logic that turns
//! task completions into experience, levels, stat growth, and streak
//! state. Surrounding layers (HTTP API, storage, UI) are thin adapters
//! over this crate.
//!
//! ## Architecture
//!
//! - **XP Calculator**: stateless pricing of completions from
//!   difficulty base XP, a stepped streak multiplier, a square-root
//!   level curve, and category-driven stat bonuses
//! - **Streak State Machine**: recomputes a task's streak state on
//!   demand from its snapshot, recurrence rule, user timezone, and a
//!   caller-supplied `now`; nothing is persisted here
//! - **Recurrence**: a total, fallback-to-daily parser for short rule
//!   strings, with DST-correct due dates via chrono-tz
//! - **Progression Aggregator**: merges awards into running totals,
//!   detecting level-ups, stat-point grants, and milestone rewards
//!
//! The engine performs no I/O and holds no shared state; every function
//! transforms its inputs into proposed outputs the caller persists.

pub mod error;
pub mod progression;
pub mod recurrence;
pub mod rewards;
pub mod stats;
pub mod streak;
pub mod task;
pub mod xp;

pub use error::{EngineError, Result};
pub use progression::{
    allocate_stat_points, available_stat_points, process_completion, CompletionOutcome, LevelUp,
    ProgressStore, ProgressionService, StatAllocation, UserProfile,
};
pub use recurrence::{
    parse_timezone, RecurrenceCheck, RecurrenceKind, RecurrencePattern, GRACE_PERIOD_HOURS,
};
pub use rewards::{streak_reward, RewardTier, StreakReward};
pub use stats::{Stat, StatBonuses, UserStats};
pub use streak::{check_streak_status, StreakState, StreakStatus};
pub use task::{DifficultyTier, TaskKind, TaskSnapshot};
pub use xp::{
    calculate_task_xp, level_progression, simulate_xp_gain, streak_milestones, LevelProgression,
    MultiplierMilestones, XpAward,
};
