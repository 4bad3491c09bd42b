//! Task input model for the progression engine.
//!
//! The engine never mutates a [`TaskSnapshot`]; it reads one per
//! completion event and returns proposed new values that the caller
//! persists (or discards).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Kind of trackable task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Recurs on a calendar cadence and carries a streak.
    Daily,
    /// Free-form recurring habit, streak semantics match Daily.
    Habit,
    /// One-shot item. Todos never carry an active streak.
    Todo,
}

impl TaskKind {
    /// Whether this kind accrues a day-over-day streak.
    pub fn carries_streak(&self) -> bool {
        !matches!(self, TaskKind::Todo)
    }
}

impl std::str::FromStr for TaskKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(TaskKind::Daily),
            "habit" => Ok(TaskKind::Habit),
            "todo" => Ok(TaskKind::Todo),
            other => Err(EngineError::InputOutOfRange {
                field: "task_kind",
                message: format!("unknown task kind '{other}'"),
            }),
        }
    }
}

/// Difficulty tier of a task. Determines the base XP of a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Base XP awarded for completing a task of this tier, before the
    /// streak multiplier is applied.
    pub fn base_xp(&self) -> u32 {
        match self {
            DifficultyTier::Easy => 10,
            DifficultyTier::Medium => 25,
            DifficultyTier::Hard => 50,
        }
    }
}

impl std::str::FromStr for DifficultyTier {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => Err(EngineError::InputOutOfRange {
                field: "difficulty",
                message: format!("unknown difficulty tier '{other}'"),
            }),
        }
    }
}

/// Read-only snapshot of a task at completion time.
///
/// Owned by the surrounding task-management layer; the engine only
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task kind, drives streak semantics.
    pub kind: TaskKind,
    /// Difficulty tier, drives base XP.
    pub difficulty: DifficultyTier,
    /// Free-form category name (e.g. "fitness"), drives stat bonuses.
    pub category: String,
    /// Streak count as currently persisted.
    pub streak_count: u32,
    /// When the task was last completed, if ever.
    pub last_completed_at: Option<DateTime<Utc>>,
    /// Recurrence rule text (e.g. "DAILY", "EVERY 2 DAYS").
    pub recurrence_rule: String,
    /// Whether the task is active in the task layer.
    pub is_active: bool,
}

impl TaskSnapshot {
    /// Convenience constructor for a never-completed task.
    pub fn new(kind: TaskKind, difficulty: DifficultyTier, category: &str, rule: &str) -> Self {
        Self {
            kind,
            difficulty,
            category: category.to_string(),
            streak_count: 0,
            last_completed_at: None,
            recurrence_rule: rule.to_string(),
            is_active: true,
        }
    }

    /// Set the persisted streak count.
    pub fn with_streak(mut self, streak: u32) -> Self {
        self.streak_count = streak;
        self
    }

    /// Set the last completion instant.
    pub fn with_last_completed(mut self, at: DateTime<Utc>) -> Self {
        self.last_completed_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_xp_table() {
        assert_eq!(DifficultyTier::Easy.base_xp(), 10);
        assert_eq!(DifficultyTier::Medium.base_xp(), 25);
        assert_eq!(DifficultyTier::Hard.base_xp(), 50);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Daily".parse::<TaskKind>().unwrap(), TaskKind::Daily);
        assert_eq!(" HABIT ".parse::<TaskKind>().unwrap(), TaskKind::Habit);
        assert!("chore".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(
            "MEDIUM".parse::<DifficultyTier>().unwrap(),
            DifficultyTier::Medium
        );
        assert!("extreme".parse::<DifficultyTier>().is_err());
    }

    #[test]
    fn test_todo_carries_no_streak() {
        assert!(TaskKind::Daily.carries_streak());
        assert!(TaskKind::Habit.carries_streak());
        assert!(!TaskKind::Todo.carries_streak());
    }
}
