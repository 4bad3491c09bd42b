//! Streak state machine.
//!
//! There is no persisted streak state: [`check_streak_status`] recomputes
//! everything on demand from the task snapshot, the user timezone, and
//! the caller-supplied wall clock. Conceptually a task moves through
//! never-completed -> active -> grace period -> broken, driven purely by
//! elapsed time against the parsed recurrence pattern.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::recurrence::{self, GRACE_PERIOD_HOURS};
use crate::task::{TaskKind, TaskSnapshot};

/// Conceptual state of a streak, derivable from a [`StreakStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakState {
    /// The task has never been completed.
    NeverCompleted,
    /// Within cadence.
    Active,
    /// Past due but inside the 6-hour grace window.
    GracePeriod,
    /// Past the grace window.
    Broken,
}

/// Computed streak status for a task at a given instant. Ephemeral:
/// recomputed per evaluation, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakStatus {
    /// Whether the streak is currently within cadence.
    pub is_active: bool,
    /// Streak count as persisted on the snapshot (zero when never completed).
    pub current_streak: u32,
    /// Calendar days since the last completion in the user timezone.
    pub days_since_last_completion: u32,
    /// Whether a completion right now would productively advance the streak.
    pub is_eligible_for_update: bool,
    /// When the next completion is expected, if the task was ever completed.
    pub next_due_date: Option<DateTime<Utc>>,
    /// Whether the streak has lapsed past its grace window.
    pub streak_broken: bool,
    /// Hours left inside the grace window; zero outside it. Positive
    /// only while `streak_broken` is false.
    pub grace_period_remaining_hours: f64,
}

impl StreakStatus {
    /// Collapse the flags into the conceptual state.
    pub fn state(&self) -> StreakState {
        if self.next_due_date.is_none() {
            StreakState::NeverCompleted
        } else if self.grace_period_remaining_hours > 0.0 {
            StreakState::GracePeriod
        } else if self.streak_broken {
            StreakState::Broken
        } else {
            StreakState::Active
        }
    }

    /// The streak value a completion right now would produce: reset to 1
    /// when broken, extended by one otherwise.
    pub fn next_streak_count(&self) -> u32 {
        if self.streak_broken {
            1
        } else {
            self.current_streak + 1
        }
    }
}

/// Evaluate a task's streak against the current wall clock.
///
/// Daily and Habit tasks follow daily-cadence streak rules; Todos are
/// one-shot and never carry an active streak. Recurrence-rule
/// evaluation is total, so this function is too.
pub fn check_streak_status(task: &TaskSnapshot, tz: Tz, now: DateTime<Utc>) -> StreakStatus {
    let Some(last) = task.last_completed_at else {
        return StreakStatus {
            is_active: false,
            current_streak: 0,
            days_since_last_completion: 0,
            is_eligible_for_update: true,
            next_due_date: None,
            streak_broken: false,
            grace_period_remaining_hours: 0.0,
        };
    };

    let check = recurrence::evaluate(&task.recurrence_rule, Some(last), tz, now);
    let days_since = check.days_since_last_completion;

    let (is_active, streak_broken, is_eligible_for_update) = match task.kind {
        TaskKind::Daily | TaskKind::Habit => {
            let active = days_since <= 1 && !check.is_overdue;
            let broken = if check.grace_period_active {
                false
            } else {
                check.is_overdue || days_since > 1
            };
            // At most one productive completion per local calendar day,
            // unless the recurrence itself says the task is due again.
            let eligible = !recurrence::same_local_day(now, last, tz) || check.is_due;
            (active, broken, eligible)
        }
        TaskKind::Todo => (false, false, false),
    };

    let grace_period_remaining_hours = if check.grace_period_active {
        let grace_end = check.next_due_date + Duration::hours(GRACE_PERIOD_HOURS);
        (grace_end - now).num_seconds() as f64 / 3600.0
    } else {
        0.0
    };

    StreakStatus {
        is_active,
        current_streak: task.streak_count,
        days_since_last_completion: days_since,
        is_eligible_for_update,
        next_due_date: Some(check.next_due_date),
        streak_broken,
        grace_period_remaining_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::DifficultyTier;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn daily_task() -> TaskSnapshot {
        TaskSnapshot::new(TaskKind::Daily, DifficultyTier::Medium, "fitness", "DAILY")
    }

    #[test]
    fn test_never_completed() {
        let status = check_streak_status(&daily_task(), Tz::UTC, utc(2025, 6, 1, 12, 0));
        assert!(!status.is_active);
        assert_eq!(status.current_streak, 0);
        assert!(status.is_eligible_for_update);
        assert!(!status.streak_broken);
        assert_eq!(status.grace_period_remaining_hours, 0.0);
        assert_eq!(status.state(), StreakState::NeverCompleted);
        assert_eq!(status.next_streak_count(), 1);
    }

    #[test]
    fn test_active_within_cadence() {
        let task = daily_task()
            .with_streak(4)
            .with_last_completed(utc(2025, 6, 1, 9, 0));
        // Next morning, before the 06:00 grace end.
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 2, 5, 0));
        assert!(status.is_active);
        assert!(!status.streak_broken);
        assert!(status.is_eligible_for_update);
        assert_eq!(status.next_streak_count(), 5);
        assert_eq!(status.state(), StreakState::GracePeriod);
    }

    #[test]
    fn test_broken_after_three_days() {
        // Exactly 3 days since the last completion, well past the grace window.
        let task = daily_task()
            .with_streak(10)
            .with_last_completed(utc(2025, 6, 1, 9, 0));
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 4, 9, 0));
        assert!(!status.is_active);
        assert!(status.streak_broken);
        assert_eq!(status.grace_period_remaining_hours, 0.0);
        assert_eq!(status.days_since_last_completion, 3);
        assert_eq!(status.state(), StreakState::Broken);
        assert_eq!(status.next_streak_count(), 1);
    }

    #[test]
    fn test_grace_period_keeps_streak_alive() {
        let task = daily_task()
            .with_streak(7)
            .with_last_completed(utc(2025, 6, 1, 22, 0));
        // Due 2025-06-02 00:00; 03:00 is three hours into the grace window.
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 2, 3, 0));
        assert!(!status.streak_broken);
        assert!((status.grace_period_remaining_hours - 3.0).abs() < 1e-9);
        assert_eq!(status.state(), StreakState::GracePeriod);
    }

    #[test]
    fn test_same_day_completion_not_eligible() {
        let task = daily_task()
            .with_streak(3)
            .with_last_completed(utc(2025, 6, 2, 8, 0));
        // Later the same day, before the next due date.
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 2, 20, 0));
        assert!(!status.is_eligible_for_update);
        assert!(status.is_active);
    }

    #[test]
    fn test_eligible_on_new_local_day() {
        // A completion that landed inside the previous cycle's grace
        // window still opens eligibility again once the local calendar
        // day rolls over.
        let task = daily_task()
            .with_streak(3)
            .with_last_completed(utc(2025, 6, 2, 0, 30));
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 2, 23, 0));
        assert!(!status.is_eligible_for_update);

        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 3, 0, 30));
        assert!(status.is_eligible_for_update);
        assert_eq!(status.next_streak_count(), 4);
    }

    #[test]
    fn test_todo_semantics() {
        let mut task = TaskSnapshot::new(TaskKind::Todo, DifficultyTier::Easy, "work", "ONCE");
        task.last_completed_at = Some(utc(2025, 6, 1, 9, 0));
        task.streak_count = 2;
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 20, 9, 0));
        assert!(!status.is_active);
        assert!(!status.streak_broken);
        assert!(!status.is_eligible_for_update);
    }

    #[test]
    fn test_timezone_changes_day_boundary() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let task = daily_task()
            .with_streak(5)
            // June 1 21:00 local (June 2 01:00 UTC).
            .with_last_completed(utc(2025, 6, 2, 1, 0));
        // June 2 02:00 UTC is still June 1 22:00 local: same local day,
        // before the due instant, so active but not eligible.
        let status = check_streak_status(&task, tz, utc(2025, 6, 2, 2, 0));
        assert!(status.is_active);
        assert!(!status.is_eligible_for_update);

        // Under UTC the same instants straddle midnight and the due
        // instant has passed, so the completion is eligible.
        let status = check_streak_status(&task, Tz::UTC, utc(2025, 6, 2, 2, 0));
        assert!(status.is_eligible_for_update);
    }

    proptest! {
        #[test]
        fn prop_grace_exclusive_with_broken(
            last_offset_hours in 0i64..240,
            now_offset_hours in 0i64..240,
            streak in 0u32..100,
            kind_daily in proptest::bool::ANY,
        ) {
            let base = utc(2025, 6, 1, 0, 0);
            let kind = if kind_daily { TaskKind::Daily } else { TaskKind::Habit };
            let task = TaskSnapshot::new(kind, DifficultyTier::Medium, "fitness", "DAILY")
                .with_streak(streak)
                .with_last_completed(base + Duration::hours(last_offset_hours));
            let now = base + Duration::hours(now_offset_hours);
            let status = check_streak_status(&task, Tz::UTC, now);
            if status.grace_period_remaining_hours > 0.0 {
                prop_assert!(!status.streak_broken);
            }
            prop_assert!(status.grace_period_remaining_hours >= 0.0);
            prop_assert!(status.grace_period_remaining_hours <= GRACE_PERIOD_HOURS as f64);
        }
    }
}
