use chrono::{DateTime, Utc};
use clap::Subcommand;
use habitforge_core::{
    check_streak_status, parse_timezone, streak_milestones, streak_reward, DifficultyTier,
    TaskKind, TaskSnapshot,
};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Evaluate a task's streak state as JSON
    Status {
        /// Task kind: daily, habit or todo
        #[arg(long, default_value = "daily")]
        kind: String,
        /// Recurrence rule text, e.g. "DAILY" or "EVERY 2 DAYS"
        #[arg(long, default_value = "DAILY")]
        rule: String,
        /// Current streak count
        #[arg(long, default_value = "0")]
        streak: u32,
        /// Last completion as RFC 3339; omit for a never-completed task
        #[arg(long)]
        last_completed: Option<String>,
        /// IANA timezone identifier; UTC when absent
        #[arg(long)]
        timezone: Option<String>,
        /// Evaluation instant as RFC 3339; wall clock when absent
        #[arg(long)]
        at: Option<String>,
    },
    /// Milestone reward for a streak count (null between milestones)
    Reward {
        /// Streak count to look up
        #[arg(long)]
        streak: u32,
    },
    /// Multiplier position and the next 5-day boundary
    Milestones {
        /// Current streak count
        #[arg(long, default_value = "0")]
        streak: u32,
    },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StreakAction::Status {
            kind,
            rule,
            streak,
            last_completed,
            timezone,
            at,
        } => {
            let kind: TaskKind = kind.parse()?;
            let mut task =
                TaskSnapshot::new(kind, DifficultyTier::Medium, "", &rule).with_streak(streak);
            if let Some(s) = last_completed {
                task = task.with_last_completed(parse_instant(&s)?);
            }
            let tz = parse_timezone(timezone.as_deref());
            let now = match at {
                Some(s) => parse_instant(&s)?,
                None => Utc::now(),
            };
            let status = check_streak_status(&task, tz, now);
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        StreakAction::Reward { streak } => {
            let reward = streak_reward(streak);
            println!("{}", serde_json::to_string_pretty(&reward)?);
        }
        StreakAction::Milestones { streak } => {
            let info = streak_milestones(streak);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}
