use clap::Subcommand;
use habitforge_core::{calculate_task_xp, simulate_xp_gain, DifficultyTier};

#[derive(Subcommand)]
pub enum XpAction {
    /// Price a single completion
    Award {
        /// Difficulty tier: easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// Streak count the completion would produce
        #[arg(long, default_value = "0")]
        streak: u32,
        /// Current total XP
        #[arg(long, default_value = "0")]
        xp: i64,
        /// Task category for stat bonuses
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Project XP over consecutive on-time completions
    Simulate {
        /// Number of completions to simulate
        #[arg(long)]
        days: u32,
        /// Difficulty tier: easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// Starting streak count
        #[arg(long, default_value = "0")]
        streak: u32,
        /// Starting total XP
        #[arg(long, default_value = "0")]
        xp: i64,
        /// Task category for stat bonuses
        #[arg(long, default_value = "")]
        category: String,
    },
}

pub fn run(action: XpAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        XpAction::Award {
            difficulty,
            streak,
            xp,
            category,
        } => {
            let tier: DifficultyTier = difficulty.parse()?;
            let award = calculate_task_xp(tier, streak, xp, &category);
            println!("{}", serde_json::to_string_pretty(&award)?);
        }
        XpAction::Simulate {
            days,
            difficulty,
            streak,
            xp,
            category,
        } => {
            let tier: DifficultyTier = difficulty.parse()?;
            let awards = simulate_xp_gain(tier, streak, xp, &category, days);
            println!("{}", serde_json::to_string_pretty(&awards)?);
        }
    }
    Ok(())
}
