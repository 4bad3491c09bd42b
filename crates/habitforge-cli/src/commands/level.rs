use clap::Subcommand;
use habitforge_core::level_progression;

#[derive(Subcommand)]
pub enum LevelAction {
    /// Where a running XP total sits on the level curve
    Info {
        /// Total XP
        #[arg(long, default_value = "0")]
        xp: i64,
    },
}

pub fn run(action: LevelAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LevelAction::Info { xp } => {
            let info = level_progression(xp);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}
