use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "habitforge-cli", version, about = "Habitforge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// XP pricing and projection
    Xp {
        #[command(subcommand)]
        action: commands::xp::XpAction,
    },
    /// Level curve queries
    Level {
        #[command(subcommand)]
        action: commands::level::LevelAction,
    },
    /// Streak evaluation and rewards
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Xp { action } => commands::xp::run(action),
        Commands::Level { action } => commands::level::run(action),
        Commands::Streak { action } => commands::streak::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
