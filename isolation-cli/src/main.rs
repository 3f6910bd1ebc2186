//! Isolation CLI - Command-line interface
//!
//! Commands:
//! - play: self-play a full game from the initial position
//! - best-move: pick a move for a flat-serialized position

use clap::{Parser, Subcommand};

mod best_move_cmd;
mod play_cmd;

#[derive(Parser)]
#[command(name = "isolation")]
#[command(about = "Isolation move-search engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full game from the initial position
    Play(play_cmd::PlayArgs),
    /// Pick the best move for a flat-serialized position
    BestMove(best_move_cmd::BestMoveArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::BestMove(args) => best_move_cmd::run(args),
    }
}
