//! Best-move command - pick a move for a serialized position

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use isolation_core::{Board, Player, SearchConfig, SearchEngine, SearchOutcome};

#[derive(Args)]
pub struct BestMoveArgs {
    /// 64-character flat board over the alphabet '-', '*', 'x', 'o'
    #[arg(long)]
    pub board: String,

    /// Perspective player: x or o
    #[arg(long, default_value = "x")]
    pub player: String,

    /// Configuration preset token ("1" selects the profile without quiescence)
    #[arg(long, default_value = "")]
    pub preset: String,

    /// Per-move time budget in milliseconds
    #[arg(long, default_value = "1000")]
    pub timeout_ms: u64,

    /// Iterative-deepening depth limit
    #[arg(long, default_value = "7")]
    pub depth: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MoveReport {
    row: u8,
    col: u8,
    score: f64,
    depth: u32,
}

pub fn run(args: BestMoveArgs) -> Result<()> {
    let player = parse_player(&args.player)?;
    let board =
        Board::from_flat_string(&args.board, player).context("failed to parse --board")?;

    if board.player_to_move() != player {
        tracing::warn!(
            to_move = ?board.player_to_move(),
            "board parity puts the other side on move; searching for them"
        );
    }

    let mut config = SearchConfig::from_preset(&args.preset);
    config.depth_limit = args.depth;
    config.move_timeout = Duration::from_millis(args.timeout_ms);

    let mut engine = SearchEngine::new(config);
    match engine.select_move(&board) {
        SearchOutcome::Best(result) => {
            if args.json {
                let report = MoveReport {
                    row: result.space.row,
                    col: result.space.col,
                    score: result.score,
                    depth: result.depth,
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!("{} {}", result.space.row, result.space.col);
            }
        }
        SearchOutcome::NoMoves => {
            if args.json {
                println!("{}", serde_json::json!({ "lost": true }));
            } else {
                println!("no legal moves: {:?} has lost", board.player_to_move());
            }
        }
    }

    Ok(())
}

fn parse_player(raw: &str) -> Result<Player> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "x" => Ok(Player::X),
        "o" => Ok(Player::O),
        other => bail!("unknown player '{}', expected 'x' or 'o'", other),
    }
}
