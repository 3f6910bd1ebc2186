//! Play command - run a full game from the initial position
//!
//! ## Structure
//!
//! - run() - orchestration
//! - play_game() - the move loop
//! - search_move(), pick_random_move() - per-turn choices
//! - report_summary() - output

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use isolation_core::{Board, BoardSpace, Player, SearchConfig, SearchEngine, SearchOutcome};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Configuration preset token ("1" selects the profile without quiescence)
    #[arg(long, default_value = "")]
    pub preset: String,

    /// Per-move time budget in milliseconds
    #[arg(long, default_value = "1000")]
    pub timeout_ms: u64,

    /// Iterative-deepening depth limit
    #[arg(long, default_value = "7")]
    pub depth: u32,

    /// Replace O's engine with a seeded random mover
    #[arg(long)]
    pub random_opponent: bool,

    /// Seed for the random mover
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output the game record as JSON
    #[arg(long)]
    pub json: bool,
}

/// One played move
#[derive(Clone, Debug, Serialize)]
struct MoveRecord {
    player: Player,
    row: u8,
    col: u8,
    depth: u32,
    score: f64,
}

/// Full game record
#[derive(Debug, Serialize)]
struct GameSummary {
    winner: Player,
    loser: Player,
    moves_played: usize,
    record: Vec<MoveRecord>,
    final_board: String,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs) -> Result<()> {
    tracing::info!(
        depth = args.depth,
        timeout_ms = args.timeout_ms,
        random_opponent = args.random_opponent,
        "starting game"
    );

    let summary = play_game(&args)?;
    report_summary(&summary, args.json)?;

    Ok(())
}

// ============================================================================
// GAME LOOP
// ============================================================================

fn search_config(args: &PlayArgs) -> SearchConfig {
    let mut config = SearchConfig::from_preset(&args.preset);
    config.depth_limit = args.depth;
    config.move_timeout = Duration::from_millis(args.timeout_ms);
    config
}

fn play_game(args: &PlayArgs) -> Result<GameSummary> {
    let config = search_config(args);
    let mut engine_x = SearchEngine::new(config.clone());
    let mut engine_o = SearchEngine::new(config);
    let mut random = args
        .random_opponent
        .then(|| ChaCha8Rng::seed_from_u64(args.seed));

    let mut board = Board::initial(Player::X);
    let mut record = Vec::new();

    let (winner, loser) = loop {
        let mover = board.player_to_move();

        // each side sees the position from its own perspective
        let view = Board::from_flat_string(&board.to_flat_string(), mover)?;

        let chosen = match (mover, random.as_mut()) {
            (Player::O, Some(rng)) => pick_random_move(&view, rng),
            (Player::O, None) => search_move(&mut engine_o, &view),
            (Player::X, _) => search_move(&mut engine_x, &view),
        };

        match chosen {
            Some((space, depth, score)) => {
                board.make_move(space)?;
                record.push(MoveRecord {
                    player: mover,
                    row: space.row,
                    col: space.col,
                    depth,
                    score,
                });
                tracing::debug!(
                    player = ?mover,
                    row = space.row,
                    col = space.col,
                    depth,
                    "move played"
                );
            }
            // the mover is boxed in and loses
            None => break (mover.opponent(), mover),
        }
    };

    Ok(GameSummary {
        winner,
        loser,
        moves_played: record.len(),
        record,
        final_board: board.to_flat_string(),
    })
}

fn search_move(engine: &mut SearchEngine, view: &Board) -> Option<(BoardSpace, u32, f64)> {
    match engine.select_move(view) {
        SearchOutcome::Best(result) => Some((result.space, result.depth, result.score)),
        SearchOutcome::NoMoves => None,
    }
}

fn pick_random_move(view: &Board, rng: &mut ChaCha8Rng) -> Option<(BoardSpace, u32, f64)> {
    let moves = view.valid_moves();
    moves.choose(rng).copied().map(|space| (space, 0, 0.0))
}

// ============================================================================
// OUTPUT
// ============================================================================

fn report_summary(summary: &GameSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    let board = Board::from_flat_string(&summary.final_board, summary.winner)?;
    println!("{}", board);
    println!(
        "{:?} wins after {} moves ({:?} is boxed in)",
        summary.winner, summary.moves_played, summary.loser
    );
    Ok(())
}
