//! Isolation Core - board model and move search
//!
//! This crate provides the engine for the board game Isolation:
//! - Board state, queen-style move generation, and the 64-character flat
//!   interchange format
//! - Pluggable heuristic evaluation with a mobility baseline
//! - A per-move wall-clock budget (deadline controller)
//! - Iterative-deepening alpha-beta search with quiescence extension
//! - The heuristic-cache collaborator boundary

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod eval;
pub mod search;
pub mod space;
pub mod timer;

// Re-exports for convenient access
pub use board::Board;
pub use cache::{HeuristicCache, InMemoryHeuristicCache};
pub use config::{GamePhase, SearchConfig};
pub use error::GameError;
pub use eval::{
    HeuristicEvaluator, MobilityHeuristic, WeightedMobilityHeuristic, WIN_SCORE,
};
pub use search::{SearchEngine, SearchOutcome, SearchResult, SearchStats};
pub use space::{BoardSpace, BoardSpaceValue, Player, DIRECTIONS};
pub use timer::MoveTimer;
