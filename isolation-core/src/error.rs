//! Error types

use crate::space::BoardSpace;

/// Errors surfaced by the board model
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Malformed flat board input: wrong length or a character outside
    /// the `{'-', '*', 'x', 'o'}` alphabet
    #[error("invalid board format: {0}")]
    InvalidFormat(String),

    /// The requested destination is not among the mover's legal moves
    #[error("illegal move to ({}, {})", .0.row, .0.col)]
    IllegalMove(BoardSpace),
}
