//! Board state, move generation, and the flat interchange format

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::GameError;
use crate::space::{BoardSpace, BoardSpaceValue, Player, BOARD_SIZE, DIRECTIONS};

/// Total squares on the board
const CELL_COUNT: usize = 64;

/// Empty squares on a fresh board (64 minus the two starting pieces)
const INITIAL_EMPTY_SPACES: u32 = 62;

/// Full game state for one Isolation position.
///
/// Cells live in a flat row-major array (`row * 8 + col`), so cloning a
/// board for a search branch is a plain memcpy. The `my_player` tag is a
/// perspective marker for heuristic evaluation, not part of the game
/// state proper.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [BoardSpaceValue; CELL_COUNT],
    x_position: BoardSpace,
    o_position: BoardSpace,
    player_to_move: Player,
    my_player: Player,
    empty_spaces_remaining: u32,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Canonical starting position: X at (0,0), O at (7,7), X to move
    pub fn initial(my_player: Player) -> Self {
        let mut cells = [BoardSpaceValue::Empty; CELL_COUNT];
        let x_position = BoardSpace::new(0, 0);
        let o_position = BoardSpace::new(7, 7);
        cells[x_position.index()] = BoardSpaceValue::PlayerX;
        cells[o_position.index()] = BoardSpaceValue::PlayerO;

        Self {
            cells,
            x_position,
            o_position,
            player_to_move: Player::X,
            my_player,
            empty_spaces_remaining: INITIAL_EMPTY_SPACES,
        }
    }

    /// Reconstruct a board from its 64-character flat representation.
    ///
    /// The side to move is derived from parity: every move converts one
    /// empty square, so an even empty-square count means X is to move.
    pub fn from_flat_string(flat: &str, my_player: Player) -> Result<Self, GameError> {
        let char_count = flat.chars().count();
        if char_count != CELL_COUNT {
            return Err(GameError::InvalidFormat(format!(
                "expected {} characters, got {}",
                CELL_COUNT, char_count
            )));
        }

        let mut cells = [BoardSpaceValue::Empty; CELL_COUNT];
        let mut x_position = None;
        let mut o_position = None;
        let mut filled_count = 0u32;

        for (i, c) in flat.chars().enumerate() {
            let value = BoardSpaceValue::from_char(c)?;
            cells[i] = value;

            let space = BoardSpace::new((i / BOARD_SIZE as usize) as u8, (i % BOARD_SIZE as usize) as u8);
            match value {
                BoardSpaceValue::PlayerX => {
                    if x_position.replace(space).is_some() {
                        return Err(GameError::InvalidFormat("more than one X piece".into()));
                    }
                }
                BoardSpaceValue::PlayerO => {
                    if o_position.replace(space).is_some() {
                        return Err(GameError::InvalidFormat("more than one O piece".into()));
                    }
                }
                BoardSpaceValue::Filled => filled_count += 1,
                BoardSpaceValue::Empty => {}
            }
        }

        let x_position =
            x_position.ok_or_else(|| GameError::InvalidFormat("board has no X piece".into()))?;
        let o_position =
            o_position.ok_or_else(|| GameError::InvalidFormat("board has no O piece".into()))?;

        let empty_spaces_remaining = INITIAL_EMPTY_SPACES - filled_count;
        let player_to_move = if empty_spaces_remaining % 2 == 0 {
            Player::X
        } else {
            Player::O
        };

        Ok(Self {
            cells,
            x_position,
            o_position,
            player_to_move,
            my_player,
            empty_spaces_remaining,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn player_to_move(&self) -> Player {
        self.player_to_move
    }

    /// The perspective player that heuristics score for
    pub fn my_player(&self) -> Player {
        self.my_player
    }

    pub fn opponent_player(&self) -> Player {
        self.my_player.opponent()
    }

    pub fn x_position(&self) -> BoardSpace {
        self.x_position
    }

    pub fn o_position(&self) -> BoardSpace {
        self.o_position
    }

    pub fn empty_spaces_remaining(&self) -> u32 {
        self.empty_spaces_remaining
    }

    pub fn value_at(&self, space: BoardSpace) -> BoardSpaceValue {
        self.cells[space.index()]
    }

    fn position_of(&self, player: Player) -> BoardSpace {
        match player {
            Player::X => self.x_position,
            Player::O => self.o_position,
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal destinations for the side to move
    pub fn valid_moves(&self) -> Vec<BoardSpace> {
        self.moves_from(self.position_of(self.player_to_move))
    }

    /// Legal destinations for the perspective player, regardless of turn
    pub fn my_valid_moves(&self) -> Vec<BoardSpace> {
        self.moves_from(self.position_of(self.my_player))
    }

    /// Legal destinations for the perspective player's opponent, regardless of turn
    pub fn opponent_valid_moves(&self) -> Vec<BoardSpace> {
        self.moves_from(self.position_of(self.my_player.opponent()))
    }

    pub fn is_valid_move(&self, space: BoardSpace) -> bool {
        self.valid_moves().contains(&space)
    }

    /// Queen movement: walk outward in each of the 8 directions, pushing
    /// destinations while the walked-to square is empty, stopping a
    /// direction at the first blocked square or the board edge. Within a
    /// direction destinations come out near-to-far.
    fn moves_from(&self, from: BoardSpace) -> Vec<BoardSpace> {
        let mut moves = Vec::new();
        let range = 0..BOARD_SIZE as i8;

        for &(dr, dc) in &DIRECTIONS {
            let mut row = from.row as i8 + dr;
            let mut col = from.col as i8 + dc;

            while range.contains(&row) && range.contains(&col) {
                let space = BoardSpace::new(row as u8, col as u8);
                if self.cells[space.index()] != BoardSpaceValue::Empty {
                    break;
                }
                moves.push(space);
                row += dr;
                col += dc;
            }
        }

        moves
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validated move entry point: rejects destinations not in
    /// `valid_moves()` with `IllegalMove`.
    pub fn make_move(&mut self, space: BoardSpace) -> Result<(), GameError> {
        if !self.is_valid_move(space) {
            return Err(GameError::IllegalMove(space));
        }
        self.apply_move(space);
        Ok(())
    }

    /// Unchecked apply for the search, which only plays moves it
    /// enumerated. The vacated square becomes permanently `Filled`.
    pub(crate) fn apply_move(&mut self, space: BoardSpace) {
        let mover = self.player_to_move;
        let from = self.position_of(mover);

        self.cells[from.index()] = BoardSpaceValue::Filled;
        self.cells[space.index()] = mover.marker();
        match mover {
            Player::X => self.x_position = space,
            Player::O => self.o_position = space,
        }
        self.player_to_move = mover.opponent();
        self.empty_spaces_remaining -= 1;
    }

    // ========================================================================
    // FLAT FORMAT
    // ========================================================================

    /// 64 characters, row-major, lower-case. Round-trips exactly through
    /// `from_flat_string`.
    pub fn to_flat_string(&self) -> String {
        self.cells.iter().map(|v| v.to_char()).collect()
    }
}

// Equality and hashing look at the 64 cells only. Piece positions and the
// side to move are implied by the layout, and boards that differ only in
// the `my_player` perspective tag compare equal on purpose: cached scores
// stay keyed by position, shared across perspectives.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  1 2 3 4 5 6 7 8")?;
        for row in 0..BOARD_SIZE {
            write!(f, "{}", row + 1)?;
            for col in 0..BOARD_SIZE {
                write!(f, " {}", self.value_at(BoardSpace::new(row, col)).to_char())?;
            }
            if row != BOARD_SIZE - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
