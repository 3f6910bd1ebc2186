//! Iterative-deepening alpha-beta search

use std::cmp::Ordering;
use std::time::Duration;

use crate::board::Board;
use crate::cache::HeuristicCache;
use crate::config::SearchConfig;
use crate::eval::WIN_SCORE;
use crate::space::BoardSpace;
use crate::timer::MoveTimer;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Expanded nodes between cooperative deadline polls. At Isolation's
/// branching factor this keeps overshoot well inside the timer's 1%
/// safety margin.
const NODES_PER_TIMER_CHECK: u64 = 256;

/// A position is noisy when the side to move has this few legal moves:
/// the board is signalling an imminent box-in
const NOISY_MOVE_LIMIT: usize = 2;

/// Most extra plies quiescence may spend past the nominal depth on any
/// one branch
const MAX_QUIESCENCE_PLIES: u32 = 8;

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of a move search
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// Best move found at the last fully completed depth
    Best(SearchResult),
    /// The side to move has no legal moves and has lost; nothing to search
    NoMoves,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub space: BoardSpace,
    pub score: f64,
    /// Deepest fully completed iteration this move came from
    pub depth: u32,
    pub stats: SearchStats,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
    pub depth_reached: u32,
    pub elapsed: Duration,
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

/// Iterative-deepening alpha-beta searcher with quiescence extension.
///
/// Single-threaded and cooperative: every branch explores its own board
/// clone, and the only shared state across one `select_move` call is the
/// move timer (read at bounded intervals) and the best-move accumulator
/// owned by the deepening driver.
pub struct SearchEngine {
    config: SearchConfig,
    timer: MoveTimer,
    cache: Option<Box<dyn HeuristicCache>>,
    nodes: u64,
    cutoffs: u64,
    stop: bool,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        let timer = MoveTimer::new(config.move_timeout);
        Self {
            config,
            timer,
            cache: None,
            nodes: 0,
            cutoffs: 0,
            stop: false,
        }
    }

    /// Attach a heuristic cache collaborator. It is consulted only when
    /// the config's load/save flags say so.
    pub fn with_cache(mut self, cache: Box<dyn HeuristicCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&dyn HeuristicCache> {
        self.cache.as_deref()
    }

    /// Pick a move for the side to move, within the configured budget.
    ///
    /// Runs alpha-beta at increasing depth limits, keeping the result of
    /// the last fully completed iteration. An iteration cut short by the
    /// deadline never overrides a completed shallower one.
    pub fn select_move(&mut self, board: &Board) -> SearchOutcome {
        let root_moves = board.valid_moves();
        if root_moves.is_empty() {
            return SearchOutcome::NoMoves;
        }

        self.nodes = 0;
        self.cutoffs = 0;
        self.stop = false;
        self.timer.set_timeout(self.config.move_timeout);
        self.timer.start();

        if root_moves.len() == 1 {
            // forced reply, nothing to search
            let space = root_moves[0];
            self.timer.stop();
            return SearchOutcome::Best(SearchResult {
                space,
                score: self.evaluate(board),
                depth: 0,
                stats: self.stats(0),
            });
        }

        // root moves with their latest scores, searched best-first so the
        // previous iteration seeds this one's ordering
        let mut ordered: Vec<(BoardSpace, f64)> =
            root_moves.into_iter().map(|m| (m, 0.0)).collect();

        let mut best: Option<SearchResult> = None;
        let mut depth = 1u32;

        loop {
            match self.search_root(board, &ordered, depth) {
                Some(scored) => {
                    let (space, score) = scored[0];
                    ordered = scored;
                    best = Some(SearchResult {
                        space,
                        score,
                        depth,
                        stats: self.stats(depth),
                    });
                    if self.config.report_statistics {
                        tracing::debug!(
                            depth,
                            score,
                            nodes = self.nodes,
                            elapsed_ms = self.timer.elapsed().as_millis() as u64,
                            "completed depth iteration"
                        );
                    }
                }
                // interrupted mid-iteration: keep the last completed depth
                None => break,
            }

            if self.timer.is_timed_out() {
                break;
            }
            // searching deeper than the remaining empty squares cannot
            // change the result
            if depth >= board.empty_spaces_remaining() {
                break;
            }
            let deepen = depth < self.config.depth_limit
                || self.timer.percent_of_time_remaining() > self.config.percent_time_to_deepen;
            if !deepen {
                break;
            }
            depth += 1;
        }

        self.timer.stop();

        // interrupted before even depth 1 finished: fall back to the
        // first enumerated legal move rather than returning nothing
        let result = best.unwrap_or_else(|| SearchResult {
            space: ordered[0].0,
            score: self.config.heuristic.evaluate(board),
            depth: 0,
            stats: self.stats(0),
        });

        if self.config.report_statistics {
            tracing::info!(
                row = result.space.row,
                col = result.space.col,
                score = result.score,
                depth = result.depth,
                nodes = result.stats.nodes,
                cutoffs = result.stats.cutoffs,
                elapsed_ms = result.stats.elapsed.as_millis() as u64,
                "move selected"
            );
        }

        SearchOutcome::Best(result)
    }

    // ========================================================================
    // DEPTH ITERATION
    // ========================================================================

    /// One full alpha-beta iteration over the root moves. Returns the
    /// moves re-scored and sorted best-first for the mover, or `None` if
    /// the deadline interrupted the iteration.
    fn search_root(
        &mut self,
        board: &Board,
        ordered: &[(BoardSpace, f64)],
        depth: u32,
    ) -> Option<Vec<(BoardSpace, f64)>> {
        let maximizing = board.player_to_move() == board.my_player();
        let mut alpha = f64::NEG_INFINITY;
        let mut beta = f64::INFINITY;
        let mut scored = Vec::with_capacity(ordered.len());

        self.nodes += 1;
        for &(space, _) in ordered {
            let mut child = board.clone();
            child.apply_move(space);
            let score =
                self.alpha_beta(&child, depth - 1, alpha, beta, 1, MAX_QUIESCENCE_PLIES);
            if self.stop {
                return None;
            }
            scored.push((space, score));
            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
        }

        if maximizing {
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        } else {
            scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        }
        Some(scored)
    }

    // ========================================================================
    // ALPHA-BETA
    // ========================================================================

    fn alpha_beta(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        ply: u32,
        quiescence_budget: u32,
    ) -> f64 {
        self.nodes += 1;
        if self.nodes % NODES_PER_TIMER_CHECK == 0 && self.timer.is_timed_out() {
            self.stop = true;
        }
        if self.stop {
            // value is discarded once the driver sees the stop flag
            return 0.0;
        }

        let maximizing = board.player_to_move() == board.my_player();
        let mut moves = board.valid_moves();

        // the boxed-in side to move has lost; decisive scores are
        // depth-adjusted so nearer wins (and more distant losses) rank higher
        if moves.is_empty() {
            return if maximizing {
                -WIN_SCORE + ply as f64
            } else {
                WIN_SCORE - ply as f64
            };
        }

        if depth == 0 {
            let noisy = self.config.quiescence
                && quiescence_budget > 0
                && moves.len() <= NOISY_MOVE_LIMIT;
            if !noisy {
                return self.evaluate(board);
            }
            // sharp line: keep searching on the extension budget instead
            // of trusting a horizon evaluation
        }

        let next_depth = depth.saturating_sub(1);
        let next_budget = if depth == 0 {
            quiescence_budget - 1
        } else {
            quiescence_budget
        };

        // near-center destinations first: they tend to preserve mobility,
        // which tightens the pruning window early
        moves.sort_by_key(|space| space.distance_to_center());

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for space in moves {
            let mut child = board.clone();
            child.apply_move(space);
            let score = self.alpha_beta(&child, next_depth, alpha, beta, ply + 1, next_budget);
            if self.stop {
                return 0.0;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.cutoffs += 1;
                break;
            }
        }

        best
    }

    // ========================================================================
    // EVALUATION
    // ========================================================================

    /// Heuristic evaluation, routed through the cache collaborator when
    /// the config enables it
    fn evaluate(&mut self, board: &Board) -> f64 {
        let load = self.config.load_heuristic_cache;
        let save = self.config.save_heuristic_cache;

        if (load || save) && self.cache.is_some() {
            let key = board.to_flat_string();
            if load {
                if let Some(score) = self.cache.as_ref().and_then(|c| c.load(&key)) {
                    return score;
                }
            }
            let score = self.config.heuristic.evaluate(board);
            if save {
                if let Some(cache) = self.cache.as_mut() {
                    cache.save(&key, score);
                }
            }
            return score;
        }

        self.config.heuristic.evaluate(board)
    }

    fn stats(&self, depth_reached: u32) -> SearchStats {
        SearchStats {
            nodes: self.nodes,
            cutoffs: self.cutoffs,
            depth_reached,
            elapsed: self.timer.elapsed(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Player;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Instant;

    fn flat_with(cells: &[(u8, u8, char)]) -> String {
        let mut chars = vec!['-'; 64];
        for &(row, col, c) in cells {
            chars[(row as usize) * 8 + col as usize] = c;
        }
        chars.into_iter().collect()
    }

    /// Config pinned to an exact depth: generous budget, never deepens
    /// past the limit (the threshold is an impossible fraction)
    fn pinned_config(depth_limit: u32, quiescence: bool) -> SearchConfig {
        let mut config = SearchConfig::default();
        config.depth_limit = depth_limit;
        config.quiescence = quiescence;
        config.percent_time_to_deepen = 1.1;
        config.report_statistics = false;
        config
    }

    /// O trapped in the top-right corner with a single escape square
    /// (0,6); X can occupy it from (2,4) and win on the spot.
    fn win_in_one() -> Board {
        let flat = flat_with(&[
            (0, 7, 'o'),
            (0, 5, '*'),
            (1, 6, '*'),
            (1, 7, '*'),
            (2, 4, 'x'),
            (7, 0, '*'),
        ]);
        Board::from_flat_string(&flat, Player::X).unwrap()
    }

    /// Same trap, but X starts on (3,5) and cannot reach (0,6) directly:
    /// the win takes three plies (block (1,5), let O shuffle to (0,6),
    /// then any move leaves O with nowhere to go).
    fn win_in_three() -> Board {
        let flat = flat_with(&[
            (0, 7, 'o'),
            (0, 5, '*'),
            (1, 6, '*'),
            (1, 7, '*'),
            (3, 5, 'x'),
            (7, 0, '*'),
        ]);
        Board::from_flat_string(&flat, Player::X).unwrap()
    }

    fn best(outcome: SearchOutcome) -> SearchResult {
        match outcome {
            SearchOutcome::Best(result) => result,
            SearchOutcome::NoMoves => panic!("expected a move"),
        }
    }

    #[test]
    fn test_reports_loss_when_boxed_in() {
        // X sealed into the corner; parity filler keeps X to move
        let flat = flat_with(&[
            (0, 0, 'x'),
            (0, 1, '*'),
            (1, 0, '*'),
            (1, 1, '*'),
            (5, 5, '*'),
            (7, 7, 'o'),
        ]);
        let board = Board::from_flat_string(&flat, Player::X).unwrap();
        assert_eq!(board.player_to_move(), Player::X);

        let mut engine = SearchEngine::new(pinned_config(3, false));
        assert!(matches!(engine.select_move(&board), SearchOutcome::NoMoves));
    }

    #[test]
    fn test_forced_reply_is_returned_without_search() {
        // X's only open line is south, cut off after one square
        let flat = flat_with(&[
            (0, 0, 'x'),
            (0, 1, '*'),
            (1, 1, '*'),
            (2, 0, '*'),
            (5, 5, '*'),
            (7, 7, 'o'),
        ]);
        let board = Board::from_flat_string(&flat, Player::X).unwrap();
        assert_eq!(board.player_to_move(), Player::X);
        assert_eq!(board.valid_moves(), vec![BoardSpace::new(1, 0)]);

        let mut engine = SearchEngine::new(pinned_config(5, true));
        let result = best(engine.select_move(&board));
        assert_eq!(result.space, BoardSpace::new(1, 0));
        assert_eq!(result.depth, 0);
    }

    #[test]
    fn test_finds_immediate_win() {
        let board = win_in_one();
        assert_eq!(board.player_to_move(), Player::X);

        let mut engine = SearchEngine::new(pinned_config(2, false));
        let result = best(engine.select_move(&board));
        assert_eq!(result.space, BoardSpace::new(0, 6));
        assert!(result.score > WIN_SCORE / 2.0);
    }

    #[test]
    fn test_deeper_limit_does_not_lose_quality() {
        let board = win_in_three();

        let mut shallow = SearchEngine::new(pinned_config(1, false));
        let shallow_result = best(shallow.select_move(&board));
        assert!(board.is_valid_move(shallow_result.space));
        assert!(shallow_result.score < WIN_SCORE / 2.0);

        let mut deep = SearchEngine::new(pinned_config(3, false));
        let deep_result = best(deep.select_move(&board));
        assert!(board.is_valid_move(deep_result.space));
        assert!(deep_result.score > WIN_SCORE / 2.0);
        assert!(deep_result.score >= shallow_result.score);
    }

    #[test]
    fn test_quiescence_extends_sharp_lines() {
        // nominal depth 1 on a position full of forced opponent replies:
        // the extension must spend extra nodes past the horizon
        let board = win_in_three();

        let mut plain = SearchEngine::new(pinned_config(1, false));
        let plain_result = best(plain.select_move(&board));

        let mut extended = SearchEngine::new(pinned_config(1, true));
        let extended_result = best(extended.select_move(&board));

        assert!(board.is_valid_move(plain_result.space));
        assert!(board.is_valid_move(extended_result.space));
        assert!(extended_result.stats.nodes > plain_result.stats.nodes);
    }

    #[test]
    fn test_timeout_still_returns_a_legal_move() {
        let board = Board::initial(Player::X);
        let mut config = SearchConfig::default();
        config.move_timeout = Duration::from_millis(1);
        config.report_statistics = false;

        let started = Instant::now();
        let mut engine = SearchEngine::new(config);
        let result = best(engine.select_move(&board));
        let took = started.elapsed();

        assert!(board.is_valid_move(result.space));
        assert!(took < Duration::from_secs(1), "search ran {:?}", took);
    }

    #[test]
    fn test_statistics_are_collected() {
        let board = Board::initial(Player::X);
        let mut engine = SearchEngine::new(pinned_config(2, false));
        let result = best(engine.select_move(&board));

        assert!(result.stats.nodes > 20);
        assert_eq!(result.stats.depth_reached, 2);
        assert!(result.stats.elapsed > Duration::ZERO);
    }

    /// Cache doubling as a probe for collaborator traffic
    struct CountingCache {
        saves: Rc<Cell<usize>>,
        loads: Rc<Cell<usize>>,
    }

    impl HeuristicCache for CountingCache {
        fn load(&self, _key: &str) -> Option<f64> {
            self.loads.set(self.loads.get() + 1);
            None
        }

        fn save(&mut self, _key: &str, _score: f64) {
            self.saves.set(self.saves.get() + 1);
        }
    }

    #[test]
    fn test_cache_consulted_only_when_enabled() {
        let board = Board::initial(Player::X);

        let saves = Rc::new(Cell::new(0));
        let loads = Rc::new(Cell::new(0));
        let mut config = pinned_config(2, false);
        config.load_heuristic_cache = true;
        config.save_heuristic_cache = true;
        let mut engine = SearchEngine::new(config).with_cache(Box::new(CountingCache {
            saves: Rc::clone(&saves),
            loads: Rc::clone(&loads),
        }));
        best(engine.select_move(&board));
        assert!(saves.get() > 0);
        assert!(loads.get() > 0);

        let saves_off = Rc::new(Cell::new(0));
        let loads_off = Rc::new(Cell::new(0));
        let mut engine = SearchEngine::new(pinned_config(2, false)).with_cache(Box::new(
            CountingCache {
                saves: Rc::clone(&saves_off),
                loads: Rc::clone(&loads_off),
            },
        ));
        best(engine.select_move(&board));
        assert_eq!(saves_off.get(), 0);
        assert_eq!(loads_off.get(), 0);
    }

    #[test]
    fn test_search_leaves_input_board_untouched() {
        let board = win_in_one();
        let snapshot = board.clone();

        let mut engine = SearchEngine::new(pinned_config(3, true));
        best(engine.select_move(&board));

        assert_eq!(board, snapshot);
        assert_eq!(board.player_to_move(), snapshot.player_to_move());
    }
}
