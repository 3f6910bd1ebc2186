//! Search tuning configuration

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::eval::{HeuristicEvaluator, MobilityHeuristic};

/// Rough stage of the game, available to phase-aware heuristics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Beginning,
    Middle,
    End,
}

/// Tunables consumed by the search engine. Copy-construction is `Clone`;
/// the heuristic is shared behind an `Arc` so clones stay cheap.
#[derive(Clone)]
pub struct SearchConfig {
    /// How many plies to search before iterative deepening must earn more
    pub depth_limit: u32,

    /// Maximum allowed wall-clock time per move
    pub move_timeout: Duration,

    /// Deepen past the depth limit while more than this fraction of the
    /// budget remains after a completed iteration
    pub percent_time_to_deepen: f64,

    /// Emit node/depth/time statistics (never affects the chosen move)
    pub report_statistics: bool,

    /// Extend the search past the nominal depth at noisy positions
    pub quiescence: bool,

    /// Consult the heuristic cache collaborator before evaluating
    pub load_heuristic_cache: bool,

    /// Store fresh evaluations into the heuristic cache collaborator
    pub save_heuristic_cache: bool,

    /// Stage tag handed to phase-aware heuristics
    pub game_phase: GamePhase,

    /// Scoring function for leaf and cutoff positions
    pub heuristic: Arc<dyn HeuristicEvaluator>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth_limit: 7,
            move_timeout: Duration::from_secs(55),
            percent_time_to_deepen: 0.90,
            report_statistics: true,
            quiescence: true,
            load_heuristic_cache: false,
            save_heuristic_cache: false,
            game_phase: GamePhase::Beginning,
            heuristic: Arc::new(MobilityHeuristic),
        }
    }
}

impl SearchConfig {
    /// Build a config from a preset token. The only named preset is
    /// `"1"`, the shallower profile with quiescence disabled; any other
    /// token (including none) yields the defaults.
    pub fn from_preset(token: &str) -> Self {
        let mut config = Self::default();
        if token.trim() == "1" {
            config.depth_limit = 7;
            config.quiescence = false;
        }
        config
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("depth_limit", &self.depth_limit)
            .field("move_timeout", &self.move_timeout)
            .field("percent_time_to_deepen", &self.percent_time_to_deepen)
            .field("report_statistics", &self.report_statistics)
            .field("quiescence", &self.quiescence)
            .field("load_heuristic_cache", &self.load_heuristic_cache)
            .field("save_heuristic_cache", &self.save_heuristic_cache)
            .field("game_phase", &self.game_phase)
            .field("heuristic", &self.heuristic.name())
            .finish()
    }
}
