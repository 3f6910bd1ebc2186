//! Heuristic score cache boundary

use rustc_hash::FxHashMap;

/// Position-keyed score store, the seam where precomputed heuristic
/// values would be persisted out of process. The key is the flat board
/// string, which identifies a position independent of perspective (board
/// equality is cell-only for exactly this reason). The engine treats any
/// implementation purely as an accelerator, never a correctness
/// dependency.
pub trait HeuristicCache {
    fn load(&self, key: &str) -> Option<f64>;

    fn save(&mut self, key: &str, score: f64);
}

/// In-memory reference implementation standing in for a database
#[derive(Debug, Default)]
pub struct InMemoryHeuristicCache {
    scores: FxHashMap<String, f64>,
}

impl InMemoryHeuristicCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl HeuristicCache for InMemoryHeuristicCache {
    fn load(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }

    fn save(&mut self, key: &str, score: f64) {
        self.scores.insert(key.to_owned(), score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_miss_then_hit() {
        let mut cache = InMemoryHeuristicCache::new();
        assert_eq!(cache.load("some-key"), None);

        cache.save("some-key", 3.0);
        assert_eq!(cache.load("some-key"), Some(3.0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_save_overwrites() {
        let mut cache = InMemoryHeuristicCache::new();
        cache.save("k", 1.0);
        cache.save("k", -2.0);
        assert_eq!(cache.load("k"), Some(-2.0));
        assert_eq!(cache.len(), 1);
    }
}
