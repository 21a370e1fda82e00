//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during one `select_move` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Iterations performed (deals solved, for minimax).
    pub iterations: u32,

    /// Nodes added to the tree (positions visited, for minimax).
    pub nodes_created: u32,

    /// Rollouts performed.
    pub simulations: u32,

    /// Nodes adopted by a second parent through unification.
    pub unified_nodes: u32,

    /// Root visits inherited from the previous search.
    pub reused_visits: u32,

    /// Maximum tree depth reached.
    pub max_depth: u16,

    /// Total time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Calculate iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            f64::from(self.iterations) / (self.time_us as f64 / 1_000_000.0)
        }
    }

    /// Average nodes added per iteration.
    #[must_use]
    pub fn avg_nodes_per_iteration(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            f64::from(self.nodes_created) / f64::from(self.iterations)
        }
    }
}
