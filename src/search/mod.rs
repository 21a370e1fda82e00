//! Tree search over trick-taking card games.
//!
//! ## Overview
//!
//! Every algorithm here implements [`SearchAlgorithm`]: it is constructed
//! for one seat and one game state, and `select_move` runs a fixed budget
//! before returning a move.
//!
//! - **ISMCTS**: a single tree over the information set, one sampled
//!   determinization per iteration, availability-UCB1 selection
//! - **Determinized UCT**: an independent UCT tree per sampled deal, majority
//!   vote across deals
//! - **Minimax**: alpha-beta under every consistent deal, majority vote
//! - **Random**: uniform baseline
//!
//! Enhancements (reward function, NAST/EPIC rollouts, node unification,
//! subtree preservation, the minimax endgame switch) are composed once by
//! [`SearchBuilder`] from a [`SearchConfig`].
//!
//! ## Usage
//!
//! ```rust
//! use trick_search::games::Sueca;
//! use trick_search::rules::Game;
//! use trick_search::search::{Algorithm, Enhancement, SearchBuilder, SearchConfig};
//!
//! let game = Sueca::deal(7);
//! let me = game.next_player();
//! let config = SearchConfig::default()
//!     .with_iterations(200)
//!     .with_enhancement(Enhancement::unification());
//!
//! let mut search = SearchBuilder::new(game.observed_by(me), me, config)
//!     .build(Algorithm::Ismcts)
//!     .unwrap();
//! let card = search.select_move().unwrap();
//! assert!(game.possible_moves().contains(&card));
//! ```
//!
//! ## Determinism
//!
//! All randomness comes from the [`SearchRng`](crate::core::SearchRng) built
//! from the configuration, so the same game, seed (or RNG state), budget and
//! enhancements always yield the same move.

pub mod builder;
pub mod config;
pub mod ismcts;
pub mod minimax;
pub mod node;
pub mod policy;
pub mod random;
pub mod reward;
pub mod selection;
pub mod simulation;
pub mod stats;
pub mod tree;
pub mod uct;

#[cfg(test)]
mod fixtures;

use crate::error::Result;
use crate::rules::Game;

// Re-export main types
pub use builder::{Algorithm, SearchBuilder};
pub use config::{
    EndgameSolver, Enhancement, NodeExpansion, RolloutKind, SearchConfig, TreeReuse,
};
pub use ismcts::{ChildSummary, Ismcts};
pub use minimax::Minimax;
pub use node::{ChildSlots, Node, NodeId};
pub use policy::{ArmStats, MoveSelection};
pub use random::RandomSearch;
pub use reward::RewardFn;
pub use selection::{AvailabilityUcb1, Candidate, SelectionPolicy, Ucb1};
pub use simulation::{Epic, Nast, RandomRollout, SimulationPolicy};
pub use stats::SearchStats;
pub use tree::{SearchTree, TreeStats};
pub use uct::{DeterminizedUct, Uct};

/// Extra stopping rule, checked before every iteration. Returning `true`
/// ends the search early.
pub type StopCondition = Box<dyn FnMut(&SearchStats) -> bool>;

/// A configured search for one seat.
pub trait SearchAlgorithm<G: Game> {
    /// Run the search and return the chosen move.
    fn select_move(&mut self) -> Result<G::Move>;

    /// Statistics of the last `select_move`.
    fn stats(&self) -> &SearchStats;

    fn name(&self) -> &'static str;

    /// Hand over the tree of the last search, for reuse on the next turn.
    fn into_tree(self: Box<Self>) -> Option<SearchTree<G>> {
        None
    }
}
