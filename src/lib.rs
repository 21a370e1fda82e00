//! # trick-search
//!
//! Tree search for trick-taking card games with hidden information.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: The search only sees the [`Game`] trait. Rules,
//!    scoring and hidden-card sampling live in the game.
//!
//! 2. **Deterministic**: Every random choice draws from one explicit
//!    [`SearchRng`]. The same state, seed, budget and enhancements always
//!    produce the same move.
//!
//! 3. **Composed Once**: Enhancements are resolved when a search is built,
//!    never switched mid-search.
//!
//! ## Architecture
//!
//! - **Information-Set MCTS**: one tree over everything the searcher cannot
//!   tell apart, one sampled deal per iteration, availability-aware UCB1.
//!
//! - **Arena Tree**: nodes are addressed by [`NodeId`] so unified nodes can
//!   have several parents without shared ownership.
//!
//! - **Constructive Determinization**: hidden cards are dealt in one pass
//!   that respects every known-absent suit and never restarts.
//!
//! ## Modules
//!
//! - `core`: Seats, cards, RNG, hidden-card dealing
//! - `rules`: The `Game` trait searches are generic over
//! - `search`: ISMCTS, UCT, determinized UCT, minimax and their enhancements
//! - `games`: Sueca

pub mod core;
pub mod error;
pub mod games;
pub mod rules;
pub mod search;

// Re-export commonly used types
pub use crate::core::{
    Card, CardSlot, DealError, PlayerId, PlayerMap, Rank, SearchRng, SearchRngState, Suit, SuitSet,
};

pub use crate::error::{Error, Result};

pub use crate::rules::{Game, GameResult};

pub use crate::search::{
    Algorithm, Enhancement, Ismcts, MoveSelection, NodeId, RewardFn, SearchAlgorithm, SearchBuilder,
    SearchConfig, SearchStats, SearchTree,
};

pub use crate::games::Sueca;
