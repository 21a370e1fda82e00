//! The game capability the search engine drives.
//!
//! Concrete rules engines (Sueca, Bisca, Hearts, ...) live outside the
//! search; they plug in by implementing [`Game`].

mod game;

pub use game::{Game, GameResult};
