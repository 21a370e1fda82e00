//! Game trait for rules engines driven by the search.
//!
//! A `Game` value is one (possibly partially observed) state of a match. The
//! search clones it freely: every tree node owns a snapshot, every iteration
//! plays a determinized copy to the end.

use std::fmt::Debug;
use std::hash::Hash;

use crate::core::{PlayerId, SearchRng};
use crate::error::Result;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Multiple winners (a winning team).
    Winners(Vec<PlayerId>),
    /// Tie: nobody won outright.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Winners(ps) => ps.contains(&player),
            GameResult::Draw => false,
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `possible_moves`: must be order-stable for a given state; the tree keys
///   child slots by position in this list. Empty means the game is over.
/// - `perform_move`: mutates in place and rejects moves not in
///   `possible_moves` with [`Error::IllegalMove`](crate::Error::IllegalMove).
/// - For a partially observed state, `possible_moves` of a player with
///   hidden cards must cover every card that player might hold.
/// - `randomize`: resample all hidden information consistently with what the
///   observer has seen. A fully visible state is left untouched.
pub trait Game: Clone + Debug + 'static {
    /// A move; for card games, the card being played.
    type Move: Clone + Eq + Hash + Debug + 'static;

    /// The seat to act next.
    fn next_player(&self) -> PlayerId;

    /// Number of seats.
    fn player_count(&self) -> usize;

    /// Legal moves for the seat to act.
    fn possible_moves(&self) -> Vec<Self::Move>;

    /// Play a move for the seat to act.
    fn perform_move(&mut self, mv: &Self::Move) -> Result<()>;

    /// Outcome of the match, `None` while it is still running.
    fn result(&self) -> Option<GameResult>;

    /// Resample hidden information in place.
    fn randomize(&mut self, rng: &mut SearchRng) -> Result<()>;

    /// Digest of the canonical state. Order-independent parts (hands, won
    /// piles) must be canonicalized first so that equal states hash equally.
    /// Only needed with node unification.
    fn unique_state_hash(&self) -> u64;

    /// Every fully visible state consistent with this one. Only needed for
    /// minimax. A fully visible state returns just itself.
    fn all_possible_states(&self) -> Vec<Self> {
        vec![self.clone()]
    }

    /// Heuristic value of this state for `perspective`'s team; exact at the
    /// end of the game. Only needed for minimax.
    fn game_value(&self, perspective: PlayerId) -> f64;

    /// Team of a seat. Seats on the same team share rewards and minimax
    /// treats their plies as cooperative.
    fn team(&self, player: PlayerId) -> usize {
        player.index()
    }

    /// Moves remaining until the end of the match.
    fn moves_left(&self) -> usize;

    /// Final score margin of `player`'s side and the largest possible margin,
    /// for games that keep score.
    fn score_margin(&self, _player: PlayerId) -> Option<(i32, i32)> {
        None
    }

    /// Moves of the trick in progress, in play order.
    fn current_trick(&self) -> Vec<Self::Move> {
        Vec::new()
    }

    /// Moves of the last completed trick, in play order.
    fn last_trick(&self) -> Option<Vec<Self::Move>> {
        None
    }

    // === Convenience Methods ===

    /// Winners of a finished game (everybody, on a tie).
    fn winners(&self) -> Option<Vec<PlayerId>> {
        self.result().map(|result| match result {
            GameResult::Winner(p) => vec![p],
            GameResult::Winners(ps) => ps,
            GameResult::Draw => PlayerId::all(self.player_count()).collect(),
        })
    }

    /// Whether a finished game ended in a tie.
    fn is_tie(&self) -> bool {
        matches!(self.result(), Some(GameResult::Draw))
    }

    /// Whether the game is over.
    fn is_finished(&self) -> bool {
        self.result().is_some()
    }
}
