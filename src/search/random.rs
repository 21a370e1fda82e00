//! Uniform random baseline.

use log::debug;

use super::config::SearchConfig;
use super::stats::SearchStats;
use super::SearchAlgorithm;
use crate::core::SearchRng;
use crate::error::{Error, Result};
use crate::rules::Game;

/// Plays a uniformly random legal move.
pub struct RandomSearch<G: Game> {
    game: G,
    rng: SearchRng,
    stats: SearchStats,
}

impl<G: Game> RandomSearch<G> {
    pub fn new(game: G, config: &SearchConfig) -> Self {
        Self {
            game,
            rng: config.rng(),
            stats: SearchStats::default(),
        }
    }
}

impl<G: Game> SearchAlgorithm<G> for RandomSearch<G> {
    fn select_move(&mut self) -> Result<G::Move> {
        let moves = self.game.possible_moves();
        let choice = self.rng.choose(&moves).cloned().ok_or(Error::NoLegalMoves)?;
        debug!("random: {:?} of {} moves", choice, moves.len());
        Ok(choice)
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures::PickGame;

    #[test]
    fn test_random_picks_a_legal_move() {
        let game = PickGame::new(&[1, 2, 3]);
        let mut search = RandomSearch::new(game, &SearchConfig::default());
        for _ in 0..20 {
            let mv = search.select_move().unwrap();
            assert!([1, 2, 3].contains(&mv));
        }
    }

    #[test]
    fn test_random_fails_on_finished_game() {
        let mut game = PickGame::new(&[1]);
        game.perform_move(&1).unwrap();
        let mut search = RandomSearch::new(game, &SearchConfig::default());
        assert!(matches!(search.select_move(), Err(Error::NoLegalMoves)));
    }
}
