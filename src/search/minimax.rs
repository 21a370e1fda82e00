//! Alpha-beta minimax over every consistent deal.
//!
//! The root is a chance node: [`Game::all_possible_states`] lists every deal
//! the searcher cannot rule out. Each deal is solved by alpha-beta and votes
//! for every root move that reaches its best value; the move with the most
//! votes is played (first seen on a tie). Plies of the searcher's team
//! maximize, the others minimize, and positions are scored with
//! [`Game::game_value`] from the searcher's side.
//!
//! Deal counts grow with the multinomial over hidden slots, so this is meant
//! for endgames or fully visible positions.

use std::time::Instant;

use log::{debug, trace};

use super::config::SearchConfig;
use super::stats::SearchStats;
use super::{SearchAlgorithm, StopCondition};
use crate::core::PlayerId;
use crate::error::{Error, Result};
use crate::rules::Game;

/// Vote-aggregated alpha-beta search.
pub struct Minimax<G: Game> {
    game: G,
    player: PlayerId,
    /// Ply limit, `None` to solve to the end.
    depth: Option<u32>,
    stop: Option<StopCondition>,
    stats: SearchStats,
}

impl<G: Game> Minimax<G> {
    pub fn new(game: G, player: PlayerId, config: &SearchConfig) -> Self {
        Self {
            game,
            player,
            depth: config.minimax_depth,
            stop: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_stop_condition(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Every root move of one fully visible deal that reaches its best value.
    /// Root children get a full window each so equal values are exact.
    fn solve(&mut self, deal: &G) -> Result<Vec<G::Move>> {
        let child_depth = self.depth.map(|d| d.saturating_sub(1));
        let mut best = f64::NEG_INFINITY;
        let mut leaders = Vec::new();

        for mv in deal.possible_moves() {
            let mut child = deal.clone();
            child.perform_move(&mv)?;
            let value = self.alpha_beta(&child, child_depth, f64::NEG_INFINITY, f64::INFINITY)?;
            if value > best {
                best = value;
                leaders.clear();
                leaders.push(mv);
            } else if value == best {
                leaders.push(mv);
            }
        }

        Ok(leaders)
    }

    fn alpha_beta(&mut self, game: &G, depth: Option<u32>, mut alpha: f64, mut beta: f64) -> Result<f64> {
        self.stats.nodes_created = self.stats.nodes_created.saturating_add(1);

        let moves = game.possible_moves();
        if moves.is_empty() || depth == Some(0) {
            return Ok(game.game_value(self.player));
        }

        let maximizing = game.team(game.next_player()) == game.team(self.player);
        let child_depth = depth.map(|d| d - 1);
        let mut best = if maximizing { f64::NEG_INFINITY } else { f64::INFINITY };

        for mv in &moves {
            let mut child = game.clone();
            child.perform_move(mv)?;
            let value = self.alpha_beta(&child, child_depth, alpha, beta)?;

            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if beta <= alpha {
                break;
            }
        }

        Ok(best)
    }
}

impl<G: Game> SearchAlgorithm<G> for Minimax<G> {
    fn select_move(&mut self) -> Result<G::Move> {
        let start = Instant::now();
        self.stats.reset();

        let legal = self.game.possible_moves();
        if legal.len() <= 1 {
            return legal.into_iter().next().ok_or(Error::NoLegalMoves);
        }

        let deals = self.game.all_possible_states();
        let mut votes: Vec<(G::Move, u32)> = Vec::new();

        for deal in &deals {
            if let Some(stop) = self.stop.as_mut() {
                if stop(&self.stats) {
                    break;
                }
            }
            let leaders = self.solve(deal)?;
            trace!("deal voted {:?}", leaders);
            for mv in leaders {
                match votes.iter_mut().find(|(m, _)| *m == mv) {
                    Some((_, count)) => *count += 1,
                    None => votes.push((mv, 1)),
                }
            }
            self.stats.iterations += 1;
        }

        let mut winner: Option<(G::Move, u32)> = None;
        for (mv, count) in votes {
            if winner.as_ref().map_or(true, |(_, c)| count > *c) {
                winner = Some((mv, count));
            }
        }

        self.stats.time_us = start.elapsed().as_micros() as u64;
        // Stopped before the first deal: fall back to the first legal move.
        let (choice, count) = match winner {
            Some(vote) => vote,
            None => (legal[0].clone(), 0),
        };
        debug!(
            "minimax: {} deals, {} positions, {}us -> {:?} ({} votes)",
            self.stats.iterations, self.stats.nodes_created, self.stats.time_us, choice, count
        );
        Ok(choice)
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "minimax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures::PickGame;

    fn minimax(pool: &[u8], depth: Option<u32>) -> Minimax<PickGame> {
        let mut config = SearchConfig::default();
        config.minimax_depth = depth;
        Minimax::new(PickGame::new(pool), PlayerId::new(0), &config)
    }

    #[test]
    fn test_takes_largest_when_solving_to_the_end() {
        // Taking 3 leaves 2 for the opponent and 1 for us: +2.
        // Taking 2 or 1 lets the opponent grab 3.
        let mut search = minimax(&[1, 2, 3], None);
        assert_eq!(search.select_move().unwrap(), 3);
        assert_eq!(search.stats().iterations, 1);
        assert!(search.stats().nodes_created > 0);
    }

    #[test]
    fn test_depth_limit_scores_with_game_value() {
        let mut search = minimax(&[1, 5, 2, 4], Some(1));
        assert_eq!(search.select_move().unwrap(), 5);
    }

    #[test]
    fn test_pruning_visits_fewer_positions_than_full_tree() {
        let mut search = minimax(&[1, 2, 3, 4, 5, 6], None);
        search.select_move().unwrap();
        // 6! leaves plus interior nodes without pruning.
        let full: u32 = (1..=6).map(|k| (7 - k..=6).product::<u32>()).sum();
        assert!(search.stats().nodes_created < full);
    }

    #[test]
    fn test_single_move_skips_search() {
        let mut search = minimax(&[9], None);
        assert_eq!(search.select_move().unwrap(), 9);
        assert_eq!(search.stats().nodes_created, 0);
    }

    #[test]
    fn test_stop_condition_ends_before_first_deal() {
        let mut search = minimax(&[1, 2, 3], None).with_stop_condition(Box::new(|_| true));
        assert_eq!(search.select_move().unwrap(), 1);
        assert_eq!(search.stats().iterations, 0);
    }
}
