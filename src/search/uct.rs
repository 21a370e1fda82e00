//! UCT and determinized UCT.
//!
//! [`Uct`] searches a single fully visible game: select by UCB1 while the
//! node is fully expanded, expand one random unexpanded slot, roll out from
//! the new node's own game, backpropagate. The decision is the root child
//! with the best mean reward.
//!
//! [`DeterminizedUct`] runs an independent UCT search on each of several
//! sampled determinizations and returns the move most of them chose, with
//! ties broken at random.

use std::time::Instant;

use log::{debug, trace};

use super::config::SearchConfig;
use super::node::NodeId;
use super::reward::RewardFn;
use super::selection::{self, Candidate, SelectionPolicy, Ucb1};
use super::simulation::{RandomRollout, SimulationPolicy};
use super::stats::SearchStats;
use super::tree::SearchTree;
use super::{SearchAlgorithm, StopCondition};
use crate::core::{PlayerId, SearchRng};
use crate::error::{Error, Result};
use crate::rules::Game;

/// Plain UCT search context.
pub struct Uct<G: Game> {
    game: G,
    player: PlayerId,
    iterations: u32,
    exploration: f64,
    rng: SearchRng,
    reward: RewardFn,
    simulation: Box<dyn SimulationPolicy<G>>,
    unify: bool,
    stop: Option<StopCondition>,
    stats: SearchStats,
}

impl<G: Game> Uct<G> {
    pub fn new(game: G, player: PlayerId, config: &SearchConfig) -> Self {
        Self {
            game,
            player,
            iterations: config.iterations,
            exploration: config.exploration_constant,
            rng: config.rng(),
            reward: RewardFn::default(),
            simulation: Box::new(RandomRollout),
            unify: false,
            stop: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_reward(mut self, reward: RewardFn) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_simulation(mut self, simulation: Box<dyn SimulationPolicy<G>>) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn with_unification(mut self, unify: bool) -> Self {
        self.unify = unify;
        self
    }

    pub fn with_stop_condition(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Build a tree for `game` with the configured iteration budget.
    fn grow(&mut self, game: G) -> Result<SearchTree<G>> {
        let mut tree = SearchTree::new(game, self.player, self.unify);
        for _ in 0..self.iterations {
            if self.should_stop() {
                break;
            }
            self.iterate(&mut tree)?;
            self.stats.iterations += 1;
        }
        self.stats.unified_nodes += tree.stats().unified;
        Ok(tree)
    }

    fn should_stop(&mut self) -> bool {
        match self.stop.as_mut() {
            Some(stop) => stop(&self.stats),
            None => false,
        }
    }

    fn iterate(&mut self, tree: &mut SearchTree<G>) -> Result<()> {
        let mut node = tree.root();

        while !tree.is_terminal(node) {
            let unexpanded: Vec<usize> = tree.child_slots(node).unexpanded().collect();
            if let Some(&slot) = self.rng.choose(&unexpanded) {
                let mover = tree.get(node).game.next_player();
                node = tree.create_child(node, slot, mover)?;
                self.stats.nodes_created += 1;
                self.stats.max_depth = self.stats.max_depth.max(tree.get(node).depth);
                break;
            }
            node = self.best_child(tree, node, self.exploration)?;
        }

        let mut game = tree.get(node).game.clone();
        self.simulation.simulate(tree, node, &mut game, &mut self.rng)?;
        self.stats.simulations += 1;

        let simulation = &mut self.simulation;
        tree.backpropagate(node, &game, self.reward, |tree, id, reward| {
            simulation.backpropagated(tree, id, reward);
        })
    }

    fn best_child(&mut self, tree: &mut SearchTree<G>, node: NodeId, exploration: f64) -> Result<NodeId> {
        let children: Vec<NodeId> = tree.child_slots(node).expanded().map(|(_, id)| id).collect();
        let candidates: Vec<Candidate> = children
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                let child = tree.get(id);
                Candidate {
                    index,
                    wins: child.wins,
                    visits: child.visits,
                    avails: child.avails,
                }
            })
            .collect();

        selection::choose(&Ucb1, &candidates, tree.get(node).visits, exploration, &mut self.rng)
            .map(|index| children[index])
            .ok_or(Error::NoLegalMoves)
    }

    /// Root child with the best mean reward.
    fn best_move(&mut self, tree: &mut SearchTree<G>) -> Result<G::Move> {
        let root = tree.root();
        let best = self.best_child(tree, root, 0.0)?;
        tree.get(best).mv.clone().ok_or(Error::NoLegalMoves)
    }
}

impl<G: Game> SearchAlgorithm<G> for Uct<G> {
    fn select_move(&mut self) -> Result<G::Move> {
        let start = Instant::now();
        self.stats.reset();

        let legal = self.game.possible_moves();
        if legal.len() <= 1 {
            return legal.into_iter().next().ok_or(Error::NoLegalMoves);
        }

        let mut tree = self.grow(self.game.clone())?;
        let choice = match self.best_move(&mut tree) {
            Ok(mv) => mv,
            Err(_) => self.rng.choose(&legal).cloned().ok_or(Error::NoLegalMoves)?,
        };

        self.stats.time_us = start.elapsed().as_micros() as u64;
        debug!(
            "uct: {} iterations, {} nodes, {}us -> {:?}",
            self.stats.iterations,
            tree.len(),
            self.stats.time_us,
            choice
        );
        Ok(choice)
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "uct"
    }
}

/// UCT over sampled determinizations, aggregated by vote.
pub struct DeterminizedUct<G: Game> {
    inner: Uct<G>,
    determinizations: u32,
}

impl<G: Game> DeterminizedUct<G> {
    pub fn new(game: G, player: PlayerId, config: &SearchConfig) -> Self {
        Self {
            inner: Uct::new(game, player, config),
            determinizations: config.determinizations,
        }
    }

    /// Configure the per-determinization UCT search.
    pub fn map_inner(mut self, f: impl FnOnce(Uct<G>) -> Uct<G>) -> Self {
        self.inner = f(self.inner);
        self
    }
}

impl<G: Game> SearchAlgorithm<G> for DeterminizedUct<G> {
    fn select_move(&mut self) -> Result<G::Move> {
        let start = Instant::now();
        let uct = &mut self.inner;
        uct.stats.reset();

        let legal = uct.game.possible_moves();
        if legal.len() <= 1 {
            return legal.into_iter().next().ok_or(Error::NoLegalMoves);
        }

        // First-seen order keeps the tally deterministic.
        let mut votes: Vec<(G::Move, u32)> = Vec::new();
        for _ in 0..self.determinizations {
            if uct.should_stop() {
                break;
            }
            let mut game = uct.game.clone();
            game.randomize(&mut uct.rng)?;

            let mut tree = uct.grow(game)?;
            let Ok(mv) = uct.best_move(&mut tree) else {
                continue;
            };
            trace!("determinization voted {:?}", mv);
            match votes.iter_mut().find(|(m, _)| *m == mv) {
                Some((_, count)) => *count += 1,
                None => votes.push((mv, 1)),
            }
        }

        let top = votes.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let leaders: Vec<G::Move> = votes
            .into_iter()
            .filter(|(_, c)| *c == top)
            .map(|(m, _)| m)
            .collect();

        let choice = match uct.rng.choose(&leaders) {
            Some(mv) => mv.clone(),
            None => uct.rng.choose(&legal).cloned().ok_or(Error::NoLegalMoves)?,
        };

        uct.stats.time_us = start.elapsed().as_micros() as u64;
        debug!(
            "determinized uct: {} determinizations, {} iterations, {}us -> {:?}",
            self.determinizations, uct.stats.iterations, uct.stats.time_us, choice
        );
        Ok(choice)
    }

    fn stats(&self) -> &SearchStats {
        &self.inner.stats
    }

    fn name(&self) -> &'static str {
        "determinized-uct"
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::search::fixtures::PickGame;

    fn config(iterations: u32) -> SearchConfig {
        SearchConfig::default().with_iterations(iterations).with_determinizations(3)
    }

    #[test]
    fn test_uct_takes_the_largest_number() {
        let mut search = Uct::new(PickGame::new(&[1, 2, 3]), PlayerId::new(0), &config(500));
        assert_eq!(search.select_move().unwrap(), 3);
        assert_eq!(search.stats().iterations, 500);
    }

    #[test]
    fn test_uct_with_unification() {
        let mut search =
            Uct::new(PickGame::new(&[1, 2, 3, 4, 5]), PlayerId::new(0), &config(2000)).with_unification(true);
        search.select_move().unwrap();
        assert!(search.stats().unified_nodes > 0);
    }

    #[test]
    fn test_determinized_uct_votes_for_the_largest_number() {
        let mut search = DeterminizedUct::new(PickGame::new(&[1, 2, 3]), PlayerId::new(0), &config(300));
        assert_eq!(search.select_move().unwrap(), 3);
        assert_eq!(search.stats().iterations, 900);
        assert_eq!(search.name(), "determinized-uct");
    }

    #[test]
    fn test_stop_condition_counts_across_determinizations() {
        let checks = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&checks);
        let mut search = DeterminizedUct::new(PickGame::new(&[1, 2, 3]), PlayerId::new(0), &config(300).with_determinizations(50))
            .map_inner(|uct| {
                uct.with_stop_condition(Box::new(move |stats| {
                    seen.set(seen.get() + 1);
                    stats.iterations >= 5
                }))
            });

        assert!(PickGame::new(&[1, 2, 3]).possible_moves().contains(&search.select_move().unwrap()));
        assert_eq!(search.stats().iterations, 5);
        // Once the budget is spent no further deals are sampled.
        assert!(checks.get() < 10);
    }
}
