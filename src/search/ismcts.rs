//! Information-Set MCTS.
//!
//! One tree over the searcher's information set. Every iteration samples a
//! determinization of the root game and walks the tree in lock-step with it:
//!
//! 1. **Select**: while every move legal in the sampled game already has a
//!    child, descend to the legal child with the best availability-UCB1
//!    value (bumping the availability of every legal sibling).
//! 2. **Expand**: create the child for one random untried move.
//! 3. **Simulate**: play the sampled game out with the rollout policy.
//! 4. **Backpropagate**: credit each node with the reward of the seat that
//!    moved into it.
//!
//! The decision is the most visited root child.

use std::time::Instant;

use log::{debug, info};

use super::config::SearchConfig;
use super::node::NodeId;
use super::reward::RewardFn;
use super::selection::{self, AvailabilityUcb1, Candidate, SelectionPolicy};
use super::simulation::{RandomRollout, SimulationPolicy};
use super::stats::SearchStats;
use super::tree::SearchTree;
use super::{SearchAlgorithm, StopCondition};
use crate::core::{PlayerId, SearchRng};
use crate::error::{Error, Result};
use crate::rules::Game;

/// Root child summary for inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildSummary<M> {
    pub mv: M,
    pub visits: u32,
    pub wins: f64,
    pub avails: u32,
}

/// ISMCTS search context.
pub struct Ismcts<G: Game> {
    /// The searcher's view of the game.
    game: G,
    player: PlayerId,
    iterations: u32,
    exploration: f64,
    rng: SearchRng,
    reward: RewardFn,
    selection: Box<dyn SelectionPolicy>,
    simulation: Box<dyn SimulationPolicy<G>>,
    unify: bool,
    /// Tree to start from instead of a fresh root.
    initial_tree: Option<SearchTree<G>>,
    /// Tree of the last `select_move`.
    tree: Option<SearchTree<G>>,
    stop: Option<StopCondition>,
    stats: SearchStats,
}

impl<G: Game> Ismcts<G> {
    /// Create a search for `player` with random rollouts and the default
    /// reward.
    pub fn new(game: G, player: PlayerId, config: &SearchConfig) -> Self {
        Self {
            game,
            player,
            iterations: config.iterations,
            exploration: config.exploration_constant,
            rng: config.rng(),
            reward: RewardFn::default(),
            selection: Box::new(AvailabilityUcb1),
            simulation: Box::new(RandomRollout),
            unify: false,
            initial_tree: None,
            tree: None,
            stop: None,
            stats: SearchStats::default(),
        }
    }

    pub fn with_reward(mut self, reward: RewardFn) -> Self {
        self.reward = reward;
        self
    }

    /// Set a custom rollout policy.
    pub fn with_simulation(mut self, simulation: Box<dyn SimulationPolicy<G>>) -> Self {
        self.simulation = simulation;
        self
    }

    /// Set a custom selection policy.
    pub fn with_selection<S: SelectionPolicy + 'static>(mut self, selection: S) -> Self {
        self.selection = Box::new(selection);
        self
    }

    /// Share nodes reached through transpositions.
    pub fn with_unification(mut self, unify: bool) -> Self {
        self.unify = unify;
        self
    }

    /// Start from a tree carried over from an earlier search.
    pub fn with_initial_tree(mut self, tree: SearchTree<G>) -> Self {
        self.initial_tree = Some(tree);
        self
    }

    pub fn with_stop_condition(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Tree built by the last search.
    #[must_use]
    pub fn tree(&self) -> Option<&SearchTree<G>> {
        self.tree.as_ref()
    }

    /// Statistics of the root's expanded children.
    #[must_use]
    pub fn root_children(&self) -> Vec<ChildSummary<G::Move>> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let Some(slots) = tree.root_node().slots() else {
            return Vec::new();
        };
        slots
            .expanded()
            .map(|(mv, id)| {
                let child = tree.get(id);
                ChildSummary {
                    mv: mv.clone(),
                    visits: child.visits,
                    wins: child.wins,
                    avails: child.avails,
                }
            })
            .collect()
    }

    fn fresh_tree(&mut self) -> SearchTree<G> {
        match self.initial_tree.take() {
            Some(tree) => {
                self.stats.reused_visits = tree.root_node().visits;
                info!(
                    "subtree preservation reused {} visits ({} nodes)",
                    self.stats.reused_visits,
                    tree.len()
                );
                tree
            }
            None => SearchTree::new(self.game.clone(), self.player, self.unify),
        }
    }

    /// One determinize → select → expand → simulate → backpropagate pass.
    fn iterate(&mut self, tree: &mut SearchTree<G>) -> Result<()> {
        let mut live = self.game.clone();
        live.randomize(&mut self.rng)?;

        let mut node = tree.root();
        let untried = loop {
            if tree.is_terminal(node) {
                break Vec::new();
            }
            let untried = tree.untried_moves(node, &live)?;
            if !untried.is_empty() {
                break untried;
            }
            node = self.best_child(tree, node, &live)?;
            if let Some(mv) = &tree.get(node).mv {
                live.perform_move(mv)?;
            }
        };

        if let Some(mv) = self.rng.choose(&untried).cloned() {
            let slot = tree.slot_index(node, &mv)?;
            let mover = live.next_player();
            node = tree.create_child(node, slot, mover)?;
            live.perform_move(&mv)?;

            self.stats.nodes_created += 1;
            self.stats.max_depth = self.stats.max_depth.max(tree.get(node).depth);
        }

        self.simulation.simulate(tree, node, &mut live, &mut self.rng)?;
        self.stats.simulations += 1;

        let simulation = &mut self.simulation;
        tree.backpropagate(node, &live, self.reward, |tree, id, reward| {
            simulation.backpropagated(tree, id, reward);
        })
    }

    /// Best child among those whose move is legal in `live`.
    fn best_child(&mut self, tree: &mut SearchTree<G>, node: NodeId, live: &G) -> Result<NodeId> {
        let legal = live.possible_moves();
        let children: Vec<NodeId> = tree
            .child_slots(node)
            .expanded()
            .filter(|(mv, _)| legal.contains(mv))
            .map(|(_, id)| id)
            .collect();

        let candidates: Vec<Candidate> = children
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                let child = tree.get_mut(id);
                child.avails += 1;
                Candidate {
                    index,
                    wins: child.wins,
                    visits: child.visits,
                    avails: child.avails,
                }
            })
            .collect();

        let parent_visits = tree.get(node).visits;
        selection::choose(
            self.selection.as_ref(),
            &candidates,
            parent_visits,
            self.exploration,
            &mut self.rng,
        )
        .map(|index| children[index])
        .ok_or_else(|| Error::IncoherentDeterminization(format!("no legal child at {node}")))
    }

    /// Most visited root child whose move is legal now. Ties go to the
    /// first slot.
    fn most_visited(tree: &SearchTree<G>, legal: &[G::Move]) -> Option<G::Move> {
        let slots = tree.root_node().slots()?;
        let mut best: Option<(&G::Move, u32)> = None;
        for (mv, id) in slots.expanded() {
            if !legal.contains(mv) {
                continue;
            }
            let visits = tree.get(id).visits;
            if best.map_or(true, |(_, v)| visits > v) {
                best = Some((mv, visits));
            }
        }
        best.map(|(mv, _)| mv.clone())
    }
}

impl<G: Game> SearchAlgorithm<G> for Ismcts<G> {
    fn select_move(&mut self) -> Result<G::Move> {
        let start = Instant::now();
        self.stats.reset();

        let legal = self.game.possible_moves();
        let mut tree = self.fresh_tree();

        if legal.len() <= 1 {
            self.tree = Some(tree);
            return legal.into_iter().next().ok_or(Error::NoLegalMoves);
        }

        for _ in 0..self.iterations {
            if let Some(stop) = self.stop.as_mut() {
                if stop(&self.stats) {
                    break;
                }
            }
            self.iterate(&mut tree)?;
            self.stats.iterations += 1;
        }

        self.stats.unified_nodes = tree.stats().unified;
        self.stats.time_us = start.elapsed().as_micros() as u64;

        let choice = match Self::most_visited(&tree, &legal) {
            Some(mv) => mv,
            None => self.rng.choose(&legal).cloned().ok_or(Error::NoLegalMoves)?,
        };

        debug!(
            "ismcts: {} iterations, {} nodes, {} unified, {}us -> {:?}",
            self.stats.iterations,
            tree.len(),
            self.stats.unified_nodes,
            self.stats.time_us,
            choice
        );

        self.tree = Some(tree);
        Ok(choice)
    }

    fn stats(&self) -> &SearchStats {
        &self.stats
    }

    fn name(&self) -> &'static str {
        "ismcts"
    }

    fn into_tree(self: Box<Self>) -> Option<SearchTree<G>> {
        self.tree
    }
}
