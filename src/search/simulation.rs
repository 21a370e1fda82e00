//! Rollout policies: how a game is played out from a freshly expanded node.
//!
//! ## Policies
//!
//! - [`RandomRollout`]: uniform random legal moves until the end.
//! - [`Nast`]: per-player statistics of move n-grams. Once the previous
//!   `n - 1` moves are known, candidates are compared by the average reward
//!   of the n-gram they would complete.
//! - [`Epic`]: statistics keyed by the cards already played in the current
//!   trick followed by the candidate, i.e. by trick position and context.
//!
//! Both statistical policies fall back to a uniform choice among candidates
//! whose arm has fewer than `min_count` samples, and otherwise defer to a
//! [`MoveSelection`] rule. Their tables learn from every rollout and from
//! every tree node updated during backpropagation.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::node::NodeId;
use super::policy::{ArmStats, MoveSelection};
use super::reward::{RewardCache, RewardFn};
use super::tree::SearchTree;
use crate::core::{PlayerId, PlayerMap, SearchRng};
use crate::error::Result;
use crate::rules::Game;

/// Key of a statistics table: a short run of moves.
pub type Sequence<M> = SmallVec<[M; 4]>;

/// Policy for playing a game out from a leaf.
pub trait SimulationPolicy<G: Game> {
    /// Play `game` until it is finished. `leaf` is the tree node the game
    /// is currently in step with.
    fn simulate(
        &mut self,
        tree: &SearchTree<G>,
        leaf: NodeId,
        game: &mut G,
        rng: &mut SearchRng,
    ) -> Result<()>;

    /// Called for every node updated during backpropagation, with the
    /// reward that node received.
    fn backpropagated(&mut self, _tree: &SearchTree<G>, _node: NodeId, _reward: f64) {}

    fn name(&self) -> &'static str;
}

// =============================================================================
// Random
// =============================================================================

/// Uniform random playout.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomRollout;

impl<G: Game> SimulationPolicy<G> for RandomRollout {
    fn simulate(
        &mut self,
        _tree: &SearchTree<G>,
        _leaf: NodeId,
        game: &mut G,
        rng: &mut SearchRng,
    ) -> Result<()> {
        loop {
            let moves = game.possible_moves();
            let Some(mv) = rng.choose(&moves).cloned() else {
                return Ok(());
            };
            game.perform_move(&mv)?;
        }
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

// =============================================================================
// NAST
// =============================================================================

/// N-gram-average sampling technique.
#[derive(Clone, Debug)]
pub struct Nast<G: Game> {
    n: usize,
    min_count: u32,
    rule: MoveSelection,
    reward: RewardFn,
    tables: PlayerMap<FxHashMap<Sequence<G::Move>, ArmStats>>,
}

impl<G: Game> Nast<G> {
    /// `n` is the n-gram length and must be at least 1.
    pub fn new(player_count: usize, n: usize, min_count: u32, rule: MoveSelection, reward: RewardFn) -> Self {
        Self {
            n: n.max(1),
            min_count,
            rule,
            reward,
            tables: PlayerMap::with_default(player_count),
        }
    }

    /// Statistics collected for n-grams ending in a move by `player`.
    #[must_use]
    pub fn table(&self, player: PlayerId) -> &FxHashMap<Sequence<G::Move>, ArmStats> {
        &self.tables[player]
    }
}

impl<G: Game> SimulationPolicy<G> for Nast<G> {
    fn simulate(
        &mut self,
        tree: &SearchTree<G>,
        leaf: NodeId,
        game: &mut G,
        rng: &mut SearchRng,
    ) -> Result<()> {
        let context = self.n - 1;
        let mut history = tree.recent_moves(leaf, context);
        let mut played = Vec::new();

        loop {
            let mut moves = game.possible_moves();
            if moves.is_empty() {
                break;
            }
            let player = game.next_player();
            let ready = history.len() == context;

            let pick = if ready {
                choose_from_table(&self.tables[player], &history, &moves, self.min_count, self.rule, rng)
            } else {
                rng.gen_range_usize(0..moves.len())
            };
            let mv = moves.swap_remove(pick);

            if ready {
                played.push((player, sequence(&history, &mv)));
            }
            history.push(mv.clone());
            if history.len() > context {
                history.remove(0);
            }
            game.perform_move(&mv)?;
        }

        let mut rewards = RewardCache::new(game.player_count());
        for (player, key) in played {
            let reward = rewards.get(self.reward, game, player)?;
            self.tables[player].entry(key).or_default().record(reward);
        }
        Ok(())
    }

    fn backpropagated(&mut self, tree: &SearchTree<G>, node: NodeId, reward: f64) {
        if let Some(moves) = tree.path_moves(node, self.n) {
            let player = tree.get(node).player;
            self.tables[player]
                .entry(moves.into_iter().collect())
                .or_default()
                .record(reward);
        }
    }

    fn name(&self) -> &'static str {
        "nast"
    }
}

// =============================================================================
// EPIC
// =============================================================================

/// Episode-context sampling: statistics keyed by the trick so far.
#[derive(Clone, Debug)]
pub struct Epic<G: Game> {
    min_count: u32,
    rule: MoveSelection,
    reward: RewardFn,
    table: FxHashMap<Sequence<G::Move>, ArmStats>,
}

impl<G: Game> Epic<G> {
    pub fn new(min_count: u32, rule: MoveSelection, reward: RewardFn) -> Self {
        Self {
            min_count,
            rule,
            reward,
            table: FxHashMap::default(),
        }
    }

    /// Statistics per trick sequence.
    #[must_use]
    pub fn table(&self) -> &FxHashMap<Sequence<G::Move>, ArmStats> {
        &self.table
    }
}

/// The trick a finished move belongs to: the one in progress, or the one it
/// just completed.
fn episode<G: Game>(game: &G) -> Option<Vec<G::Move>> {
    let current = game.current_trick();
    if current.is_empty() {
        game.last_trick()
    } else {
        Some(current)
    }
}

impl<G: Game> SimulationPolicy<G> for Epic<G> {
    fn simulate(
        &mut self,
        _tree: &SearchTree<G>,
        _leaf: NodeId,
        game: &mut G,
        rng: &mut SearchRng,
    ) -> Result<()> {
        let mut played = Vec::new();

        loop {
            let mut moves = game.possible_moves();
            if moves.is_empty() {
                break;
            }
            let player = game.next_player();
            let prefix = game.current_trick();

            let pick = choose_from_table(&self.table, &prefix, &moves, self.min_count, self.rule, rng);
            let mv = moves.swap_remove(pick);

            played.push((player, sequence(&prefix, &mv)));
            game.perform_move(&mv)?;
        }

        let mut rewards = RewardCache::new(game.player_count());
        for (player, key) in played {
            let reward = rewards.get(self.reward, game, player)?;
            self.table.entry(key).or_default().record(reward);
        }
        Ok(())
    }

    fn backpropagated(&mut self, tree: &SearchTree<G>, node: NodeId, reward: f64) {
        let node = tree.get(node);
        if node.mv.is_none() {
            return;
        }
        if let Some(trick) = episode(&node.game).filter(|t| !t.is_empty()) {
            self.table
                .entry(trick.into_iter().collect())
                .or_default()
                .record(reward);
        }
    }

    fn name(&self) -> &'static str {
        "epic"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn sequence<M: Clone>(prefix: &[M], mv: &M) -> Sequence<M> {
    let mut key: Sequence<M> = prefix.iter().cloned().collect();
    key.push(mv.clone());
    key
}

/// Pick a move index: uniformly among unreliable candidates if any, else by
/// `rule` over the candidates' statistics.
fn choose_from_table<M: Clone + Eq + Hash>(
    table: &FxHashMap<Sequence<M>, ArmStats>,
    prefix: &[M],
    moves: &[M],
    min_count: u32,
    rule: MoveSelection,
    rng: &mut SearchRng,
) -> usize {
    if moves.len() == 1 {
        return 0;
    }

    let arms: Vec<Option<ArmStats>> = moves
        .iter()
        .map(|mv| table.get(&sequence(prefix, mv)).copied())
        .collect();

    let unreliable: Vec<usize> = arms
        .iter()
        .enumerate()
        .filter(|(_, arm)| arm.map_or(true, |a| a.count < min_count))
        .map(|(i, _)| i)
        .collect();
    if let Some(&pick) = rng.choose(&unreliable) {
        return pick;
    }

    let arms: Vec<ArmStats> = arms.into_iter().flatten().collect();
    rule.select(&arms, rng)
}
