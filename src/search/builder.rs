//! Enhancement composition.
//!
//! A [`SearchBuilder`] turns a game, a seat and a [`SearchConfig`] into a
//! ready `Box<dyn SearchAlgorithm<G>>`. Enhancements are applied in the order
//! they are listed and are fixed for the lifetime of the built search:
//!
//! - `reward` swaps the reward function. It has to come before any
//!   `simulation` enhancement, since rollout tables are built with the reward
//!   active at that point.
//! - `simulation` swaps the random rollout for NAST or EPIC.
//! - `node-expansion: unification` turns the tree into a DAG.
//! - `tree-reuse: subtree-preservation` seeds ISMCTS with the matching part
//!   of the previous turn's tree (see [`SearchBuilder::with_previous_search`]).
//! - `endgame: minimax` builds a [`Minimax`] instead once the game has at most
//!   `max_moves_left` moves to go.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::config::{Enhancement, RolloutKind, SearchConfig};
use super::ismcts::Ismcts;
use super::minimax::Minimax;
use super::random::RandomSearch;
use super::reward::RewardFn;
use super::simulation::{Epic, Nast, RandomRollout, SimulationPolicy};
use super::tree::SearchTree;
use super::uct::{DeterminizedUct, Uct};
use super::{SearchAlgorithm, StopCondition};
use crate::core::PlayerId;
use crate::error::{Error, Result};
use crate::rules::Game;

/// Which search to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Ismcts,
    Uct,
    DeterminizedUct,
    Minimax,
    Random,
}

/// Hooks resolved from the enhancement list.
struct Composition<G: Game> {
    reward: RewardFn,
    simulation: Box<dyn SimulationPolicy<G>>,
    unify: bool,
    preserve: bool,
    endgame: Option<usize>,
}

/// Assembles a configured search.
pub struct SearchBuilder<G: Game> {
    game: G,
    player: PlayerId,
    config: SearchConfig,
    previous: Option<(SearchTree<G>, Vec<G::Move>)>,
    stop: Option<StopCondition>,
}

impl<G: Game> SearchBuilder<G> {
    /// Search `game` (as seen by `player`) for `player`.
    pub fn new(game: G, player: PlayerId, config: SearchConfig) -> Self {
        Self {
            game,
            player,
            config,
            previous: None,
            stop: None,
        }
    }

    /// The tree of this seat's previous search and every real move played
    /// since it was rooted. Only used with subtree preservation.
    pub fn with_previous_search(mut self, tree: SearchTree<G>, moves: Vec<G::Move>) -> Self {
        self.previous = Some((tree, moves));
        self
    }

    pub fn with_stop_condition(mut self, stop: StopCondition) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Build the requested search, or minimax when the endgame switch fires.
    pub fn build(self, algorithm: Algorithm) -> Result<Box<dyn SearchAlgorithm<G>>> {
        let composition = self.compose(algorithm)?;

        if let Some(limit) = composition.endgame {
            let left = self.game.moves_left();
            if algorithm != Algorithm::Minimax && left <= limit {
                info!("{} moves left (limit {}), switching to minimax", left, limit);
                return Ok(Box::new(self.minimax()));
            }
        }

        Ok(match algorithm {
            Algorithm::Ismcts => Box::new(self.assemble_ismcts(composition)),
            Algorithm::Uct => {
                let config = self.config;
                let stop = self.stop;
                let uct = Uct::new(self.game, self.player, &config);
                Box::new(with_uct_hooks(uct, composition, stop))
            }
            Algorithm::DeterminizedUct => {
                let config = self.config;
                let stop = self.stop;
                let search = DeterminizedUct::new(self.game, self.player, &config)
                    .map_inner(|uct| with_uct_hooks(uct, composition, stop));
                Box::new(search)
            }
            Algorithm::Minimax => Box::new(self.minimax()),
            Algorithm::Random => Box::new(RandomSearch::new(self.game, &self.config)),
        })
    }

    /// Build ISMCTS as a concrete type, for callers that inspect its tree.
    /// The endgame switch does not apply here.
    pub fn build_ismcts(self) -> Result<Ismcts<G>> {
        let composition = self.compose(Algorithm::Ismcts)?;
        Ok(self.assemble_ismcts(composition))
    }

    fn compose(&self, algorithm: Algorithm) -> Result<Composition<G>> {
        let mut reward: Option<RewardFn> = None;
        let mut simulation: Option<Box<dyn SimulationPolicy<G>>> = None;
        let mut unify = false;
        let mut preserve = false;
        let mut endgame = None;

        for enhancement in &self.config.enhancements {
            match enhancement {
                Enhancement::Reward { name } => {
                    if reward.is_some() {
                        return Err(invalid("more than one reward enhancement"));
                    }
                    if simulation.is_some() {
                        return Err(invalid("the reward enhancement must precede the simulation enhancement"));
                    }
                    reward = Some(*name);
                }
                Enhancement::Simulation {
                    name,
                    n_gram_length,
                    min_count,
                    policy,
                } => {
                    if simulation.is_some() {
                        return Err(invalid("more than one simulation enhancement"));
                    }
                    policy.validate()?;
                    let reward = reward.unwrap_or_default();
                    let rollout: Box<dyn SimulationPolicy<G>> = match name {
                        RolloutKind::Nast => {
                            if *n_gram_length == 0 {
                                return Err(invalid("n_gram_length must be at least 1"));
                            }
                            Box::new(Nast::new(
                                self.game.player_count(),
                                *n_gram_length,
                                *min_count,
                                *policy,
                                reward,
                            ))
                        }
                        RolloutKind::Epic => Box::new(Epic::new(*min_count, *policy, reward)),
                    };
                    simulation = Some(rollout);
                }
                Enhancement::NodeExpansion { .. } => unify = true,
                Enhancement::TreeReuse { .. } => {
                    if algorithm != Algorithm::Ismcts {
                        return Err(invalid("subtree preservation is only supported by ismcts"));
                    }
                    preserve = true;
                }
                Enhancement::Endgame { max_moves_left, .. } => {
                    if endgame.is_some() {
                        return Err(invalid("more than one endgame enhancement"));
                    }
                    endgame = Some(*max_moves_left);
                }
            }
        }

        let simulation: Box<dyn SimulationPolicy<G>> = match simulation {
            Some(rollout) => rollout,
            None => Box::new(RandomRollout),
        };

        Ok(Composition {
            reward: reward.unwrap_or_default(),
            simulation,
            unify,
            preserve,
            endgame,
        })
    }

    fn assemble_ismcts(self, composition: Composition<G>) -> Ismcts<G> {
        let mut search = Ismcts::new(self.game.clone(), self.player, &self.config)
            .with_reward(composition.reward)
            .with_simulation(composition.simulation)
            .with_unification(composition.unify);

        if composition.preserve {
            if let Some((tree, moves)) = self.previous {
                match tree.detach_subtree(&moves, self.game, self.player) {
                    Some(subtree) => search = search.with_initial_tree(subtree),
                    None => debug!("no preserved subtree matches {} moves", moves.len()),
                }
            }
        }
        if let Some(stop) = self.stop {
            search = search.with_stop_condition(stop);
        }
        search
    }

    fn minimax(self) -> Minimax<G> {
        let search = Minimax::new(self.game, self.player, &self.config);
        match self.stop {
            Some(stop) => search.with_stop_condition(stop),
            None => search,
        }
    }
}

fn with_uct_hooks<G: Game>(uct: Uct<G>, composition: Composition<G>, stop: Option<StopCondition>) -> Uct<G> {
    let uct = uct
        .with_reward(composition.reward)
        .with_simulation(composition.simulation)
        .with_unification(composition.unify);
    match stop {
        Some(stop) => uct.with_stop_condition(stop),
        None => uct,
    }
}

fn invalid(reason: &str) -> Error {
    Error::InvalidEnhancement(reason.to_string())
}
