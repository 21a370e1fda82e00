//! Search configuration parameters and enhancement records.

use serde::{Deserialize, Serialize};

use super::policy::MoveSelection;
use super::reward::RewardFn;
use crate::core::{SearchRng, SearchRngState};

/// Search configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Iterations per search (per determinization for determinized UCT).
    pub iterations: u32,

    /// Determinizations sampled by determinized UCT.
    pub determinizations: u32,

    /// Exploration constant `C` of the selection formulas (default 1/√2).
    pub exploration_constant: f64,

    /// Random seed. Same seed produces the same decision.
    pub seed: u64,

    /// Exact RNG position to resume from; overrides `seed` when present.
    pub rng_state: Option<SearchRngState>,

    /// Minimax depth limit in plies (`None` = solve to the end).
    pub minimax_depth: Option<u32>,

    /// Enhancements, applied in order when the search is built.
    pub enhancements: Vec<Enhancement>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            determinizations: 100,
            exploration_constant: std::f64::consts::FRAC_1_SQRT_2,
            seed: 42,
            rng_state: None,
            minimax_depth: None,
            enhancements: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_determinizations(mut self, determinizations: u32) -> Self {
        self.determinizations = determinizations;
        self
    }

    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Resume the RNG from a recorded position.
    pub fn with_rng_state(mut self, state: SearchRngState) -> Self {
        self.rng_state = Some(state);
        self
    }

    pub fn with_minimax_depth(mut self, depth: u32) -> Self {
        self.minimax_depth = Some(depth);
        self
    }

    /// Append an enhancement.
    pub fn with_enhancement(mut self, enhancement: Enhancement) -> Self {
        self.enhancements.push(enhancement);
        self
    }

    /// The RNG this configuration starts from.
    #[must_use]
    pub fn rng(&self) -> SearchRng {
        match &self.rng_state {
            Some(state) => SearchRng::from_state(state),
            None => SearchRng::new(self.seed),
        }
    }
}

fn default_n_gram_length() -> usize {
    2
}

fn default_min_count() -> u32 {
    7
}

fn default_max_moves_left() -> usize {
    13
}

/// Statistics-driven rollout flavours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RolloutKind {
    Nast,
    Epic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeExpansion {
    Unification,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeReuse {
    SubtreePreservation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndgameSolver {
    Minimax,
}

/// One `{type, name, options}` enhancement record.
///
/// ```
/// use trick_search::search::Enhancement;
///
/// let json = r#"[
///     {"type": "reward", "name": "win-or-loss"},
///     {"type": "simulation", "name": "nast", "policy": {"name": "roulette"}},
///     {"type": "endgame", "name": "minimax", "max_moves_left": 8}
/// ]"#;
/// let parsed: Vec<Enhancement> = serde_json::from_str(json).unwrap();
/// assert_eq!(parsed.len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Enhancement {
    /// Replace the reward function.
    Reward { name: RewardFn },

    /// Replace the random rollout with a statistics-driven one.
    Simulation {
        name: RolloutKind,
        #[serde(default = "default_n_gram_length")]
        n_gram_length: usize,
        #[serde(default = "default_min_count")]
        min_count: u32,
        #[serde(default)]
        policy: MoveSelection,
    },

    /// Share nodes reached by equal `(state, move)` pairs.
    NodeExpansion { name: NodeExpansion },

    /// Start from the previous search's matching subtree.
    TreeReuse { name: TreeReuse },

    /// Switch to an exact solver once few moves remain.
    Endgame {
        name: EndgameSolver,
        #[serde(default = "default_max_moves_left")]
        max_moves_left: usize,
    },
}

impl Enhancement {
    pub fn reward(reward: RewardFn) -> Self {
        Enhancement::Reward { name: reward }
    }

    /// NAST rollouts with default parameters.
    pub fn nast(policy: MoveSelection) -> Self {
        Enhancement::Simulation {
            name: RolloutKind::Nast,
            n_gram_length: default_n_gram_length(),
            min_count: default_min_count(),
            policy,
        }
    }

    /// EPIC rollouts with default parameters.
    pub fn epic(policy: MoveSelection) -> Self {
        Enhancement::Simulation {
            name: RolloutKind::Epic,
            n_gram_length: default_n_gram_length(),
            min_count: default_min_count(),
            policy,
        }
    }

    pub fn unification() -> Self {
        Enhancement::NodeExpansion {
            name: NodeExpansion::Unification,
        }
    }

    pub fn subtree_preservation() -> Self {
        Enhancement::TreeReuse {
            name: TreeReuse::SubtreePreservation,
        }
    }

    pub fn minimax_endgame(max_moves_left: usize) -> Self {
        Enhancement::Endgame {
            name: EndgameSolver::Minimax,
            max_moves_left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.determinizations, 100);
        assert!((config.exploration_constant - 0.7071).abs() < 0.001);
        assert_eq!(config.seed, 42);
        assert!(config.enhancements.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_iterations(50)
            .with_exploration(2.0)
            .with_seed(123)
            .with_minimax_depth(4)
            .with_enhancement(Enhancement::unification());

        assert_eq!(config.iterations, 50);
        assert_eq!(config.exploration_constant, 2.0);
        assert_eq!(config.seed, 123);
        assert_eq!(config.minimax_depth, Some(4));
        assert_eq!(config.enhancements, vec![Enhancement::unification()]);
    }

    #[test]
    fn test_rng_state_overrides_seed() {
        let mut rng = SearchRng::new(7);
        rng.gen_f64();
        let state = rng.state();
        let expected = rng.gen_range_usize(0..1_000_000);

        let config = SearchConfig::default().with_seed(99).with_rng_state(state);
        assert_eq!(config.rng().gen_range_usize(0..1_000_000), expected);
    }

    #[test]
    fn test_enhancement_json_shape() {
        let json = serde_json::to_value(Enhancement::minimax_endgame(13)).unwrap();
        assert_eq!(json["type"], "endgame");
        assert_eq!(json["name"], "minimax");
        assert_eq!(json["max_moves_left"], 13);

        let parsed: Enhancement =
            serde_json::from_str(r#"{"type":"simulation","name":"epic"}"#).unwrap();
        assert_eq!(parsed, Enhancement::epic(MoveSelection::default()));

        let parsed: Enhancement =
            serde_json::from_str(r#"{"type":"tree-reuse","name":"subtree-preservation"}"#).unwrap();
        assert_eq!(parsed, Enhancement::subtree_preservation());
    }

    #[test]
    fn test_serialization() {
        let config = SearchConfig::default()
            .with_enhancement(Enhancement::reward(RewardFn::ScoresDifference))
            .with_enhancement(Enhancement::nast(MoveSelection::Ucb1 { exploration: 0.5 }));
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);

        let partial: SearchConfig = serde_json::from_str(r#"{"iterations": 10}"#).unwrap();
        assert_eq!(partial.iterations, 10);
        assert_eq!(partial.seed, 42);
    }
}
