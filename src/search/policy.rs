//! Move-selection rules for statistics-driven rollouts.
//!
//! NAST and EPIC keep a reward average per candidate move; one of these
//! rules turns the averages into a choice. Every rule receives only reliable
//! arms (enough samples), so averages are always defined.

use serde::{Deserialize, Serialize};

use crate::core::SearchRng;
use crate::error::{Error, Result};

fn default_temperature() -> f64 {
    1.0
}

fn default_epsilon() -> f64 {
    0.2
}

fn default_exploration() -> f64 {
    std::f64::consts::FRAC_1_SQRT_2
}

/// Running reward statistics for one arm (n-gram or trick sequence).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    pub reward: f64,
    pub count: u32,
}

impl ArmStats {
    pub fn record(&mut self, reward: f64) {
        self.reward += reward;
        self.count += 1;
    }

    /// Mean reward, 0 when empty.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.reward / f64::from(self.count)
        }
    }
}

/// How a rollout picks among reliable candidate moves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum MoveSelection {
    /// Sample with probability ∝ `exp(avg / temperature)`.
    Gibbs {
        #[serde(default = "default_temperature")]
        temperature: f64,
    },
    /// Uniform with probability ε, otherwise the best average.
    EpsilonGreedy {
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
    /// Sample with probability ∝ average (negatives count as 0).
    Roulette,
    /// Treat candidates as bandit arms and take the best UCB1 value.
    Ucb1 {
        #[serde(default = "default_exploration")]
        exploration: f64,
    },
}

impl Default for MoveSelection {
    fn default() -> Self {
        MoveSelection::Gibbs {
            temperature: default_temperature(),
        }
    }
}

impl MoveSelection {
    /// Reject parameters the rule cannot work with.
    pub fn validate(&self) -> Result<()> {
        match *self {
            MoveSelection::Gibbs { temperature } if !(temperature > 0.0) => Err(
                Error::InvalidEnhancement(format!("gibbs temperature must be > 0, got {temperature}")),
            ),
            MoveSelection::EpsilonGreedy { epsilon } if !(0.0..=1.0).contains(&epsilon) => Err(
                Error::InvalidEnhancement(format!("epsilon must be in [0, 1], got {epsilon}")),
            ),
            MoveSelection::Ucb1 { exploration } if exploration < 0.0 => Err(
                Error::InvalidEnhancement(format!("exploration must be >= 0, got {exploration}")),
            ),
            _ => Ok(()),
        }
    }

    /// Index of the chosen arm. `arms` must not be empty.
    pub fn select(&self, arms: &[ArmStats], rng: &mut SearchRng) -> usize {
        if arms.len() <= 1 {
            return 0;
        }

        match *self {
            MoveSelection::Gibbs { temperature } => {
                // Shifted by the best average so `exp` cannot overflow.
                let top = arms.iter().map(ArmStats::average).fold(f64::NEG_INFINITY, f64::max);
                let weights: Vec<f64> = arms
                    .iter()
                    .map(|a| ((a.average() - top) / temperature).exp())
                    .collect();
                rng.choose_weighted(&weights)
                    .unwrap_or_else(|| rng.gen_range_usize(0..arms.len()))
            }
            MoveSelection::EpsilonGreedy { epsilon } => {
                if rng.gen_f64() < epsilon {
                    rng.gen_range_usize(0..arms.len())
                } else {
                    arg_max(arms.iter().map(ArmStats::average), rng)
                }
            }
            MoveSelection::Roulette => {
                let weights: Vec<f64> = arms.iter().map(|a| a.average().max(0.0)).collect();
                rng.choose_weighted(&weights)
                    .unwrap_or_else(|| rng.gen_range_usize(0..arms.len()))
            }
            MoveSelection::Ucb1 { exploration } => {
                let total: u32 = arms.iter().map(|a| a.count).sum();
                let ln_total = f64::from(total.max(1)).ln();
                arg_max(
                    arms.iter().map(|a| {
                        if a.count == 0 {
                            f64::INFINITY
                        } else {
                            a.average() + exploration * (ln_total / f64::from(a.count)).sqrt()
                        }
                    }),
                    rng,
                )
            }
        }
    }
}

/// Index of the largest value, ties broken uniformly.
fn arg_max(values: impl Iterator<Item = f64>, rng: &mut SearchRng) -> usize {
    let mut best = f64::NEG_INFINITY;
    let mut tied = Vec::new();
    for (i, value) in values.enumerate() {
        if value > best {
            best = value;
            tied.clear();
            tied.push(i);
        } else if value == best {
            tied.push(i);
        }
    }
    rng.choose(&tied).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(reward: f64, count: u32) -> ArmStats {
        ArmStats { reward, count }
    }

    fn histogram(rule: MoveSelection, arms: &[ArmStats], draws: usize) -> Vec<usize> {
        let mut rng = SearchRng::new(9);
        let mut counts = vec![0; arms.len()];
        for _ in 0..draws {
            counts[rule.select(arms, &mut rng)] += 1;
        }
        counts
    }

    #[test]
    fn test_arm_stats() {
        let mut stats = ArmStats::default();
        assert_eq!(stats.average(), 0.0);
        stats.record(1.0);
        stats.record(0.0);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average(), 0.5);
    }

    #[test]
    fn test_gibbs_favours_better_arm() {
        let arms = [arm(1.0, 10), arm(9.0, 10)];
        let counts = histogram(MoveSelection::Gibbs { temperature: 0.1 }, &arms, 500);
        assert!(counts[1] > counts[0] * 10);
    }

    #[test]
    fn test_gibbs_high_temperature_is_near_uniform() {
        let arms = [arm(1.0, 10), arm(9.0, 10)];
        let counts = histogram(MoveSelection::Gibbs { temperature: 1000.0 }, &arms, 2000);
        assert!(counts[0] > 800 && counts[1] > 800);
    }

    #[test]
    fn test_greedy_without_exploration_takes_best() {
        let arms = [arm(3.0, 10), arm(8.0, 10), arm(5.0, 10)];
        let counts = histogram(MoveSelection::EpsilonGreedy { epsilon: 0.0 }, &arms, 100);
        assert_eq!(counts, vec![0, 100, 0]);
    }

    #[test]
    fn test_epsilon_greedy_explores() {
        let arms = [arm(3.0, 10), arm(8.0, 10)];
        let counts = histogram(MoveSelection::EpsilonGreedy { epsilon: 1.0 }, &arms, 400);
        assert!(counts[0] > 100);
    }

    #[test]
    fn test_roulette_ignores_negative_and_falls_back() {
        let arms = [arm(-5.0, 10), arm(4.0, 10)];
        assert_eq!(histogram(MoveSelection::Roulette, &arms, 100), vec![0, 100]);

        let zero = [arm(0.0, 10), arm(0.0, 10)];
        let counts = histogram(MoveSelection::Roulette, &zero, 200);
        assert!(counts[0] > 0 && counts[1] > 0);
    }

    #[test]
    fn test_ucb1_rule_balances_counts() {
        let arms = [arm(9.0, 10), arm(0.5, 1)];
        // The rarely tried arm has the larger bonus.
        let counts = histogram(MoveSelection::Ucb1 { exploration: 2.0 }, &arms, 10);
        assert_eq!(counts, vec![0, 10]);

        let counts = histogram(MoveSelection::Ucb1 { exploration: 0.0 }, &arms, 10);
        assert_eq!(counts, vec![10, 0]);
    }

    #[test]
    fn test_validate() {
        assert!(MoveSelection::default().validate().is_ok());
        assert!(MoveSelection::Gibbs { temperature: 0.0 }.validate().is_err());
        assert!(MoveSelection::EpsilonGreedy { epsilon: 1.5 }.validate().is_err());
        assert!(MoveSelection::Ucb1 { exploration: -1.0 }.validate().is_err());
    }

    #[test]
    fn test_move_selection_serde() {
        let rule: MoveSelection = serde_json::from_str(r#"{"name":"epsilon-greedy"}"#).unwrap();
        assert_eq!(rule, MoveSelection::EpsilonGreedy { epsilon: 0.2 });

        let json = serde_json::to_string(&MoveSelection::Roulette).unwrap();
        assert_eq!(json, r#"{"name":"roulette"}"#);
    }
}
