//! Reward functions: how a finished game pays each seat.
//!
//! All three are pure functions of `(finished game, player)`. A player counts
//! as a winner when they are in [`Game::winners`]; on a tie every seat is.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerMap};
use crate::error::{Error, Result};
use crate::rules::Game;

/// Mapping from a finished game to a scalar reward for one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewardFn {
    /// +1 win, -1 loss, 0 tie.
    WinOrLoss,
    /// +1 win, 0 loss, 0.5 tie. Never negative, which Gibbs rollouts rely on.
    #[default]
    PositiveWinOrLoss,
    /// Final score margin scaled into [0, 1] in steps of 0.1.
    ScoresDifference,
}

impl RewardFn {
    /// Reward of `player` in a finished game.
    ///
    /// Games that do not report a score margin are paid as
    /// [`RewardFn::PositiveWinOrLoss`] under `ScoresDifference`.
    pub fn reward<G: Game>(self, game: &G, player: PlayerId) -> Result<f64> {
        let winners = game.winners().ok_or(Error::NotTerminal)?;
        let is_winner = winners.contains(&player);
        let tie = game.is_tie();

        let positive = || match (is_winner, tie) {
            (true, true) => 0.5,
            (true, false) => 1.0,
            (false, _) => 0.0,
        };

        Ok(match self {
            RewardFn::WinOrLoss => match (is_winner, tie) {
                (true, true) => 0.0,
                (true, false) => 1.0,
                (false, _) => -1.0,
            },
            RewardFn::PositiveWinOrLoss => positive(),
            RewardFn::ScoresDifference => match game.score_margin(player) {
                Some((margin, max)) if max > 0 => {
                    let margin = margin.clamp(-max, max);
                    let scaled = f64::from(margin + max) / f64::from(2 * max);
                    (scaled * 10.0).round() / 10.0
                }
                _ => positive(),
            },
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            RewardFn::WinOrLoss => "win-or-loss",
            RewardFn::PositiveWinOrLoss => "positive-win-or-loss",
            RewardFn::ScoresDifference => "scores-difference",
        }
    }
}

/// Per-player reward memo for one backpropagation.
#[derive(Clone, Debug)]
pub struct RewardCache {
    rewards: PlayerMap<Option<f64>>,
}

impl RewardCache {
    pub fn new(player_count: usize) -> Self {
        Self {
            rewards: PlayerMap::with_value(player_count, None),
        }
    }

    /// Reward of `player`, computed on first request.
    pub fn get<G: Game>(&mut self, reward_fn: RewardFn, game: &G, player: PlayerId) -> Result<f64> {
        if let Some(reward) = self.rewards[player] {
            return Ok(reward);
        }
        let reward = reward_fn.reward(game, player)?;
        self.rewards[player] = Some(reward);
        Ok(reward)
    }
}
