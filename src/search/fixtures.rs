//! Small games for unit tests.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::core::{PlayerId, SearchRng};
use crate::error::{Error, Result};
use crate::rules::{Game, GameResult};

/// Two players alternately take a number from a shared pool; the larger sum
/// wins. Positions depend only on who holds what, so different move orders
/// transpose.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PickGame {
    pool: Vec<u8>,
    taken: [Vec<u8>; 2],
    next: PlayerId,
}

impl PickGame {
    pub fn new(pool: &[u8]) -> Self {
        let mut pool = pool.to_vec();
        pool.sort_unstable();
        Self {
            pool,
            taken: [Vec::new(), Vec::new()],
            next: PlayerId::new(0),
        }
    }

    fn sum(&self, player: PlayerId) -> i32 {
        self.taken[player.index()].iter().map(|&n| i32::from(n)).sum()
    }
}

impl Game for PickGame {
    type Move = u8;

    fn next_player(&self) -> PlayerId {
        self.next
    }

    fn player_count(&self) -> usize {
        2
    }

    fn possible_moves(&self) -> Vec<u8> {
        self.pool.clone()
    }

    fn perform_move(&mut self, mv: &u8) -> Result<()> {
        let pos = self
            .pool
            .iter()
            .position(|n| n == mv)
            .ok_or_else(|| Error::IllegalMove(mv.to_string()))?;
        self.pool.remove(pos);
        let taken = &mut self.taken[self.next.index()];
        taken.push(*mv);
        taken.sort_unstable();
        self.next = self.next.next(2);
        Ok(())
    }

    fn result(&self) -> Option<GameResult> {
        if !self.pool.is_empty() {
            return None;
        }
        let (a, b) = (self.sum(PlayerId::new(0)), self.sum(PlayerId::new(1)));
        Some(match a.cmp(&b) {
            std::cmp::Ordering::Greater => GameResult::Winner(PlayerId::new(0)),
            std::cmp::Ordering::Less => GameResult::Winner(PlayerId::new(1)),
            std::cmp::Ordering::Equal => GameResult::Draw,
        })
    }

    fn randomize(&mut self, _rng: &mut SearchRng) -> Result<()> {
        Ok(())
    }

    fn unique_state_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn game_value(&self, perspective: PlayerId) -> f64 {
        let other = perspective.next(2);
        f64::from(self.sum(perspective) - self.sum(other))
    }

    fn moves_left(&self) -> usize {
        self.pool.len()
    }

    fn score_margin(&self, player: PlayerId) -> Option<(i32, i32)> {
        let total: i32 = self.taken.iter().flatten().map(|&n| i32::from(n)).sum();
        Some((self.sum(player) - self.sum(player.next(2)), total.max(1)))
    }
}
