//! Tiny fully visible games shared by the integration tests.

#![allow(dead_code)]

use trick_search::core::{PlayerId, SearchRng};
use trick_search::rules::{Game, GameResult};
use trick_search::{Error, Result};

/// One seat, one move, then it is over.
#[derive(Clone, Debug, Default)]
pub struct SingleMoveGame {
    played: bool,
}

impl Game for SingleMoveGame {
    type Move = u8;

    fn next_player(&self) -> PlayerId {
        PlayerId::new(0)
    }

    fn player_count(&self) -> usize {
        2
    }

    fn possible_moves(&self) -> Vec<u8> {
        if self.played {
            Vec::new()
        } else {
            vec![7]
        }
    }

    fn perform_move(&mut self, mv: &u8) -> Result<()> {
        if self.played || *mv != 7 {
            return Err(Error::IllegalMove(mv.to_string()));
        }
        self.played = true;
        Ok(())
    }

    fn result(&self) -> Option<GameResult> {
        self.played.then_some(GameResult::Winner(PlayerId::new(0)))
    }

    fn randomize(&mut self, _rng: &mut SearchRng) -> Result<()> {
        Ok(())
    }

    fn unique_state_hash(&self) -> u64 {
        u64::from(self.played)
    }

    fn game_value(&self, _perspective: PlayerId) -> f64 {
        0.0
    }

    fn moves_left(&self) -> usize {
        usize::from(!self.played)
    }
}

/// Seat 0 picks cell 0 or 1. Cell 0 wins for seat 0, cell 1 wins for
/// seat 1.
#[derive(Clone, Debug, Default)]
pub struct TwoCellGame {
    picked: Option<u8>,
}

impl Game for TwoCellGame {
    type Move = u8;

    fn next_player(&self) -> PlayerId {
        PlayerId::new(0)
    }

    fn player_count(&self) -> usize {
        2
    }

    fn possible_moves(&self) -> Vec<u8> {
        match self.picked {
            Some(_) => Vec::new(),
            None => vec![1, 0],
        }
    }

    fn perform_move(&mut self, mv: &u8) -> Result<()> {
        if self.picked.is_some() || *mv > 1 {
            return Err(Error::IllegalMove(mv.to_string()));
        }
        self.picked = Some(*mv);
        Ok(())
    }

    fn result(&self) -> Option<GameResult> {
        self.picked
            .map(|cell| GameResult::Winner(PlayerId::new(cell)))
    }

    fn randomize(&mut self, _rng: &mut SearchRng) -> Result<()> {
        Ok(())
    }

    fn unique_state_hash(&self) -> u64 {
        self.picked.map_or(0, |cell| u64::from(cell) + 1)
    }

    fn game_value(&self, perspective: PlayerId) -> f64 {
        match self.result() {
            Some(result) if result.is_winner(perspective) => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }

    fn moves_left(&self) -> usize {
        usize::from(self.picked.is_none())
    }
}

/// Play `n` random legal moves.
pub fn play_random<G: Game>(game: &mut G, n: usize, rng: &mut SearchRng) {
    for _ in 0..n {
        let moves = game.possible_moves();
        let Some(mv) = rng.choose(&moves).cloned() else {
            return;
        };
        game.perform_move(&mv).unwrap();
    }
}

/// Seat 0 picks move 0 or 1 without knowing which of `payoffs.len()` deals
/// it is in. `payoffs[deal][mv]` is seat 0's score.
#[derive(Clone, Debug)]
pub struct HiddenDealGame {
    payoffs: Vec<[f64; 2]>,
    deal: Option<usize>,
    picked: Option<u8>,
}

impl HiddenDealGame {
    pub fn new(payoffs: Vec<[f64; 2]>) -> Self {
        Self {
            payoffs,
            deal: None,
            picked: None,
        }
    }
}

impl Game for HiddenDealGame {
    type Move = u8;

    fn next_player(&self) -> PlayerId {
        PlayerId::new(0)
    }

    fn player_count(&self) -> usize {
        2
    }

    fn possible_moves(&self) -> Vec<u8> {
        match self.picked {
            Some(_) => Vec::new(),
            None => vec![0, 1],
        }
    }

    fn perform_move(&mut self, mv: &u8) -> Result<()> {
        if self.picked.is_some() || *mv > 1 {
            return Err(Error::IllegalMove(mv.to_string()));
        }
        self.picked = Some(*mv);
        Ok(())
    }

    fn result(&self) -> Option<GameResult> {
        self.picked.map(|_| {
            if self.game_value(PlayerId::new(0)) > 0.0 {
                GameResult::Winner(PlayerId::new(0))
            } else {
                GameResult::Winner(PlayerId::new(1))
            }
        })
    }

    fn randomize(&mut self, rng: &mut SearchRng) -> Result<()> {
        self.deal = Some(rng.gen_range_usize(0..self.payoffs.len()));
        Ok(())
    }

    fn unique_state_hash(&self) -> u64 {
        self.picked.map_or(0, |mv| u64::from(mv) + 1)
    }

    fn all_possible_states(&self) -> Vec<Self> {
        (0..self.payoffs.len())
            .map(|deal| Self {
                deal: Some(deal),
                ..self.clone()
            })
            .collect()
    }

    fn game_value(&self, perspective: PlayerId) -> f64 {
        let value = match (self.deal, self.picked) {
            (Some(deal), Some(mv)) => self.payoffs[deal][usize::from(mv)],
            _ => 0.0,
        };
        if perspective == PlayerId::new(0) {
            value
        } else {
            -value
        }
    }

    fn moves_left(&self) -> usize {
        usize::from(self.picked.is_none())
    }
}
