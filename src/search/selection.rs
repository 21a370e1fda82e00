//! Tree policies choosing which child to descend into.
//!
//! - `Ucb1`: `w/n + C·sqrt(2·ln(N)/n)` with `N` the parent's visits (UCT).
//! - `AvailabilityUcb1`: `w/n + C·sqrt(ln(a)/n)` with `a` the child's own
//!   availability count (ISMCTS), since how often a move was selectable
//!   varies from one determinization to the next.
//!
//! With `C = 0` both reduce to the mean reward. Children with no visits are
//! never scored: [`choose`] returns one of them before evaluating anything.

use crate::core::SearchRng;

/// Statistics of one selectable child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Slot index (or any caller-side handle) returned on selection.
    pub index: usize,
    pub wins: f64,
    pub visits: u32,
    pub avails: u32,
}

/// Policy for scoring a visited child.
pub trait SelectionPolicy: Send + Sync {
    /// Selection value of a child with `visits > 0`.
    fn score(&self, child: &Candidate, parent_visits: u32, exploration: f64) -> f64;
}

/// UCB1 as used by plain and determinized UCT.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ucb1;

impl SelectionPolicy for Ucb1 {
    fn score(&self, child: &Candidate, parent_visits: u32, exploration: f64) -> f64 {
        let n = f64::from(child.visits);
        let mean = child.wins / n;
        if exploration == 0.0 {
            return mean;
        }
        let ln_parent = f64::from(parent_visits.max(1)).ln();
        mean + exploration * (2.0 * ln_parent / n).sqrt()
    }
}

/// UCB1 over availability counts, as used by ISMCTS.
#[derive(Clone, Copy, Debug, Default)]
pub struct AvailabilityUcb1;

impl SelectionPolicy for AvailabilityUcb1 {
    fn score(&self, child: &Candidate, _parent_visits: u32, exploration: f64) -> f64 {
        let n = f64::from(child.visits);
        let mean = child.wins / n;
        if exploration == 0.0 {
            return mean;
        }
        let ln_avails = f64::from(child.avails.max(1)).ln();
        mean + exploration * (ln_avails / n).sqrt()
    }
}

/// Pick the candidate with the highest selection value.
///
/// Candidates are shuffled first so ties break uniformly. Unvisited
/// candidates win outright. Returns the chosen candidate's `index`, or `None`
/// if there are no candidates.
pub fn choose(
    policy: &dyn SelectionPolicy,
    candidates: &[Candidate],
    parent_visits: u32,
    exploration: f64,
    rng: &mut SearchRng,
) -> Option<usize> {
    let mut shuffled = candidates.to_vec();
    rng.shuffle(&mut shuffled);

    if let Some(fresh) = shuffled.iter().find(|c| c.visits == 0) {
        return Some(fresh.index);
    }

    let mut best: Option<(usize, f64)> = None;
    for candidate in &shuffled {
        let value = policy.score(candidate, parent_visits, exploration);
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((candidate.index, value));
        }
    }
    best.map(|(index, _)| index)
}
