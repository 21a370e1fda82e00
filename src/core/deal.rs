//! Determinization: filling hidden hand slots with a consistent deal.
//!
//! Given every hand as seen by one observer, the set of cards nobody can see
//! yet, and the suits each player is known to be void in, [`deal_hidden`]
//! produces one concrete deal such that
//!
//! - every hand keeps its size,
//! - the newly placed cards are exactly the unseen cards,
//! - no player receives a card of a suit they are known not to hold.
//!
//! Without restrictions the unseen cards are shuffled and dealt by need.
//! With restrictions the deal is built one card at a time: a card only one
//! player can take goes to that player, otherwise the player with the least
//! slack (feasible cards minus open slots) takes a random feasible card. Each
//! choice is checked against Hall's condition on the remaining cards, so the
//! construction never paints itself into a corner and never restarts. If the
//! condition fails up front the observed state itself is inconsistent and a
//! [`DealError`] is returned.

use thiserror::Error;

use super::card::{Card, CardSlot, Suit, SuitSet};
use super::rng::SearchRng;

/// Why a deal could not be produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DealError {
    #[error("{unseen} unseen cards cannot fill {hidden} hidden slots")]
    CountMismatch { unseen: usize, hidden: usize },

    #[error("no deal satisfies the known-absent suits")]
    Infeasible,
}

/// Replace every `Hidden` slot in `hands` with one of the `unseen` cards.
///
/// `absent[p]` lists the suits seat `p` cannot hold. `hands` and `absent`
/// are indexed by seat.
pub fn deal_hidden(
    hands: &mut [Vec<CardSlot>],
    unseen: &[Card],
    absent: &[SuitSet],
    rng: &mut SearchRng,
) -> Result<(), DealError> {
    debug_assert_eq!(hands.len(), absent.len());

    let needs: Vec<usize> = hands
        .iter()
        .map(|hand| hand.iter().filter(|slot| slot.is_hidden()).count())
        .collect();
    let hidden: usize = needs.iter().sum();

    if hidden != unseen.len() {
        return Err(DealError::CountMismatch {
            unseen: unseen.len(),
            hidden,
        });
    }
    if hidden == 0 {
        return Ok(());
    }

    let restricted = needs
        .iter()
        .zip(absent)
        .any(|(&need, suits)| need > 0 && !suits.is_empty());

    let assigned = if restricted {
        assign_constrained(&needs, unseen, absent, rng)?
    } else {
        assign_shuffled(&needs, unseen, rng)
    };

    for (hand, cards) in hands.iter_mut().zip(assigned) {
        let mut cards = cards.into_iter();
        for slot in hand.iter_mut().filter(|slot| slot.is_hidden()) {
            if let Some(card) = cards.next() {
                *slot = CardSlot::Known(card);
            }
        }
    }

    Ok(())
}

fn assign_shuffled(needs: &[usize], unseen: &[Card], rng: &mut SearchRng) -> Vec<Vec<Card>> {
    let mut deck = unseen.to_vec();
    rng.shuffle(&mut deck);

    let mut rest = deck.as_slice();
    needs
        .iter()
        .map(|&need| {
            let (taken, tail) = rest.split_at(need);
            rest = tail;
            taken.to_vec()
        })
        .collect()
}

fn assign_constrained(
    needs: &[usize],
    unseen: &[Card],
    absent: &[SuitSet],
    rng: &mut SearchRng,
) -> Result<Vec<Vec<Card>>, DealError> {
    let mut needs = needs.to_vec();
    let mut pool = unseen.to_vec();
    let mut suit_counts = [0usize; 4];
    for card in &pool {
        suit_counts[card.suit.index()] += 1;
    }

    if !hall_holds(&needs, absent, &suit_counts) {
        return Err(DealError::Infeasible);
    }

    let mut assigned = vec![Vec::new(); needs.len()];

    while !pool.is_empty() {
        let takes = |player: usize, card: &Card| needs[player] > 0 && !absent[player].contains(card.suit);

        let mut forced = Vec::new();
        for (index, card) in pool.iter().enumerate() {
            let mut owners = (0..needs.len()).filter(|&p| takes(p, card));
            match (owners.next(), owners.next()) {
                (None, _) => return Err(DealError::Infeasible),
                (Some(only), None) => forced.push((index, only)),
                _ => {}
            }
        }

        let (card_index, player) = match rng.choose(&forced) {
            Some(&pick) => pick,
            None => {
                let open: Vec<usize> = (0..needs.len()).filter(|&p| needs[p] > 0).collect();
                let slack = |p: usize| {
                    pool.iter().filter(|card| takes(p, card)).count().saturating_sub(needs[p])
                };
                let least = open.iter().map(|&p| slack(p)).min().ok_or(DealError::Infeasible)?;
                let tied: Vec<usize> = open.iter().copied().filter(|&p| slack(p) == least).collect();
                let player = *rng.choose(&tied).ok_or(DealError::Infeasible)?;

                let mut candidates: Vec<usize> = (0..pool.len())
                    .filter(|&i| takes(player, &pool[i]))
                    .collect();
                rng.shuffle(&mut candidates);

                let card_index = candidates
                    .into_iter()
                    .find(|&i| fits_after(&needs, absent, &suit_counts, player, pool[i].suit))
                    .ok_or(DealError::Infeasible)?;
                (card_index, player)
            }
        };

        let card = pool.swap_remove(card_index);
        suit_counts[card.suit.index()] -= 1;
        needs[player] -= 1;
        assigned[player].push(card);
    }

    for cards in &mut assigned {
        rng.shuffle(cards);
    }

    Ok(assigned)
}

/// Hall's condition after tentatively giving one card of `suit` to `player`.
fn fits_after(
    needs: &[usize],
    absent: &[SuitSet],
    suit_counts: &[usize; 4],
    player: usize,
    suit: Suit,
) -> bool {
    let mut needs = needs.to_vec();
    let mut counts = *suit_counts;
    needs[player] -= 1;
    counts[suit.index()] -= 1;
    hall_holds(&needs, absent, &counts)
}

/// Every group of players with open slots can be served by the cards whose
/// suits at least one of them may hold.
fn hall_holds(needs: &[usize], absent: &[SuitSet], suit_counts: &[usize; 4]) -> bool {
    let open: Vec<usize> = (0..needs.len()).filter(|&p| needs[p] > 0).collect();

    for mask in 1u32..(1u32 << open.len()) {
        let mut demand = 0;
        let mut reachable = SuitSet::EMPTY;
        for (bit, &player) in open.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                demand += needs[player];
                for suit in Suit::ALL {
                    if !absent[player].contains(suit) {
                        reachable.insert(suit);
                    }
                }
            }
        }
        let supply: usize = reachable.iter().map(|suit| suit_counts[suit.index()]).sum();
        if demand > supply {
            return false;
        }
    }

    true
}
