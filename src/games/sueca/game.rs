//! Sueca rules and information-set views.

use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::Serialize;

use crate::core::{deal_hidden, Card, CardSlot, PlayerId, PlayerMap, Rank, SearchRng, Suit, SuitSet};
use crate::error::{Error, Result};
use crate::rules::{Game, GameResult};

const PLAYERS: usize = 4;
const HAND_SIZE: usize = 10;

/// Ranks in play, strongest first.
const RANKS: [Rank; 10] = [
    Rank::Ace,
    Rank::Seven,
    Rank::King,
    Rank::Jack,
    Rank::Queen,
    Rank::Six,
    Rank::Five,
    Rank::Four,
    Rank::Three,
    Rank::Two,
];

/// The 40-card Sueca deck, suit by suit, strongest rank first.
#[must_use]
pub fn deck() -> Vec<Card> {
    Suit::ALL
        .into_iter()
        .flat_map(|suit| RANKS.into_iter().map(move |rank| Card::new(rank, suit)))
        .collect()
}

/// Points a card is worth to the team that takes it.
#[must_use]
pub const fn card_points(card: Card) -> u32 {
    match card.rank {
        Rank::Ace => 11,
        Rank::Seven => 10,
        Rank::King => 4,
        Rank::Jack => 3,
        Rank::Queen => 2,
        _ => 0,
    }
}

/// Trick-taking strength within a suit.
fn strength(rank: Rank) -> usize {
    RANKS.len() - RANKS.iter().position(|&r| r == rank).unwrap_or(RANKS.len())
}

fn bit(card: Card) -> u64 {
    1 << (card.suit.index() * 13 + card.rank as usize)
}

fn mask(cards: impl IntoIterator<Item = Card>) -> u64 {
    cards.into_iter().fold(0, |m, c| m | bit(c))
}

/// A Sueca match, fully visible or as seen from one seat.
#[derive(Clone, Debug)]
pub struct Sueca {
    hands: PlayerMap<Vec<CardSlot>>,
    trump: Suit,
    /// The face-up trump card while it is still in the dealer's hand.
    trump_card: Option<Card>,
    dealer: PlayerId,
    next: PlayerId,
    /// Cards on the table, in play order.
    trick: Vec<(PlayerId, Card)>,
    last_trick: Option<Vec<(PlayerId, Card)>>,
    won: PlayerMap<im::Vector<Card>>,
    /// Suits each seat has shown it does not hold.
    absent: PlayerMap<SuitSet>,
    /// Cards that belong to nobody (positions built from partial hands).
    out_of_play: Vec<Card>,
}

/// Order-independent form of a state, digested by `unique_state_hash`.
#[derive(Serialize)]
struct Canonical<'a> {
    hands: Vec<Vec<CardSlot>>,
    trump: Suit,
    trump_card: Option<Card>,
    next: PlayerId,
    trick: &'a [(PlayerId, Card)],
    last_trick: Option<&'a [(PlayerId, Card)]>,
    won: Vec<Vec<Card>>,
    absent: Vec<u8>,
}

impl Sueca {
    /// Shuffle and deal a full game. The dealer is drawn from the same seed.
    #[must_use]
    pub fn deal(seed: u64) -> Self {
        Self::endgame(HAND_SIZE, seed)
    }

    /// A game that starts with `cards_per_player` cards in each hand. The
    /// cards that were not dealt count as already won, spread round-robin
    /// over the seats.
    ///
    /// # Panics
    ///
    /// If `cards_per_player` is not in `1..=10`.
    #[must_use]
    pub fn endgame(cards_per_player: usize, seed: u64) -> Self {
        assert!(
            (1..=HAND_SIZE).contains(&cards_per_player),
            "Hands hold 1 to 10 cards"
        );

        let mut rng = SearchRng::new(seed);
        let dealer = PlayerId::new(rng.gen_range_usize(0..PLAYERS) as u8);
        let mut cards = deck();
        rng.shuffle(&mut cards);

        let (dealt, discarded) = cards.split_at(cards_per_player * PLAYERS);
        let hands: Vec<Vec<CardSlot>> = dealt
            .chunks(cards_per_player)
            .map(|hand| hand.iter().copied().map(CardSlot::from).collect())
            .collect();

        let mut won: PlayerMap<im::Vector<Card>> = PlayerMap::with_default(PLAYERS);
        for (i, &card) in discarded.iter().enumerate() {
            won.as_mut_slice()[i % PLAYERS].push_back(card);
        }

        let trump_card = dealt[(dealer.index() + 1) * cards_per_player - 1];

        Self {
            hands: PlayerMap::from_vec(hands),
            trump: trump_card.suit,
            trump_card: Some(trump_card),
            dealer,
            next: dealer.next(PLAYERS),
            trick: Vec::new(),
            last_trick: None,
            won,
            absent: PlayerMap::with_default(PLAYERS),
            out_of_play: Vec::new(),
        }
    }

    /// A fully visible position from explicit hands, `first` to lead. Cards
    /// not in any hand are out of play and score for nobody.
    ///
    /// # Panics
    ///
    /// Unless there are four hands of equal size.
    #[must_use]
    pub fn from_hands(hands: Vec<Vec<Card>>, trump: Suit, first: PlayerId) -> Self {
        assert_eq!(hands.len(), PLAYERS, "Sueca has 4 seats");
        assert!(
            hands.iter().all(|h| h.len() == hands[0].len()),
            "Hands must have equal size"
        );

        let in_hand = mask(hands.iter().flatten().copied());
        let out_of_play = deck().into_iter().filter(|&c| in_hand & bit(c) == 0).collect();

        Self {
            hands: PlayerMap::from_vec(
                hands
                    .into_iter()
                    .map(|hand| hand.into_iter().map(CardSlot::from).collect())
                    .collect(),
            ),
            trump,
            trump_card: None,
            dealer: PlayerId::new(((first.index() + PLAYERS - 1) % PLAYERS) as u8),
            next: first,
            trick: Vec::new(),
            last_trick: None,
            won: PlayerMap::with_default(PLAYERS),
            absent: PlayerMap::with_default(PLAYERS),
            out_of_play,
        }
    }

    /// This state as `observer` sees it: other hands are hidden, except for
    /// the face-up trump card.
    #[must_use]
    pub fn observed_by(&self, observer: PlayerId) -> Self {
        let mut view = self.clone();
        for (seat, hand) in view.hands.as_mut_slice().iter_mut().enumerate() {
            if seat == observer.index() {
                continue;
            }
            for slot in hand.iter_mut() {
                if slot.card() != self.trump_card {
                    *slot = CardSlot::Hidden;
                }
            }
        }
        view
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[CardSlot] {
        &self.hands[player]
    }

    #[must_use]
    pub fn trump(&self) -> Suit {
        self.trump
    }

    #[must_use]
    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    #[must_use]
    pub fn dealer(&self) -> PlayerId {
        self.dealer
    }

    #[must_use]
    pub fn won_cards(&self, player: PlayerId) -> &im::Vector<Card> {
        &self.won[player]
    }

    /// Suits `player` has shown not to hold.
    #[must_use]
    pub fn absent_suits(&self, player: PlayerId) -> SuitSet {
        self.absent[player]
    }

    /// Points taken so far by `player`'s team.
    #[must_use]
    pub fn team_points(&self, player: PlayerId) -> u32 {
        let team = player.index() % 2;
        self.won
            .iter()
            .filter(|(p, _)| p.index() % 2 == team)
            .flat_map(|(_, cards)| cards.iter())
            .map(|&c| card_points(c))
            .sum()
    }

    /// Points still to be won or already taken (everything not out of play).
    fn points_in_play(&self) -> u32 {
        120 - self.out_of_play.iter().map(|&c| card_points(c)).sum::<u32>()
    }

    /// Cards nobody can see from this state: not in a visible hand slot, not
    /// won, not on the table and not out of play.
    #[must_use]
    pub fn unseen_cards(&self) -> Vec<Card> {
        let seen = mask(self.hands.values().flatten().filter_map(|s| s.card()))
            | mask(self.won.values().flatten().copied())
            | mask(self.trick.iter().map(|&(_, c)| c))
            | mask(self.out_of_play.iter().copied());
        deck().into_iter().filter(|&c| seen & bit(c) == 0).collect()
    }

    fn led_suit(&self) -> Option<Suit> {
        self.trick.first().map(|(_, c)| c.suit)
    }

    /// Seat holding the best card of the (complete) trick.
    fn trick_winner(&self) -> Option<PlayerId> {
        let led = self.led_suit()?;
        self.trick
            .iter()
            .max_by_key(|(_, c)| (c.suit == self.trump, c.suit == led, strength(c.rank)))
            .map(|&(p, _)| p)
    }

    fn finished(&self) -> bool {
        self.trick.is_empty() && self.hands.values().all(Vec::is_empty)
    }
}

impl Game for Sueca {
    type Move = Card;

    fn next_player(&self) -> PlayerId {
        self.next
    }

    fn player_count(&self) -> usize {
        PLAYERS
    }

    /// For a hand with hidden cards: every unseen card of a suit the player
    /// may still hold, plus the visible ones.
    fn possible_moves(&self) -> Vec<Card> {
        let hand = &self.hands[self.next];

        if hand.iter().any(|s| s.is_hidden()) {
            let absent = self.absent[self.next];
            let mut moves: Vec<Card> = self
                .unseen_cards()
                .into_iter()
                .filter(|c| !absent.contains(c.suit))
                .collect();
            moves.extend(hand.iter().filter_map(|s| s.card()));
            return moves;
        }

        let cards: Vec<Card> = hand.iter().filter_map(|s| s.card()).collect();
        match self.led_suit() {
            Some(led) if cards.iter().any(|c| c.suit == led) => {
                cards.into_iter().filter(|c| c.suit == led).collect()
            }
            _ => cards,
        }
    }

    fn perform_move(&mut self, card: &Card) -> Result<()> {
        let card = *card;
        if !self.possible_moves().contains(&card) {
            return Err(Error::IllegalMove(card.to_string()));
        }

        let player = self.next;
        let hand = self.hands.get_mut(player);
        let slot = hand
            .iter()
            .position(|s| s.card() == Some(card))
            .or_else(|| hand.iter().position(|s| s.is_hidden()))
            .ok_or_else(|| Error::IllegalMove(card.to_string()))?;
        hand.remove(slot);

        if let Some(led) = self.led_suit() {
            if card.suit != led {
                self.absent[player].insert(led);
            }
        }
        if self.trump_card == Some(card) {
            self.trump_card = None;
        }
        self.trick.push((player, card));

        if self.trick.len() < PLAYERS {
            self.next = player.next(PLAYERS);
            return Ok(());
        }

        let winner = self.trick_winner().unwrap_or(player);
        let trick = std::mem::take(&mut self.trick);
        self.won[winner].extend(trick.iter().map(|&(_, c)| c));
        self.last_trick = Some(trick);
        self.next = winner;
        Ok(())
    }

    fn result(&self) -> Option<GameResult> {
        if !self.finished() {
            return None;
        }
        let ours = self.team_points(PlayerId::new(0));
        let theirs = self.team_points(PlayerId::new(1));
        let team = |first: u8| GameResult::Winners(vec![PlayerId::new(first), PlayerId::new(first + 2)]);
        Some(match ours.cmp(&theirs) {
            std::cmp::Ordering::Greater => team(0),
            std::cmp::Ordering::Less => team(1),
            std::cmp::Ordering::Equal => GameResult::Draw,
        })
    }

    fn randomize(&mut self, rng: &mut SearchRng) -> Result<()> {
        let unseen = self.unseen_cards();
        deal_hidden(self.hands.as_mut_slice(), &unseen, self.absent.as_slice(), rng)?;
        Ok(())
    }

    fn unique_state_hash(&self) -> u64 {
        let sorted_hand = |hand: &Vec<CardSlot>| {
            let mut hand = hand.clone();
            hand.sort_unstable();
            hand
        };
        let canonical = Canonical {
            hands: self.hands.values().map(sorted_hand).collect(),
            trump: self.trump,
            trump_card: self.trump_card,
            next: self.next,
            trick: &self.trick,
            last_trick: self.last_trick.as_deref(),
            won: self
                .won
                .values()
                .map(|pile| {
                    let mut pile: Vec<Card> = pile.iter().copied().collect();
                    pile.sort_unstable();
                    pile
                })
                .collect(),
            absent: self.absent.values().map(|s| s.bits()).collect(),
        };

        let bytes = bincode::serialize(&canonical).expect("Sueca state must serialize");
        let mut hasher = FxHasher::default();
        hasher.write(&bytes);
        hasher.finish()
    }

    /// Every way of filling the hidden slots with the unseen cards that
    /// respects the known-absent suits, in a fixed order.
    fn all_possible_states(&self) -> Vec<Self> {
        let mut hands = self.hands.as_slice().to_vec();
        let mut states = Vec::new();
        self.fill_hidden(0, &self.unseen_cards(), &mut hands, &mut states);
        states
    }

    fn game_value(&self, perspective: PlayerId) -> f64 {
        let ours = f64::from(self.team_points(perspective));
        let theirs = f64::from(self.team_points(perspective.next(PLAYERS)));
        let bonus = match self.result() {
            Some(GameResult::Winners(team)) if team.contains(&perspective) => 1000.0,
            Some(GameResult::Winners(_)) => -1000.0,
            _ => 0.0,
        };
        ours - theirs + bonus
    }

    fn team(&self, player: PlayerId) -> usize {
        player.index() % 2
    }

    fn moves_left(&self) -> usize {
        self.hands.values().map(Vec::len).sum()
    }

    fn score_margin(&self, player: PlayerId) -> Option<(i32, i32)> {
        let ours = self.team_points(player) as i32;
        let theirs = self.team_points(player.next(PLAYERS)) as i32;
        Some((ours - theirs, (self.points_in_play() as i32).max(1)))
    }

    fn current_trick(&self) -> Vec<Card> {
        self.trick.iter().map(|&(_, c)| c).collect()
    }

    fn last_trick(&self) -> Option<Vec<Card>> {
        self.last_trick
            .as_ref()
            .map(|trick| trick.iter().map(|&(_, c)| c).collect())
    }
}

impl Sueca {
    fn fill_hidden(&self, seat: usize, pool: &[Card], hands: &mut Vec<Vec<CardSlot>>, out: &mut Vec<Self>) {
        if seat == hands.len() {
            if pool.is_empty() {
                let mut state = self.clone();
                state.hands = PlayerMap::from_vec(hands.clone());
                out.push(state);
            }
            return;
        }

        let hidden = hands[seat].iter().filter(|s| s.is_hidden()).count();
        if hidden == 0 {
            self.fill_hidden(seat + 1, pool, hands, out);
            return;
        }

        let absent = self.absent.as_slice()[seat];
        let allowed: Vec<Card> = pool.iter().copied().filter(|c| !absent.contains(c.suit)).collect();

        for combo in combinations(&allowed, hidden) {
            let original = hands[seat].clone();
            let mut cards = combo.iter().copied();
            for slot in hands[seat].iter_mut().filter(|s| s.is_hidden()) {
                if let Some(card) = cards.next() {
                    *slot = CardSlot::Known(card);
                }
            }

            let taken = mask(combo.iter().copied());
            let rest: Vec<Card> = pool.iter().copied().filter(|&c| taken & bit(c) == 0).collect();
            self.fill_hidden(seat + 1, &rest, hands, out);
            hands[seat] = original;
        }
    }
}

/// All `k`-element subsets of `items`, in lexicographic index order.
fn combinations(items: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out: Vec<Vec<Card>> = combinations(&items[1..], k - 1)
        .into_iter()
        .map(|mut rest| {
            rest.insert(0, items[0]);
            rest
        })
        .collect();
    out.extend(combinations(&items[1..], k));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn p(seat: u8) -> PlayerId {
        PlayerId::new(seat)
    }

    fn known(hand: &[CardSlot]) -> Vec<Card> {
        hand.iter().filter_map(|s| s.card()).collect()
    }

    /// Two cards each, spades trump, seat 0 leads.
    fn two_card_position() -> Sueca {
        Sueca::from_hands(
            vec![
                vec![c(Rank::Ace, Suit::Hearts), c(Rank::Two, Suit::Spades)],
                vec![c(Rank::King, Suit::Hearts), c(Rank::Seven, Suit::Clubs)],
                vec![c(Rank::Three, Suit::Diamonds), c(Rank::Queen, Suit::Hearts)],
                vec![c(Rank::Seven, Suit::Hearts), c(Rank::Jack, Suit::Spades)],
            ],
            Suit::Spades,
            p(0),
        )
    }

    #[test]
    fn test_deal_shape() {
        let game = Sueca::deal(11);
        let mut all: Vec<Card> = PlayerId::all(4).flat_map(|s| known(game.hand(s))).collect();
        assert!(PlayerId::all(4).all(|s| game.hand(s).len() == 10));

        all.sort();
        let mut expected = deck();
        expected.sort();
        assert_eq!(all, expected);

        let trump_card = game.trump_card().unwrap();
        assert_eq!(game.hand(game.dealer()).last().and_then(|s| s.card()), Some(trump_card));
        assert_eq!(game.trump(), trump_card.suit);
        assert_eq!(game.next_player(), game.dealer().next(4));
        assert_eq!(game.moves_left(), 40);
    }

    #[test]
    fn test_endgame_credits_undealt_cards() {
        let game = Sueca::endgame(3, 5);
        assert_eq!(game.moves_left(), 12);
        let won: usize = PlayerId::all(4).map(|s| game.won_cards(s).len()).sum();
        assert_eq!(won, 28);
        let in_hands: u32 = PlayerId::all(4)
            .flat_map(|s| known(game.hand(s)))
            .map(card_points)
            .sum();
        assert_eq!(game.team_points(p(0)) + game.team_points(p(1)) + in_hands, 120);
        assert!(game.unseen_cards().is_empty());
    }

    #[test]
    fn test_must_follow_suit() {
        let mut game = two_card_position();
        game.perform_move(&c(Rank::Ace, Suit::Hearts)).unwrap();

        assert_eq!(game.possible_moves(), vec![c(Rank::King, Suit::Hearts)]);
        assert!(matches!(
            game.perform_move(&c(Rank::Seven, Suit::Clubs)),
            Err(Error::IllegalMove(_))
        ));
    }

    #[test]
    fn test_led_suit_highest_takes_trick() {
        let mut game = two_card_position();
        for card in [
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Seven, Suit::Hearts),
        ] {
            game.perform_move(&card).unwrap();
        }

        assert_eq!(game.next_player(), p(0));
        assert_eq!(game.team_points(p(0)), 11 + 4 + 2 + 10);
        assert_eq!(game.team_points(p(1)), 0);
        assert!(game.current_trick().is_empty());
        assert_eq!(game.last_trick().map(|t| t.len()), Some(4));
    }

    #[test]
    fn test_trump_beats_led_suit_and_records_absent_suit() {
        let mut game = Sueca::from_hands(
            vec![
                vec![c(Rank::Ace, Suit::Hearts)],
                vec![c(Rank::Two, Suit::Spades)],
                vec![c(Rank::Queen, Suit::Hearts)],
                vec![c(Rank::Seven, Suit::Clubs)],
            ],
            Suit::Spades,
            p(0),
        );
        for card in [
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Two, Suit::Spades),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Seven, Suit::Clubs),
        ] {
            game.perform_move(&card).unwrap();
        }

        assert!(game.absent_suits(p(1)).contains(Suit::Hearts));
        assert!(game.absent_suits(p(3)).contains(Suit::Hearts));
        assert!(game.absent_suits(p(2)).is_empty());
        assert_eq!(game.team_points(p(1)), 11 + 2 + 10);
        assert_eq!(game.result(), Some(GameResult::Winners(vec![p(1), p(3)])));
        assert_eq!(game.winners(), Some(vec![p(1), p(3)]));
        assert!(game.game_value(p(1)) > 1000.0);
        assert!(game.game_value(p(0)) < -1000.0);
    }

    #[test]
    fn test_seven_beats_king() {
        assert!(strength(Rank::Seven) > strength(Rank::King));
        assert!(strength(Rank::Ace) > strength(Rank::Seven));
        assert!(strength(Rank::Queen) > strength(Rank::Six));
        assert!(strength(Rank::Three) > strength(Rank::Two));
    }

    #[test]
    fn test_full_random_game_scores_120() {
        let mut rng = SearchRng::new(3);
        let mut game = Sueca::deal(21);
        while !game.is_finished() {
            let moves = game.possible_moves();
            let mv = *rng.choose(&moves).unwrap();
            game.perform_move(&mv).unwrap();
        }
        assert_eq!(game.team_points(p(0)) + game.team_points(p(1)), 120);
        assert!(game.possible_moves().is_empty());
        assert_eq!(game.trump_card(), None);
    }

    #[test]
    fn test_observed_view_hides_other_hands_but_trump_card() {
        let game = Sueca::deal(4);
        let observer = game.dealer().next(4);
        let view = game.observed_by(observer);

        assert_eq!(view.hand(observer), game.hand(observer));
        assert_eq!(known(view.hand(game.dealer())), vec![game.trump_card().unwrap()]);
        for seat in PlayerId::all(4).filter(|&s| s != observer) {
            assert_eq!(view.hand(seat).len(), 10);
        }
        // 40 cards minus our 10 and the face-up trump.
        assert_eq!(view.unseen_cards().len(), 29);
    }

    #[test]
    fn test_hidden_hand_may_play_any_unseen_card() {
        let game = Sueca::deal(8);
        let observer = game.next_player().next(4);
        let view = game.observed_by(observer);

        let moves = view.possible_moves();
        for mv in game.possible_moves() {
            assert!(moves.contains(&mv));
        }
    }

    #[test]
    fn test_randomize_fills_hidden_slots() {
        let game = Sueca::deal(9);
        let observer = p(2);
        let mut view = game.observed_by(observer);
        view.randomize(&mut SearchRng::new(1)).unwrap();

        assert_eq!(view.hand(observer), game.hand(observer));
        assert!(PlayerId::all(4).all(|s| view.hand(s).iter().all(|slot| !slot.is_hidden())));
        assert!(view.unseen_cards().is_empty());
        assert!(known(view.hand(game.dealer())).contains(&game.trump_card().unwrap()));
    }

    #[test]
    fn test_state_hash_ignores_hand_order() {
        let game = two_card_position();
        let mut shuffled = game.clone();
        shuffled.hands.as_mut_slice()[0].reverse();

        assert_eq!(game.unique_state_hash(), shuffled.unique_state_hash());

        let mut moved = game.clone();
        moved.perform_move(&c(Rank::Ace, Suit::Hearts)).unwrap();
        assert_ne!(game.unique_state_hash(), moved.unique_state_hash());
    }

    #[test]
    fn test_state_hash_tells_last_tricks_apart() {
        let mut game = Sueca::deal(3);
        let mut rng = SearchRng::new(3);
        for _ in 0..4 {
            let moves = game.possible_moves();
            game.perform_move(rng.choose(&moves).unwrap()).unwrap();
        }

        let mut reordered = game.clone();
        if let Some(trick) = reordered.last_trick.as_mut() {
            trick.reverse();
        }
        assert_ne!(game.last_trick(), reordered.last_trick());
        assert_ne!(game.unique_state_hash(), reordered.unique_state_hash());
    }

    #[test]
    fn test_all_possible_states_enumerates_consistent_deals() {
        let full = Sueca::from_hands(
            vec![
                vec![c(Rank::Ace, Suit::Hearts)],
                vec![c(Rank::Two, Suit::Spades)],
                vec![c(Rank::Queen, Suit::Hearts)],
                vec![c(Rank::Seven, Suit::Clubs)],
            ],
            Suit::Spades,
            p(0),
        );
        let view = full.observed_by(p(0));
        assert_eq!(view.all_possible_states().len(), 6);

        let mut constrained = view.clone();
        constrained.absent[p(1)].insert(Suit::Hearts);
        constrained.absent[p(3)].insert(Suit::Hearts);
        let states = constrained.all_possible_states();
        assert_eq!(states.len(), 2);
        for state in &states {
            assert_eq!(known(state.hand(p(2))), vec![c(Rank::Queen, Suit::Hearts)]);
        }

        assert_eq!(full.all_possible_states().len(), 1);
    }

    #[test]
    fn test_score_margin() {
        let mut game = two_card_position();
        for card in [
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Hearts),
            c(Rank::Seven, Suit::Hearts),
        ] {
            game.perform_move(&card).unwrap();
        }
        // Only the eight dealt cards are in play: 11+4+10+2+10+3 = 40.
        assert_eq!(game.score_margin(p(0)), Some((27, 40)));
        assert_eq!(game.score_margin(p(1)), Some((-27, 40)));
    }
}
