//! Core types shared by the games and the search: seats, cards, the search
//! RNG and the hidden-card determinizer.

pub mod card;
pub mod deal;
pub mod player;
pub mod rng;

pub use card::{Card, CardSlot, Rank, Suit, SuitSet};
pub use deal::{deal_hidden, DealError};
pub use player::{PlayerId, PlayerMap};
pub use rng::{SearchRng, SearchRngState};
