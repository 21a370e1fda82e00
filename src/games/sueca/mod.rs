//! Sueca, the Portuguese four-player trick-taking game.
//!
//! - 40-card deck (A, 7, K, J, Q, 6, 5, 4, 3, 2 in each suit), ten cards each
//! - Seats 0 and 2 play against seats 1 and 3
//! - The dealer's last card sets the trump suit and stays face up until
//!   played
//! - Players must follow the led suit when they can; the highest trump, or
//!   else the highest card of the led suit, takes the trick and leads next
//! - Card points: A 11, 7 10, K 4, J 3, Q 2; the team with more of the 120
//!   points wins, 60 all is a tie
//!
//! A state can be seen from one seat with [`Sueca::observed_by`], which hides
//! the other hands. Such a view is what the searches are handed; its
//! `randomize` deals the hidden cards consistently with every suit a player
//! has already shown not to hold.

mod game;

pub use game::{card_points, deck, Sueca};
