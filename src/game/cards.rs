//! Cards and the deck.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card values. 2u8 through 14u8, ace high. The ace acts as 1 only
/// inside a 5-4-3-2-A straight, and only for tiebreak purposes.
pub type Value = u8;

pub const VALUE_MIN: Value = 2;
pub const VALUE_ACE: Value = 14;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DeckError {
    #[error("deck exhausted: requested {requested} cards with {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
}

/// A 52-card deck. `reset` refills and shuffles; `deal` removes cards
/// from the top. Running out of cards is a fatal precondition violation
/// (seat limits guarantee a hand never needs more than 51 cards), so
/// `deal` errors rather than short-dealing.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: [Card; 52],
    next: usize,
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(VALUE_MIN, Suit::Club); 52];
        for (i, value) in (VALUE_MIN..=VALUE_ACE).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, next: 0 }
    }
}

impl Deck {
    pub fn reset(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.next = 0;
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        52 - self.next
    }

    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.remaining() {
            return Err(DeckError::Exhausted {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let dealt = self.cards[self.next..self.next + n].to_vec();
        self.next += n;
        Ok(dealt)
    }
}
