//! Hand evaluation.
//!
//! The evaluator enumerates every 5-card subset of the candidate cards
//! (21 subsets for the usual 7), classifies each subset independently,
//! and keeps the best. Classifying per subset instead of over the whole
//! 7-card pool avoids the kicker mis-ranking a greedy 7-card pass can
//! produce.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use super::cards::{Card, VALUE_ACE, Value};

/// Hand categories, weakest first, so the derived order matches poker.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::Pair => "pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// A classified 5-card hand.
///
/// `values` is the tiebreak sequence grouped by significance: quads
/// before the kicker, trips before the pair, pairs before kickers, and
/// plain descending order for straights, flushes, and high cards. A
/// 5-4-3-2-A straight stores `[5, 4, 3, 2, 1]`, so it sorts below a
/// 6-high straight. `cards` holds the same five cards in `values`
/// order, for display only; it does not participate in comparison.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HandRank {
    pub category: HandCategory,
    pub values: [Value; 5],
    pub cards: [Card; 5],
}

impl PartialEq for HandRank {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.values == other.values
    }
}

impl Eq for HandRank {}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.category, self.values).cmp(&(other.category, other.values))
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.category)?;
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
        }
        write!(f, "]")
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EvalError {
    #[error("expected exactly 2 hole cards, got {0}")]
    BadHoleCardCount(usize),
    #[error("expected 3 to 5 community cards, got {0}")]
    BadCommunityCardCount(usize),
}

/// Find the best 5-card hand from 2 hole cards plus 3..=5 community
/// cards. A showdown always has at least a flop on the board; anything
/// less is a broken precondition and is rejected.
pub fn evaluate(hole: &[Card], community: &[Card]) -> Result<HandRank, EvalError> {
    if hole.len() != 2 {
        return Err(EvalError::BadHoleCardCount(hole.len()));
    }
    if !(3..=5).contains(&community.len()) {
        return Err(EvalError::BadCommunityCardCount(community.len()));
    }

    let mut pool = Vec::with_capacity(7);
    pool.extend_from_slice(hole);
    pool.extend_from_slice(community);

    let n = pool.len();
    let mut best: Option<HandRank> = None;
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let rank =
                            classify_five([pool[a], pool[b], pool[c], pool[d], pool[e]]);
                        match best {
                            Some(ref current) if *current >= rank => {}
                            _ => best = Some(rank),
                        }
                    }
                }
            }
        }
    }
    match best {
        Some(rank) => Ok(rank),
        // Unreachable: 5..=7 pooled cards always yield a combination.
        None => Err(EvalError::BadCommunityCardCount(community.len())),
    }
}

/// Classify exactly five cards into their single category.
pub fn classify_five(mut cards: [Card; 5]) -> HandRank {
    cards.sort_by(|a, b| b.0.cmp(&a.0));
    let values = [cards[0].0, cards[1].0, cards[2].0, cards[3].0, cards[4].0];

    let is_flush = cards.iter().all(|c| c.1 == cards[0].1);
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    let is_wheel = values == [VALUE_ACE, 5, 4, 3, 2];
    let is_straight = distinct && (values[0] - values[4] == 4 || is_wheel);

    if is_straight && is_flush {
        if is_wheel {
            return HandRank {
                category: HandCategory::StraightFlush,
                values: [5, 4, 3, 2, 1],
                cards: wheel_order(cards),
            };
        }
        let category = if values[0] == VALUE_ACE {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandRank {
            category,
            values,
            cards,
        };
    }
    if is_straight {
        if is_wheel {
            return HandRank {
                category: HandCategory::Straight,
                values: [5, 4, 3, 2, 1],
                cards: wheel_order(cards),
            };
        }
        return HandRank {
            category: HandCategory::Straight,
            values,
            cards,
        };
    }
    if is_flush {
        return HandRank {
            category: HandCategory::Flush,
            values,
            cards,
        };
    }

    // Group by value, largest groups first, higher values first within
    // equal group sizes. Expanding the groups back out gives the
    // significance-ordered tiebreak sequence.
    let mut groups: Vec<(usize, Value)> = Vec::with_capacity(5);
    for &v in &values {
        match groups.iter_mut().find(|(_, gv)| *gv == v) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, v)),
        }
    }
    groups.sort_by(|a, b| b.cmp(a));

    let category = match groups.as_slice() {
        [(4, _), ..] => HandCategory::FourOfAKind,
        [(3, _), (2, _)] => HandCategory::FullHouse,
        [(3, _), ..] => HandCategory::ThreeOfAKind,
        [(2, _), (2, _), ..] => HandCategory::TwoPair,
        [(2, _), ..] => HandCategory::Pair,
        _ => HandCategory::HighCard,
    };

    let mut grouped_values = [0; 5];
    let mut grouped_cards = [cards[0]; 5];
    let mut k = 0;
    for &(_, v) in &groups {
        for card in cards.iter().filter(|card| card.0 == v) {
            grouped_values[k] = v;
            grouped_cards[k] = *card;
            k += 1;
        }
    }

    HandRank {
        category,
        values: grouped_values,
        cards: grouped_cards,
    }
}

/// Reorder a descending-sorted wheel (`A 5 4 3 2`) so the ace trails.
fn wheel_order(cards: [Card; 5]) -> [Card; 5] {
    [cards[1], cards[2], cards[3], cards[4], cards[0]]
}
