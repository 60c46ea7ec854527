//! Pot settlement.
//!
//! Pots are rebuilt from per-hand contribution totals at settlement
//! time rather than tracked incrementally. The distinct contribution
//! amounts partition the pot into slices: the slice between two
//! adjacent levels collects that difference from every seat that
//! contributed at least the upper level, and only contenders who
//! covered the level can win it. Folded chips stay in whichever slices
//! they reached.

use super::eval::HandRank;
use super::seat::{Chips, SeatIndex};

/// One contested slice of the pot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PotSlice {
    pub amount: Chips,
    /// Seats eligible to win this slice.
    pub eligible: Vec<SeatIndex>,
}

/// The outcome of settling one hand.
#[derive(Clone, Debug)]
pub struct Settlement {
    /// Chips paid out, indexed by seat.
    pub payouts: Vec<Chips>,
    /// Per-slice winners, main pot first, for announcements.
    pub awards: Vec<PotAward>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PotAward {
    pub amount: Chips,
    pub winners: Vec<SeatIndex>,
}

/// Partition the pot by contribution level.
///
/// `contributions[i]` is seat i's total chips across the hand (zero for
/// seats not dealt in); `contending[i]` is whether seat i can still win.
/// A slice whose contributors all folded falls back to the full
/// contender set, so every chip contributed is always awarded.
pub fn build_pot_slices(contributions: &[Chips], contending: &[bool]) -> Vec<PotSlice> {
    let mut levels: Vec<Chips> = contributions.iter().copied().filter(|&c| c > 0).collect();
    levels.sort_unstable();
    levels.dedup();

    let contenders: Vec<SeatIndex> = (0..contributions.len())
        .filter(|&i| contending[i])
        .collect();

    let mut slices = Vec::with_capacity(levels.len());
    let mut prev = 0;
    for level in levels {
        let step = level - prev;
        let contributors = contributions.iter().filter(|&&c| c >= level).count() as Chips;
        let mut eligible: Vec<SeatIndex> = contenders
            .iter()
            .copied()
            .filter(|&i| contributions[i] >= level)
            .collect();
        if eligible.is_empty() {
            eligible = contenders.clone();
        }
        slices.push(PotSlice {
            amount: step * contributors,
            eligible,
        });
        prev = level;
    }
    slices
}

/// Settle a showdown.
///
/// `ranks[i]` is seat i's best hand, `None` for seats that folded or
/// were never dealt in. Each slice goes to the best-ranked eligible
/// seat(s); ties split evenly with the remainder going to the tied
/// winner closest at-or-after the button.
pub fn settle(
    contributions: &[Chips],
    ranks: &[Option<HandRank>],
    button: SeatIndex,
) -> Settlement {
    let contending: Vec<bool> = ranks.iter().map(Option::is_some).collect();
    let slices = build_pot_slices(contributions, &contending);

    let mut payouts = vec![0; contributions.len()];
    let mut awards = Vec::with_capacity(slices.len());
    let n = contributions.len();

    for slice in slices {
        let best = slice
            .eligible
            .iter()
            .filter_map(|&i| ranks[i].as_ref())
            .max();
        let Some(best) = best else {
            // No contender anywhere: nothing sane to do with the slice.
            continue;
        };
        let winners: Vec<SeatIndex> = slice
            .eligible
            .iter()
            .copied()
            .filter(|&i| ranks[i].as_ref() == Some(best))
            .collect();

        let share = slice.amount / winners.len() as Chips;
        let remainder = slice.amount % winners.len() as Chips;
        for &w in &winners {
            payouts[w] += share;
        }
        if remainder > 0 {
            let closest = winners
                .iter()
                .copied()
                .min_by_key(|&w| (w + n - button) % n);
            if let Some(w) = closest {
                payouts[w] += remainder;
            }
        }
        awards.push(PotAward {
            amount: slice.amount,
            winners,
        });
    }

    Settlement { payouts, awards }
}
