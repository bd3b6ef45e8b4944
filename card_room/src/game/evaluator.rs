//! Five-to-seven card hand evaluation.
//!
//! Produces a totally ordered `HandValue` so showdown comparison is just
//! `Ord`. Tiebreak vectors are truncated to the length that matters for
//! the category, so equal vectors mean an exact chip-splitting tie.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{ACE, Card, Rank};

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    /// Display name used in showdown broadcasts.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::Trips => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::Quads => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A comparable hand strength: category first, then the category-specific
/// tiebreak ranks in descending significance. Derived `Ord` is the total
/// order required at showdown.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreak: Vec<Rank>,
}

impl HandValue {
    fn new(category: HandCategory, tiebreak: Vec<Rank>) -> Self {
        Self { category, tiebreak }
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Evaluate the best five-card hand from 5-7 visible cards. Hidden
/// sentinels are ignored, so a folded seat's masked cards never rank.
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandValue {
    let cards: Vec<Card> = cards.iter().copied().filter(|c| !c.is_hidden()).collect();
    debug_assert!((5..=7).contains(&cards.len()));

    let mut rank_counts = [0u8; 15];
    let mut by_suit: [Vec<Rank>; 4] = Default::default();
    for card in &cards {
        rank_counts[card.0 as usize] += 1;
        let idx = match card.1 {
            super::entities::Suit::Club => 0,
            super::entities::Suit::Diamond => 1,
            super::entities::Suit::Heart => 2,
            super::entities::Suit::Spade => 3,
            super::entities::Suit::Hidden => continue,
        };
        by_suit[idx].push(card.0);
    }

    // Ranks present, high to low.
    let mut distinct: Vec<Rank> = (2..=ACE).rev().filter(|&r| rank_counts[r as usize] > 0).collect();

    // Straight flush / royal flush.
    let flush_suit = by_suit.iter_mut().find(|ranks| ranks.len() >= 5);
    if let Some(flush_ranks) = flush_suit {
        flush_ranks.sort_unstable_by(|a, b| b.cmp(a));
        flush_ranks.dedup();
        if let Some(high) = straight_high(flush_ranks) {
            let category = if high == ACE {
                HandCategory::RoyalFlush
            } else {
                HandCategory::StraightFlush
            };
            return HandValue::new(category, vec![high]);
        }
        // Seven cards cannot hold both a five-card flush and quads or a
        // full house, so the flush is safe to return here.
        let flush_top: Vec<Rank> = flush_ranks.iter().copied().take(5).collect();
        return HandValue::new(HandCategory::Flush, flush_top);
    }

    if let Some(value) = quads_or_full_house(&rank_counts, &distinct) {
        return value;
    }

    if let Some(high) = straight_high(&distinct) {
        return HandValue::new(HandCategory::Straight, vec![high]);
    }

    let trips: Vec<Rank> = distinct
        .iter()
        .copied()
        .filter(|&r| rank_counts[r as usize] == 3)
        .collect();
    let pairs: Vec<Rank> = distinct
        .iter()
        .copied()
        .filter(|&r| rank_counts[r as usize] == 2)
        .collect();

    if let Some(&three) = trips.first() {
        let mut tiebreak = vec![three];
        tiebreak.extend(kickers(&distinct, &[three], 2));
        return HandValue::new(HandCategory::Trips, tiebreak);
    }

    if pairs.len() >= 2 {
        let mut tiebreak = vec![pairs[0], pairs[1]];
        tiebreak.extend(kickers(&distinct, &pairs[..2], 1));
        return HandValue::new(HandCategory::TwoPair, tiebreak);
    }

    if let Some(&pair) = pairs.first() {
        let mut tiebreak = vec![pair];
        tiebreak.extend(kickers(&distinct, &[pair], 3));
        return HandValue::new(HandCategory::OnePair, tiebreak);
    }

    distinct.truncate(5);
    HandValue::new(HandCategory::HighCard, distinct)
}

fn quads_or_full_house(rank_counts: &[u8; 15], distinct: &[Rank]) -> Option<HandValue> {
    if let Some(&quad) = distinct.iter().find(|&&r| rank_counts[r as usize] == 4) {
        let mut tiebreak = vec![quad];
        tiebreak.extend(kickers(distinct, &[quad], 1));
        return Some(HandValue::new(HandCategory::Quads, tiebreak));
    }

    let trips: Vec<Rank> = distinct
        .iter()
        .copied()
        .filter(|&r| rank_counts[r as usize] == 3)
        .collect();
    if let Some(&three) = trips.first() {
        // The pair half may itself be a second set of trips.
        let pair = trips
            .get(1)
            .copied()
            .or_else(|| {
                distinct
                    .iter()
                    .copied()
                    .find(|&r| rank_counts[r as usize] == 2)
            });
        if let Some(pair) = pair {
            return Some(HandValue::new(HandCategory::FullHouse, vec![three, pair]));
        }
    }
    None
}

/// Highest straight top-rank within `ranks` (sorted descending, distinct),
/// or None. The wheel counts: an ace also plays low, giving top rank 5.
fn straight_high(ranks: &[Rank]) -> Option<Rank> {
    let mut candidates: Vec<Rank> = ranks.to_vec();
    if candidates.first() == Some(&ACE) {
        candidates.push(1);
    }
    for window in candidates.windows(5) {
        if window.windows(2).all(|pair| pair[0] - pair[1] == 1) {
            return Some(window[0]);
        }
    }
    None
}

/// The `want` highest ranks not already used by the made hand.
fn kickers(distinct: &[Rank], used: &[Rank], want: usize) -> Vec<Rank> {
    distinct
        .iter()
        .copied()
        .filter(|r| !used.contains(r))
        .take(want)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit::{Club, Diamond, Heart, Spade};
    use crate::game::entities::{JACK, KING, QUEEN, TEN};
    use std::cmp::Ordering;

    fn c(rank: Rank, suit: crate::game::entities::Suit) -> Card {
        Card(rank, suit)
    }

    #[test]
    fn test_high_card() {
        let value = evaluate(&[
            c(ACE, Spade),
            c(10, Heart),
            c(8, Diamond),
            c(6, Club),
            c(3, Spade),
            c(2, Heart),
            c(12, Club),
        ]);
        assert_eq!(value.category, HandCategory::HighCard);
        assert_eq!(value.tiebreak, vec![ACE, 12, 10, 8, 6]);
    }

    #[test]
    fn test_one_pair_kickers_truncated_to_three() {
        let value = evaluate(&[
            c(9, Spade),
            c(9, Heart),
            c(ACE, Diamond),
            c(7, Club),
            c(5, Spade),
            c(3, Heart),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::OnePair);
        assert_eq!(value.tiebreak, vec![9, ACE, 7, 5]);
    }

    #[test]
    fn test_two_pair_uses_best_two_pairs() {
        // Three pairs available; only the top two play, plus one kicker.
        let value = evaluate(&[
            c(10, Spade),
            c(10, Heart),
            c(7, Diamond),
            c(7, Club),
            c(4, Spade),
            c(4, Heart),
            c(ACE, Club),
        ]);
        assert_eq!(value.category, HandCategory::TwoPair);
        assert_eq!(value.tiebreak, vec![10, 7, ACE]);
    }

    #[test]
    fn test_trips() {
        let value = evaluate(&[
            c(6, Spade),
            c(6, Heart),
            c(6, Diamond),
            c(KING, Club),
            c(9, Spade),
            c(3, Heart),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::Trips);
        assert_eq!(value.tiebreak, vec![6, KING, 9]);
    }

    #[test]
    fn test_straight_ace_high() {
        let value = evaluate(&[
            c(ACE, Spade),
            c(KING, Heart),
            c(QUEEN, Diamond),
            c(JACK, Club),
            c(TEN, Spade),
            c(4, Heart),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::Straight);
        assert_eq!(value.tiebreak, vec![ACE]);
    }

    #[test]
    fn test_wheel_straight_tops_at_five() {
        let value = evaluate(&[
            c(ACE, Spade),
            c(2, Heart),
            c(3, Diamond),
            c(4, Club),
            c(5, Spade),
            c(9, Heart),
            c(KING, Club),
        ]);
        assert_eq!(value.category, HandCategory::Straight);
        assert_eq!(value.tiebreak, vec![5]);
    }

    #[test]
    fn test_wheel_ranks_below_six_high_straight() {
        let wheel = evaluate(&[
            c(ACE, Spade),
            c(2, Heart),
            c(3, Diamond),
            c(4, Club),
            c(5, Spade),
        ]);
        let six_high = evaluate(&[
            c(2, Spade),
            c(3, Heart),
            c(4, Diamond),
            c(5, Club),
            c(6, Spade),
        ]);
        assert!(wheel < six_high);
    }

    #[test]
    fn test_flush_takes_best_five_of_suit() {
        let value = evaluate(&[
            c(ACE, Heart),
            c(JACK, Heart),
            c(9, Heart),
            c(6, Heart),
            c(3, Heart),
            c(2, Heart),
            c(KING, Spade),
        ]);
        assert_eq!(value.category, HandCategory::Flush);
        assert_eq!(value.tiebreak, vec![ACE, JACK, 9, 6, 3]);
    }

    #[test]
    fn test_full_house_prefers_bigger_trips() {
        // Two sets of trips: the lower one plays as the pair.
        let value = evaluate(&[
            c(9, Spade),
            c(9, Heart),
            c(9, Diamond),
            c(4, Club),
            c(4, Spade),
            c(4, Heart),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::FullHouse);
        assert_eq!(value.tiebreak, vec![9, 4]);
    }

    #[test]
    fn test_quads_with_single_kicker() {
        let value = evaluate(&[
            c(8, Spade),
            c(8, Heart),
            c(8, Diamond),
            c(8, Club),
            c(ACE, Spade),
            c(KING, Heart),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::Quads);
        assert_eq!(value.tiebreak, vec![8, ACE]);
    }

    #[test]
    fn test_straight_flush_detected_only_in_one_suit() {
        // Five consecutive ranks exist, but only four share a suit.
        let value = evaluate(&[
            c(9, Spade),
            c(8, Spade),
            c(7, Spade),
            c(6, Spade),
            c(5, Heart),
            c(5, Spade),
            c(2, Club),
        ]);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.tiebreak, vec![9]);
    }

    #[test]
    fn test_steel_wheel_straight_flush() {
        let value = evaluate(&[
            c(ACE, Club),
            c(2, Club),
            c(3, Club),
            c(4, Club),
            c(5, Club),
            c(KING, Heart),
            c(QUEEN, Spade),
        ]);
        assert_eq!(value.category, HandCategory::StraightFlush);
        assert_eq!(value.tiebreak, vec![5]);
    }

    #[test]
    fn test_royal_flush() {
        let value = evaluate(&[
            c(ACE, Diamond),
            c(KING, Diamond),
            c(QUEEN, Diamond),
            c(JACK, Diamond),
            c(TEN, Diamond),
            c(2, Club),
            c(3, Heart),
        ]);
        assert_eq!(value.category, HandCategory::RoyalFlush);
    }

    #[test]
    fn test_flush_beats_straight_but_loses_to_full_house() {
        let straight = evaluate(&[
            c(9, Spade),
            c(8, Heart),
            c(7, Diamond),
            c(6, Club),
            c(5, Spade),
        ]);
        let flush = evaluate(&[
            c(ACE, Heart),
            c(JACK, Heart),
            c(9, Heart),
            c(6, Heart),
            c(3, Heart),
        ]);
        let full_house = evaluate(&[
            c(4, Spade),
            c(4, Heart),
            c(4, Diamond),
            c(2, Club),
            c(2, Spade),
        ]);
        assert!(straight < flush);
        assert!(flush < full_house);
    }

    #[test]
    fn test_full_house_found_when_board_is_flush_heavy() {
        // Four hearts on board plus a board pair: quads/boat check must not
        // be skipped by the flush branch.
        let value = evaluate(&[
            c(9, Heart),
            c(9, Spade),
            c(9, Diamond),
            c(6, Heart),
            c(6, Club),
            c(3, Heart),
            c(2, Heart),
        ]);
        assert_eq!(value.category, HandCategory::FullHouse);
    }

    #[test]
    fn test_compare_is_antisymmetric_and_reflexive() {
        let a = evaluate(&[
            c(9, Spade),
            c(9, Heart),
            c(ACE, Diamond),
            c(7, Club),
            c(5, Spade),
        ]);
        let b = evaluate(&[
            c(10, Spade),
            c(10, Heart),
            c(2, Diamond),
            c(7, Club),
            c(5, Spade),
        ]);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_compare_is_transitive() {
        let low = evaluate(&[
            c(ACE, Spade),
            c(10, Heart),
            c(8, Diamond),
            c(6, Club),
            c(3, Spade),
        ]);
        let mid = evaluate(&[
            c(2, Spade),
            c(2, Heart),
            c(8, Diamond),
            c(6, Club),
            c(3, Spade),
        ]);
        let high = evaluate(&[
            c(ACE, Spade),
            c(ACE, Heart),
            c(8, Diamond),
            c(6, Club),
            c(3, Spade),
        ]);
        assert!(low < mid && mid < high && low < high);
    }

    #[test]
    fn test_identical_hands_tie_exactly() {
        let a = evaluate(&[
            c(KING, Spade),
            c(KING, Heart),
            c(JACK, Spade),
            c(JACK, Heart),
            c(4, Diamond),
            c(2, Club),
            c(9, Spade),
        ]);
        let b = evaluate(&[
            c(KING, Diamond),
            c(KING, Club),
            c(JACK, Diamond),
            c(JACK, Club),
            c(4, Heart),
            c(2, Spade),
            c(9, Club),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_kickers_break_pair_ties() {
        let better = evaluate(&[
            c(9, Spade),
            c(9, Heart),
            c(ACE, Diamond),
            c(7, Club),
            c(5, Spade),
        ]);
        let worse = evaluate(&[
            c(9, Diamond),
            c(9, Club),
            c(KING, Diamond),
            c(7, Heart),
            c(5, Club),
        ]);
        assert!(better > worse);
    }

    #[test]
    fn test_five_and_six_card_inputs() {
        let five = evaluate(&[
            c(2, Spade),
            c(5, Heart),
            c(9, Diamond),
            c(JACK, Club),
            c(KING, Spade),
        ]);
        assert_eq!(five.category, HandCategory::HighCard);
        let six = evaluate(&[
            c(2, Spade),
            c(2, Heart),
            c(9, Diamond),
            c(JACK, Club),
            c(KING, Spade),
            c(9, Club),
        ]);
        assert_eq!(six.category, HandCategory::TwoPair);
    }
}
