use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Placeholder for card ranks. 2..=14 with 14 = ace; ace counts low only
/// inside the A-2-3-4-5 straight. Rank 0 marks a hidden or absent card.
pub type Rank = u8;

pub const ACE: Rank = 14;
pub const KING: Rank = 13;
pub const QUEEN: Rank = 12;
pub const JACK: Rank = 11;
pub const TEN: Rank = 10;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
    // Suit of the rank-0 sentinel used for hidden and empty card slots.
    Hidden,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
            Self::Hidden => "?",
        };
        write!(f, "{repr}")
    }
}

/// A card is a rank paired with a suit. `Card(0, Suit::Hidden)` stands in
/// for a card the recipient is not allowed to see (or an empty board slot).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Rank, pub Suit);

/// The masked-card sentinel used in public snapshots.
pub const HIDDEN_CARD: Card = Card(0, Suit::Hidden);

impl Card {
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            0 => write!(f, "?{}", self.1),
            14 => write!(f, "A{}", self.1),
            13 => write!(f, "K{}", self.1),
            12 => write!(f, "Q{}", self.1),
            11 => write!(f, "J{}", self.1),
            v => write!(f, "{v}{}", self.1),
        }
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DeckError {
    #[error("no cards left in deck")]
    Exhausted,
}

/// An ordered 52-card deck with a deal cursor. Rebuilt fresh for every
/// hand; the shuffle seed is injectable so a hand can be replayed exactly.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
}

impl Deck {
    fn fresh_cards() -> Vec<Card> {
        let mut cards = Vec::with_capacity(52);
        for suit in [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade] {
            for rank in 2..=ACE {
                cards.push(Card(rank, suit));
            }
        }
        cards
    }

    /// A fresh deck shuffled by Fisher-Yates from `seed`. The same seed
    /// always produces the same deal order.
    #[must_use]
    pub fn shuffled(seed: u64) -> Self {
        let mut cards = Self::fresh_cards();
        let mut rng = StdRng::seed_from_u64(seed);
        cards.shuffle(&mut rng);
        Self { cards, cursor: 0 }
    }

    /// A deck whose top cards are exactly `top`, in order, followed by the
    /// rest of the standard deck. Used by tests that need a known board.
    #[must_use]
    pub fn stacked(top: &[Card]) -> Self {
        let mut cards: Vec<Card> = top.to_vec();
        for card in Self::fresh_cards() {
            if !top.contains(&card) {
                cards.push(card);
            }
        }
        Self { cards, cursor: 0 }
    }

    pub fn deal(&mut self) -> Result<Card, DeckError> {
        let card = *self.cards.get(self.cursor).ok_or(DeckError::Exhausted)?;
        self.cursor += 1;
        Ok(card)
    }

    pub fn deal_n(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if self.cursor + n > self.cards.len() {
            return Err(DeckError::Exhausted);
        }
        let cards = self.cards[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        Ok(cards)
    }

    pub fn burn(&mut self, n: usize) -> Result<(), DeckError> {
        if self.cursor + n > self.cards.len() {
            return Err(DeckError::Exhausted);
        }
        self.cursor += n;
        Ok(())
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }
}

/// Type alias for chip amounts. All chip math is whole non-negative
/// integers; there is no fractional betting.
pub type Chips = u32;

/// Stable player identifier, assigned at join and kept across hands.
pub type PlayerId = Uuid;

/// Table position, 0..max_seats.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// At the table but not dealt into the current hand.
    Seated,
    /// Dealt in and still able to act.
    InHand,
    /// Out of the current hand.
    Folded,
    /// Committed their whole stack; in the hand but out of moves.
    AllIn,
    /// No chips left; skipped when hands are dealt.
    BustedOut,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Seated => "seated",
            Self::InHand => "in hand",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::BustedOut => "busted",
        };
        write!(f, "{repr}")
    }
}

/// A wire-level player action. `amount` travels beside it in
/// `player_action` messages and only matters for raises.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise => "raises",
            Self::AllIn => "goes all-in",
        };
        write!(f, "{repr}")
    }
}

/// One seat at the table. Seats persist across hands; the per-hand fields
/// are reset by `reset_for_hand`.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub chips: Chips,
    pub hole_cards: [Card; 2],
    /// Chips committed during the current street.
    pub round_bet: Chips,
    /// Chips committed over the whole hand, antes included. Side pots are
    /// partitioned from these totals.
    pub total_bet: Chips,
    pub status: PlayerStatus,
    pub is_dealer: bool,
    /// Acted at the current bet level; cleared when a full raise reopens
    /// the street.
    pub has_acted: bool,
    /// Took any voluntary action this street; never cleared mid-street.
    /// Gates re-raising when an underfull all-in leaves the bet not live.
    pub acted_this_round: bool,
}

impl Player {
    #[must_use]
    pub fn new(name: String, seat: SeatIndex, chips: Chips) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            seat,
            chips,
            hole_cards: [HIDDEN_CARD; 2],
            round_bet: 0,
            total_bet: 0,
            status: PlayerStatus::Seated,
            is_dealer: false,
            has_acted: false,
            acted_this_round: false,
        }
    }

    /// Clear per-hand state and mark the seat in or out of the next hand
    /// based on its stack.
    pub fn reset_for_hand(&mut self) {
        self.hole_cards = [HIDDEN_CARD; 2];
        self.round_bet = 0;
        self.total_bet = 0;
        self.has_acted = false;
        self.acted_this_round = false;
        self.status = if self.chips > 0 {
            PlayerStatus::InHand
        } else {
            PlayerStatus::BustedOut
        };
    }

    #[must_use]
    pub fn is_in_hand(&self) -> bool {
        self.status == PlayerStatus::InHand
    }

    /// Still contesting the pot (not folded, not busted).
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self.status, PlayerStatus::InHand | PlayerStatus::AllIn)
    }

    /// Move up to `amount` chips from the stack into the current street's
    /// commitment, returning what was actually paid. Marks the seat AllIn
    /// when the stack empties mid-hand.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.round_bet += paid;
        self.total_bet += paid;
        if self.chips == 0 && self.status == PlayerStatus::InHand {
            self.status = PlayerStatus::AllIn;
        }
        paid
    }

    /// Debit an ante. Antes count toward the hand total (and therefore the
    /// pot partition) but not toward the street call amount.
    pub fn commit_ante(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.total_bet += paid;
        if self.chips == 0 && self.status == PlayerStatus::InHand {
            self.status = PlayerStatus::AllIn;
        }
        paid
    }
}
