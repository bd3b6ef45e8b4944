//! Per-recipient snapshot projection.
//!
//! The hub owns the only mutable game state; what sessions see are these
//! views, built fresh per recipient so hole cards are only ever revealed
//! to their owner (or to everyone for non-folded seats at showdown).

use serde::{Deserialize, Serialize};

use super::engine::{Game, Stage};
use super::entities::{Card, Chips, HIDDEN_CARD, PlayerId, PlayerStatus, SeatIndex};

/// One seat as a recipient is allowed to see it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub seat: SeatIndex,
    pub chips: Chips,
    pub current_bet: Chips,
    pub status: PlayerStatus,
    pub is_dealer: bool,
    /// Rank-0 sentinels unless the recipient may see them.
    pub hole_cards: [Card; 2],
    pub is_self: bool,
}

/// The full projected table snapshot carried by `game_state` messages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GameStateView {
    pub stage: Stage,
    pub dealer_button: Option<SeatIndex>,
    pub current_player: Option<SeatIndex>,
    pub current_bet: Chips,
    pub pot: Chips,
    /// Always five slots; unrevealed ones carry the rank-0 sentinel.
    pub community_cards: [Card; 5],
    pub players: Vec<PlayerInfo>,
    /// Smallest legal raise-to total for the recipient.
    pub min_raise: Chips,
    /// Recipient's street commitment plus stack.
    pub max_raise: Chips,
}

/// Build the snapshot as seen by `recipient` (None projects a fully
/// masked spectator-grade view, used before a session has joined).
#[must_use]
pub fn project_for(game: &Game, recipient: Option<PlayerId>) -> GameStateView {
    let showdown = game.stage() == Stage::Showdown;
    let players = game
        .players()
        .iter()
        .map(|p| {
            let is_self = recipient == Some(p.id);
            let revealed = is_self || (showdown && p.is_live());
            PlayerInfo {
                id: p.id,
                name: p.name.clone(),
                seat: p.seat,
                chips: p.chips,
                current_bet: p.round_bet,
                status: p.status,
                is_dealer: p.is_dealer,
                hole_cards: if revealed { p.hole_cards } else { [HIDDEN_CARD; 2] },
                is_self,
            }
        })
        .collect();

    let mut community_cards = [HIDDEN_CARD; 5];
    for (slot, card) in community_cards.iter_mut().zip(game.community()) {
        if let Some(card) = card {
            *slot = *card;
        }
    }

    let max_raise = recipient.map_or(0, |id| game.max_raise(id));

    GameStateView {
        stage: game.stage(),
        dealer_button: game.dealer_seat(),
        current_player: game.current_actor(),
        current_bet: game.round().current_bet,
        pot: game.pot_total(),
        community_cards,
        players,
        min_raise: game.min_raise(),
        max_raise,
    }
}
