//! The JSON wire catalog.
//!
//! Every message is a self-describing object carrying `type` and
//! `timestamp` (milliseconds since epoch). Client messages are lenient
//! about `timestamp` (defaulted to 0 when omitted); server messages
//! always stamp it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::engine::{SeatResult, ShowdownResult};
use crate::game::entities::{ActionKind, Card, Chips, HIDDEN_CARD, PlayerId, SeatIndex};
use crate::game::evaluator::HandCategory;
use crate::game::view::{GameStateView, PlayerInfo};

/// Millisecond wall-clock timestamp stamped on outbound messages.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A frame that failed to parse into a [`ClientMessage`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ProtocolError {
    /// Not a JSON object, no `type`, or fields of the wrong shape.
    #[error("malformed message: {0}")]
    Malformed(String),
    /// Well-formed envelope with a `type` this server does not know.
    #[error("unknown message type: {0}")]
    UnknownType(String),
}

const CLIENT_TYPES: &[&str] = &[
    "join",
    "leave",
    "player_action",
    "ready_for_next",
    "chat",
    "ping",
];

/// Client -> server messages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        #[serde(default)]
        timestamp: i64,
        player_name: String,
        /// Requested seat; -1 means any open seat.
        #[serde(default = "any_seat")]
        seat: i64,
    },
    Leave {
        #[serde(default)]
        timestamp: i64,
    },
    PlayerAction {
        #[serde(default)]
        timestamp: i64,
        action: ActionKind,
        #[serde(default)]
        amount: Chips,
    },
    ReadyForNext {
        #[serde(default)]
        timestamp: i64,
    },
    Chat {
        #[serde(default)]
        timestamp: i64,
        content: String,
    },
    Ping {
        #[serde(default)]
        timestamp: i64,
    },
}

fn any_seat() -> i64 {
    -1
}

/// Parse one inbound frame, distinguishing a malformed envelope from a
/// well-formed envelope of unknown type (they carry different error
/// codes on the wire).
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| ProtocolError::Malformed("missing type".to_string()))?;
    if !CLIENT_TYPES.contains(&kind) {
        return Err(ProtocolError::UnknownType(kind.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// One winning seat in a `showdown` broadcast.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WinnerInfo {
    pub player_id: PlayerId,
    pub player_name: String,
    pub hand_rank: Option<HandCategory>,
    pub hand_name: String,
    pub won_chips: Chips,
}

/// Per-seat detail in a `showdown` broadcast: revealed cards and the
/// chip delta.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShowdownSeat {
    pub player_id: PlayerId,
    pub player_name: String,
    pub seat: SeatIndex,
    pub hole_cards: [Card; 2],
    pub hand_name: Option<String>,
    pub won_amount: Chips,
    pub is_winner: bool,
    pub is_folded: bool,
    pub chips_after: Chips,
}

/// Server -> client messages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    JoinAck {
        timestamp: i64,
        success: bool,
        player_id: Option<PlayerId>,
        seat: Option<SeatIndex>,
        message: String,
        game_state: Option<GameStateView>,
    },
    GameState {
        timestamp: i64,
        #[serde(flatten)]
        view: GameStateView,
    },
    YourTurn {
        timestamp: i64,
        player_id: PlayerId,
        /// Amount needed to call.
        min_action: Chips,
        /// Street commitment plus stack.
        max_action: Chips,
        current_bet: Chips,
        /// Seconds before the hub folds this seat.
        time_left: u64,
    },
    PlayerJoined {
        timestamp: i64,
        player: PlayerInfo,
    },
    PlayerLeft {
        timestamp: i64,
        player_id: PlayerId,
        player_name: String,
    },
    PlayerActed {
        timestamp: i64,
        player_id: PlayerId,
        player_name: String,
        action: ActionKind,
        amount: Chips,
        /// The actor's street commitment after the action.
        total_bet: Chips,
    },
    Showdown {
        timestamp: i64,
        winners: Vec<WinnerInfo>,
        pot: Chips,
        is_early_end: bool,
        community_cards: [Card; 5],
        all_players: Vec<ShowdownSeat>,
    },
    PlayerReady {
        timestamp: i64,
        player_id: PlayerId,
        player_name: String,
        ready_players: Vec<String>,
        total_players: usize,
        all_ready: bool,
    },
    Chat {
        timestamp: i64,
        player_id: Option<PlayerId>,
        player_name: String,
        content: String,
        is_system: bool,
    },
    Pong {
        timestamp: i64,
        server_time: i64,
    },
    Error {
        timestamp: i64,
        code: u16,
        message: String,
    },
}

impl ServerMessage {
    #[must_use]
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            timestamp: now_ms(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn pong() -> Self {
        let now = now_ms();
        Self::Pong {
            timestamp: now,
            server_time: now,
        }
    }

    /// Build the end-of-hand broadcast from a settlement record.
    #[must_use]
    pub fn showdown(result: &ShowdownResult, community: [Card; 5]) -> Self {
        let winners = result
            .seats
            .iter()
            .filter(|s| s.winner)
            .map(|s| WinnerInfo {
                player_id: s.player_id,
                player_name: s.name.clone(),
                hand_rank: s.hand.as_ref().map(|h| h.category),
                hand_name: s
                    .hand
                    .as_ref()
                    .map_or_else(|| "uncontested".to_string(), |h| h.category.to_string()),
                won_chips: s.won,
            })
            .collect();
        let all_players = result
            .seats
            .iter()
            .map(|s| showdown_seat(s, result.early_end))
            .collect();
        Self::Showdown {
            timestamp: now_ms(),
            winners,
            pot: result.total_pot,
            is_early_end: result.early_end,
            community_cards: community,
            all_players,
        }
    }
}

fn showdown_seat(seat: &SeatResult, early_end: bool) -> ShowdownSeat {
    // Folded seats never show; on an early end nobody has to.
    let hole_cards = if seat.folded || early_end {
        [HIDDEN_CARD; 2]
    } else {
        seat.hole_cards
    };
    ShowdownSeat {
        player_id: seat.player_id,
        player_name: seat.name.clone(),
        seat: seat.seat,
        hole_cards,
        hand_name: seat.hand.as_ref().map(|h| h.category.to_string()),
        won_amount: seat.won,
        is_winner: seat.winner,
        is_folded: seat.folded,
        chips_after: seat.chips_after,
    }
}
