//! Stable numeric protocol error codes and the engine-error mapping.

use crate::game::engine::GameError;
use crate::net::messages::ProtocolError;

/// 1xxx: envelope errors.
pub const MALFORMED_ENVELOPE: u16 = 1001;
pub const UNKNOWN_TYPE: u16 = 1002;

/// 2xxx: lifecycle errors.
pub const TABLE_FULL: u16 = 2001;
pub const INVALID_SEAT: u16 = 2002;
pub const SEAT_OCCUPIED: u16 = 2003;
pub const LEAVE_FAILED: u16 = 2004;

/// 3xxx: turn and legality errors.
pub const NOT_YOUR_TURN: u16 = 3001;
pub const ILLEGAL_ACTION: u16 = 3002;
pub const NOT_BETTING_STAGE: u16 = 3003;

/// 4xxx: settlement-phase errors.
pub const NOT_SETTLEMENT_STAGE: u16 = 4001;

/// 5xxx: the table detected an invariant violation and halted.
pub const TABLE_HALTED: u16 = 5001;

/// Default wire code for an engine rejection. Contexts with a more
/// specific meaning (leave, ready) override this at the hub.
#[must_use]
pub fn code_for(err: &GameError) -> u16 {
    match err {
        GameError::TableFull => TABLE_FULL,
        GameError::InvalidSeat => INVALID_SEAT,
        GameError::SeatOccupied => SEAT_OCCUPIED,
        GameError::NotYourTurn => NOT_YOUR_TURN,
        GameError::NotBettingStage | GameError::HandInProgress => NOT_BETTING_STAGE,
        GameError::Bet(_) | GameError::PlayerNotFound | GameError::NotEnoughPlayers { .. } => {
            ILLEGAL_ACTION
        }
        GameError::Deck(_) => TABLE_HALTED,
    }
}

/// Wire code for a frame that never became a message.
#[must_use]
pub fn code_for_protocol(err: &ProtocolError) -> u16 {
    match err {
        ProtocolError::Malformed(_) => MALFORMED_ENVELOPE,
        ProtocolError::UnknownType(_) => UNKNOWN_TYPE,
    }
}
