//! Hub inbox message types.
//!
//! Everything that can happen to a table arrives through this one enum on
//! one ordered queue; applying them in arrival order is the only ordering
//! guarantee clients get.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::game::entities::PlayerId;

/// One connection's identity; at most one seat per session.
pub type SessionId = Uuid;

/// Messages that can be sent to a [`super::hub::TableHub`].
#[derive(Debug)]
pub enum HubMessage {
    /// A session opened: register its bounded outbound queue.
    Connect {
        session: SessionId,
        outbound: mpsc::Sender<String>,
    },

    /// A session's transport closed; folds and detaches its seat.
    Disconnect { session: SessionId },

    /// One framed message from a session, not yet parsed. The hub owns
    /// envelope parsing so a garbage frame can never take down a reader.
    Inbound { session: SessionId, frame: String },

    /// Delayed self-message: the action clock for a turn expired. Stale
    /// serials are ignored.
    ActionTimeout {
        player_id: PlayerId,
        turn_serial: u64,
    },

    /// Stop the actor; outbound queues close and writers drain.
    Shutdown,
}
