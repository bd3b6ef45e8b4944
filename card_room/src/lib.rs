//! # card_room
//!
//! An authoritative single-table No-Limit Texas Hold'em server core.
//!
//! The server owns the deck, the betting book, and the outcome of every
//! hand; clients only display state and submit actions. The crate splits
//! into three layers:
//!
//! - [`game`]: the pure engine: cards and deck, hand evaluation, the
//!   betting book, the hand state machine, and per-recipient snapshot
//!   projection.
//! - [`net`]: the JSON wire protocol (message catalog and error codes).
//! - [`table`]: the hub, a single-writer actor that owns one game,
//!   serializes all mutation through one inbox, fans state out to
//!   per-session queues, and runs the ready-for-next-hand barrier.
//!
//! Transport is someone else's job: the hub consumes framed text and
//! emits framed text. The companion `cr_server` binary bridges it to
//! WebSocket sessions.

pub mod game;
pub mod net;
pub mod table;

pub use game::{Game, GameRules, Stage};
pub use table::{HubHandle, TableConfig, TableHub};
