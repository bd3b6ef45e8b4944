//! Wire protocol: the JSON message catalog and stable error codes.

pub mod errors;
pub mod messages;

pub use messages::{ClientMessage, ProtocolError, ServerMessage, parse_client_message};
