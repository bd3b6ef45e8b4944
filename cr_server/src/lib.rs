//! Library surface of the card-room server binary: the HTTP/WebSocket
//! router, configuration, and logging setup. Split out so integration
//! tests can drive a real server in-process.

pub mod api;
pub mod config;
pub mod logging;
