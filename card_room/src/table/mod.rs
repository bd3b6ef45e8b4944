//! The table hub actor and its configuration and inbox types.

pub mod config;
pub mod hub;
pub mod messages;

pub use config::TableConfig;
pub use hub::{HubHandle, TableHub};
pub use messages::{HubMessage, SessionId};
