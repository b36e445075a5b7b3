//! Client management system
//!
//! Handles registered clients, the shared registry and the per-connection
//! state machine.

pub mod color;
pub mod handler;
pub mod registry;
pub mod state;

pub use handler::{ConnectionHandler, HandlerState};
pub use registry::{ClientRegistry, SharedRegistry};
pub use state::{Client, Connection, ConnectionId};
