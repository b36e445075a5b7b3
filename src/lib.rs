//! Multi-user TCP chat server.
//!
//! Accepts connections, registers each under the nickname it sends first and
//! relays every participant's messages to all the others.

pub mod client;
pub mod error;
pub mod relay;
pub mod server;
pub mod utils;

pub use server::{Server, ServerConfig};
