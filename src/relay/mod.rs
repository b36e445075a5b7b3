//! Message relay
//!
//! Formats server notices and chat lines, fans them out to registered
//! clients and drains each client's outbound queue onto its socket.

pub mod broadcaster;
pub mod messages;
pub mod outbound;
pub mod results;

pub use broadcaster::Broadcaster;
pub use outbound::{Payload, spawn_writer};
pub use results::DeliveryReport;
