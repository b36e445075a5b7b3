//! Error handlers
//!
//! Logs errors at a level that matches how serious they are for the server.

use crate::error::types::ChatServerError;
use log::{debug, error, info, warn};

/// Handle a chat server error
pub fn handle_error(err: &ChatServerError) {
    match err {
        // A client that hangs up before naming itself is routine.
        ChatServerError::Handshake(_) => debug!("{}", err),
        ChatServerError::Registry(_) => info!("{}", err),
        ChatServerError::Stream(_) | ChatServerError::RecipientSendFailed { .. } => {
            warn!("{}", err)
        }
        ChatServerError::Bind { .. } | ChatServerError::Config(_) | ChatServerError::Io(_) => {
            error!("Chat Server Error: {}", err)
        }
    }
}
