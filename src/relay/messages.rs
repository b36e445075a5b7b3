//! Server → client message formats
//!
//! All messages are raw bytes. Chat lines carry the sender's bytes through
//! untouched; no terminator is added or removed.

use crate::client::Client;
use crate::client::color::RESET;

pub fn join_notice(nickname: &str) -> Vec<u8> {
    format!("[SERVER] {} joined the chat.\n", nickname).into_bytes()
}

pub fn leave_notice(nickname: &str) -> Vec<u8> {
    format!("[SERVER] {} left the chat.\n", nickname).into_bytes()
}

/// Prefixes `line` with the sender's nickname, wrapped in its color when
/// `use_colors` is set.
pub fn chat_line(sender: &Client, line: &[u8], use_colors: bool) -> Vec<u8> {
    let prefix = if use_colors {
        format!(
            "{}{}: {}",
            sender.color().ansi_code(),
            sender.nickname(),
            RESET
        )
    } else {
        format!("{}: ", sender.nickname())
    };

    let mut message = Vec::with_capacity(prefix.len() + line.len());
    message.extend_from_slice(prefix.as_bytes());
    message.extend_from_slice(line);
    message
}
