//! All Telegram-specific functionality

pub mod client;
pub mod parser;
pub mod types;

// Re-export main types for convenience
pub use client::{LONG_POLL_TIMEOUT_SECS, TelegramClient};
pub use parser::{ChatEvent, classify_update, parse_command};
pub use types::Update;
