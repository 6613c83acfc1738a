//! Reply text helpers for chat commands.
//!
//! Everything here is pure so it can be tested without a transport.

use std::num::IntErrorKind;

/// Telegram's per-message text limit, in characters.
pub const MAX_REPLY_CHARS: usize = 4096;

pub const DEFAULT_SUMMARY_COUNT: usize = 50;
pub const MIN_SUMMARY_COUNT: usize = 10;
pub const MAX_SUMMARY_COUNT: usize = 200;

/// The count argument to `/summarize` was not a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCount(pub String);

/// Parses the optional count argument of `/summarize`.
///
/// A missing argument yields [`DEFAULT_SUMMARY_COUNT`]. Any integer is
/// clamped into `[MIN_SUMMARY_COUNT, MAX_SUMMARY_COUNT]`, including values too
/// large to represent. Persian and Arabic-Indic digits are accepted.
///
/// # Errors
///
/// Returns [`InvalidCount`] when the argument is not an integer.
pub fn parse_count(arg: Option<&str>) -> Result<usize, InvalidCount> {
    let Some(raw) = arg else {
        return Ok(DEFAULT_SUMMARY_COUNT);
    };

    let normalized: String = raw.trim().chars().map(normalize_digit).collect();
    match normalized.parse::<i64>() {
        Ok(n) => Ok(clamp_count(n)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(MAX_SUMMARY_COUNT),
            IntErrorKind::NegOverflow => Ok(MIN_SUMMARY_COUNT),
            _ => Err(InvalidCount(raw.to_string())),
        },
    }
}

fn clamp_count(n: i64) -> usize {
    // Both bounds fit comfortably in i64.
    let lo = MIN_SUMMARY_COUNT as i64;
    let hi = MAX_SUMMARY_COUNT as i64;
    usize::try_from(n.clamp(lo, hi)).unwrap_or(DEFAULT_SUMMARY_COUNT)
}

fn normalize_digit(c: char) -> char {
    match c {
        '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
        '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
        other => other,
    }
}

/// Splits `text` into consecutive pieces of at most `max_chars` characters.
///
/// Pieces are cut at character boundaries only; joining them gives back the
/// input. Empty input yields no pieces.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    for ch in text.chars() {
        if current_chars == max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push(ch);
        current_chars += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[must_use]
pub fn processing_notice(message_count: usize) -> String {
    format!("Summarizing {message_count} messages...")
}

/// Final reply body: a count header, a blank line, then the summary.
#[must_use]
pub fn format_summary_reply(message_count: usize, summary: &str) -> String {
    format!("Summary ({message_count} messages):\n\n{summary}")
}

#[must_use]
pub fn help_text() -> &'static str {
    "Hello!\n\
I summarize Telegram chats.\n\n\
Commands:\n\
/summarize\n\
/summarize 100\n\
/clear\n\
/stats"
}
