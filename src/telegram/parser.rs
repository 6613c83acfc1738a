use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{TelegramMessage, Update};
use crate::core::models::{Command, CommandInvocation, ConversationId, InboundMessage};

/// What an update means to the bot.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Message(InboundMessage),
    Command(CommandInvocation),
}

/// A bot command in message text: `/name`, `/name@bot`, each optionally
/// followed by arguments.
static COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^/([A-Za-z0-9_]+)(?:@([A-Za-z0-9_]+))?(?:\s+(.*))?$")
        .expect("static regex compile")
});

/// Parses `text` as a command addressed to this bot.
///
/// Returns `None` for plain text, unknown commands, and commands addressed to
/// another bot via `@username`. The `@username` check is skipped when
/// `bot_username` is not known.
#[must_use]
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<(Command, Vec<String>)> {
    let caps = COMMAND_RE.captures(text)?;
    let command = Command::from_name(&caps[1])?;

    if let (Some(target), Some(ours)) = (caps.get(2), bot_username)
        && !target.as_str().eq_ignore_ascii_case(ours)
    {
        return None;
    }

    let arguments = caps
        .get(3)
        .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    Some((command, arguments))
}

/// Classifies an update into a command or a message worth storing.
///
/// Updates without a message, and messages with neither text nor caption,
/// yield `None`.
#[must_use]
pub fn classify_update(update: &Update, bot_username: Option<&str>) -> Option<ChatEvent> {
    let message = update.message.as_ref()?;
    let conversation_id = ConversationId(message.chat.id);

    if let Some((command, arguments)) = message
        .text
        .as_deref()
        .and_then(|text| parse_command(text, bot_username))
    {
        return Some(ChatEvent::Command(CommandInvocation {
            conversation_id,
            conversation_display_name: message.chat.display_name().to_string(),
            command,
            arguments,
        }));
    }

    if !has_content(message) {
        return None;
    }

    Some(ChatEvent::Message(InboundMessage {
        conversation_id,
        sender_display_name: message.from.as_ref().map(|u| u.first_name.clone()),
        text: message.text.clone(),
        caption: message.caption.clone(),
        timestamp: message_time(message.date),
        is_automated_sender: message.from.as_ref().is_some_and(|u| u.is_bot),
    }))
}

fn has_content(message: &TelegramMessage) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    present(&message.text) || present(&message.caption)
}

fn message_time(unix_secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(unix_secs, 0).unwrap_or_else(Utc::now)
}
