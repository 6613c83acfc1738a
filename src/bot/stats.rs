use std::collections::HashMap;
use std::fmt;

use crate::core::models::Message;

/// Message statistics over a conversation's stored history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatStats {
    pub total_messages: usize,
    pub distinct_senders: usize,
    pub most_active: Option<String>,
}

impl ChatStats {
    /// Counts messages per sender. On equal counts the sender seen first in
    /// `messages` wins, so the result depends only on stored order.
    #[must_use]
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut order: Vec<(&str, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for m in messages {
            match index.get(m.sender()).copied() {
                Some(i) => order[i].1 += 1,
                None => {
                    index.insert(m.sender(), order.len());
                    order.push((m.sender(), 1));
                }
            }
        }

        let mut most_active: Option<(&str, usize)> = None;
        for &(sender, count) in &order {
            if most_active.is_none_or(|(_, best)| count > best) {
                most_active = Some((sender, count));
            }
        }

        Self {
            total_messages: messages.len(),
            distinct_senders: order.len(),
            most_active: most_active.map(|(sender, _)| sender.to_string()),
        }
    }
}

impl fmt::Display for ChatStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Messages: {}\nUsers: {}\nMost active: {}",
            self.total_messages,
            self.distinct_senders,
            self.most_active.as_deref().unwrap_or("None")
        )
    }
}
