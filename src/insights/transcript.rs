//! Chat Transcript - bounded history of the insights conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Most recent turns first-in first-out, oldest dropped past `max_turns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTranscript")]
pub struct ChatTranscript {
    turns: VecDeque<ChatTurn>,
    max_turns: usize,
}

#[derive(Deserialize)]
struct StoredTranscript {
    turns: VecDeque<ChatTurn>,
    max_turns: usize,
}

impl From<StoredTranscript> for ChatTranscript {
    fn from(stored: StoredTranscript) -> Self {
        let mut transcript = Self::new(stored.max_turns);
        transcript.turns = stored.turns;
        transcript.trim();
        transcript
    }
}

impl ChatTranscript {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns: max_turns.max(2),
        }
    }

    /// Record a completed question / answer pair.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        let now = Utc::now();
        self.turns.push_back(ChatTurn {
            role: Role::User,
            content: question.into(),
            timestamp: now,
        });
        self.turns.push_back(ChatTurn {
            role: Role::Assistant,
            content: answer.into(),
            timestamp: now,
        });
        self.trim();
    }

    fn trim(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter()
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_order() {
        let mut transcript = ChatTranscript::default();
        transcript.push_exchange("Is my soil acidic?", "Slightly, pH 6.2.");
        let roles: Vec<Role> = transcript.turns().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(transcript.last_reply(), Some("Slightly, pH 6.2."));
    }

    #[test]
    fn test_oldest_turns_dropped() {
        let mut transcript = ChatTranscript::new(4);
        for i in 0..3 {
            transcript.push_exchange(format!("q{}", i), format!("a{}", i));
        }
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.turns().next().unwrap().content, "q1");
        assert_eq!(transcript.last_reply(), Some("a2"));

        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.last_reply(), None);
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_restored_transcript_respects_bound() {
        let mut long = ChatTranscript::new(10);
        for i in 0..5 {
            long.push_exchange(format!("q{}", i), format!("a{}", i));
        }
        let mut json = serde_json::to_value(&long).unwrap();
        json["max_turns"] = serde_json::json!(0);

        let restored: ChatTranscript = serde_json::from_value(json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.last_reply(), Some("a4"));
    }
}
