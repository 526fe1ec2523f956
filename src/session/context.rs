//! Rolling conversation context
//!
//! A size-capped view of recent turns, sent with each completion request
//! to give the model short-term memory. This is not the session's
//! interaction log: that one is unbounded and append-only (see `record`).

use std::collections::VecDeque;

/// Maximum number of retained turns (user+assistant pairs)
pub const MAX_CONTEXT_TURNS: usize = 3;

/// One user-message/assistant-response pair
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Turn {
    /// What the user said
    pub user: String,
    /// What the assistant answered
    pub assistant: String,
}

/// Bounded FIFO buffer of the most recent turns
#[derive(Debug, Default)]
pub struct ConversationContext {
    turns: VecDeque<Turn>,
}

impl ConversationContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn, evicting the oldest when the buffer is full
    pub fn append(&mut self, user: &str, assistant: &str) {
        if self.turns.len() == MAX_CONTEXT_TURNS {
            self.turns.pop_front();
        }
        self.turns.push_back(Turn {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
    }

    /// Ordered read-only view of the retained turns, oldest first
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Clear to empty; called once at session start
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Number of retained turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the context holds no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_grows_until_cap() {
        let mut ctx = ConversationContext::new();
        for i in 0..MAX_CONTEXT_TURNS {
            ctx.append(&format!("u{i}"), &format!("a{i}"));
        }
        assert_eq!(ctx.len(), MAX_CONTEXT_TURNS);
    }

    #[test]
    fn fourth_turn_evicts_oldest() {
        let mut ctx = ConversationContext::new();
        ctx.append("u0", "a0");
        ctx.append("u1", "a1");
        ctx.append("u2", "a2");
        ctx.append("u3", "a3");

        let turns = ctx.snapshot();
        assert_eq!(turns.len(), MAX_CONTEXT_TURNS);
        assert!(!turns.iter().any(|t| t.user == "u0"));
        assert_eq!(turns[0].user, "u1");
        assert_eq!(turns[2].user, "u3");
    }

    #[test]
    fn snapshot_preserves_order_without_mutating() {
        let mut ctx = ConversationContext::new();
        ctx.append("first", "one");
        ctx.append("second", "two");

        let a = ctx.snapshot();
        let b = ctx.snapshot();
        assert_eq!(a, b);
        assert_eq!(a[0].user, "first");
        assert_eq!(a[1].user, "second");
    }

    #[test]
    fn reset_clears_everything() {
        let mut ctx = ConversationContext::new();
        ctx.append("u", "a");
        ctx.reset();
        assert!(ctx.is_empty());
        assert!(ctx.snapshot().is_empty());
    }
}
