//! Per-session record and its OPEN -> CLOSED state machine
//!
//! A record is created OPEN, accumulates timestamped interactions, and
//! closes exactly once: `end_time` and the three summary fields are set
//! together, and the interaction log is never mutated afterwards.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// One logged exchange within a session
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Interaction {
    /// When the exchange was recorded
    pub timestamp: DateTime<Utc>,
    /// What the user said
    pub user_message: String,
    /// What the assistant answered
    pub assistant_response: String,
}

/// One therapy session from open to close
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionRecord {
    /// Identifier derived from the creation timestamp (sortable)
    pub session_id: String,
    /// When the session opened
    pub start_time: DateTime<Utc>,
    /// When the session closed; `None` while open
    pub end_time: Option<DateTime<Utc>>,
    /// Ordered, append-only interaction log
    pub interactions: Vec<Interaction>,
    /// Synthesized session description; `None` until closed
    pub summary: Option<String>,
    /// Key psychological insights; empty until closed
    pub key_insights: Vec<String>,
    /// Recommendations for the client; empty until closed
    pub action_items: Vec<String>,
}

impl SessionRecord {
    /// Construct a record in the OPEN state
    #[must_use]
    pub fn open(session_id: String, start_time: DateTime<Utc>) -> Self {
        Self {
            session_id,
            start_time,
            end_time: None,
            interactions: Vec::new(),
            summary: None,
            key_insights: Vec::new(),
            action_items: Vec::new(),
        }
    }

    /// Whether the session has transitioned to CLOSED
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Append a timestamped interaction
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session is already closed
    pub fn record_interaction(&mut self, user_message: &str, assistant_response: &str) -> Result<()> {
        if self.is_closed() {
            return Err(Error::InvalidState(format!(
                "session {} is closed; interactions can no longer be recorded",
                self.session_id
            )));
        }

        self.interactions.push(Interaction {
            timestamp: Utc::now(),
            user_message: user_message.to_string(),
            assistant_response: assistant_response.to_string(),
        });
        Ok(())
    }

    /// Transition to CLOSED, setting `end_time` and the summary fields
    /// atomically. Terminal; there is no reopening.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session is already closed
    pub fn close(
        &mut self,
        summary: String,
        key_insights: Vec<String>,
        action_items: Vec<String>,
    ) -> Result<()> {
        if self.is_closed() {
            return Err(Error::InvalidState(format!(
                "session {} is already closed",
                self.session_id
            )));
        }

        self.end_time = Some(Utc::now());
        self.summary = Some(summary);
        self.key_insights = key_insights;
        self.action_items = action_items;
        Ok(())
    }
}
