//! Session orchestrator
//!
//! Drives the session lifecycle: opens records, routes user messages
//! through the bounded context and the chat-completion backend, and
//! closes sessions with a model-derived summary persisted to disk.
//!
//! One orchestrator owns exactly one active session/context pair;
//! concurrent sessions require one orchestrator instance each.

use std::path::PathBuf;

use chrono::Utc;

use crate::completion::CompletionBackend;
use crate::session::{ConversationContext, SessionRecord, SessionStore};
use crate::{Error, Result, prompts};

/// Token budget for a per-turn response
const REPLY_MAX_TOKENS: u32 = 500;
/// Temperature for per-turn responses; low for consistency
const REPLY_TEMPERATURE: f32 = 0.4;
/// Token budget for the end-of-session summary
const SUMMARY_MAX_TOKENS: u32 = 1000;
/// Temperature for the summary request
const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Result of ending a session
#[derive(Debug)]
pub enum SessionOutcome {
    /// There was no open session
    NothingToSave,
    /// The session closed and its record was written
    Saved {
        /// Where the artifact landed
        path: PathBuf,
        /// Parsed session summary
        summary: String,
        /// Parsed insights, possibly empty
        key_insights: Vec<String>,
        /// Parsed action items, possibly empty
        action_items: Vec<String>,
    },
}

/// Shape of the summary object embedded in the closing completion.
/// Missing keys fall back rather than failing the parse.
#[derive(serde::Deserialize)]
struct SummaryFields {
    #[serde(default = "missing_summary")]
    summary: String,
    #[serde(default)]
    key_insights: Vec<String>,
    #[serde(default)]
    action_items: Vec<String>,
}

fn missing_summary() -> String {
    "No summary provided".to_string()
}

/// Conversational therapist driving one session at a time
pub struct Therapist {
    completion: Box<dyn CompletionBackend>,
    store: SessionStore,
    current: Option<SessionRecord>,
    context: ConversationContext,
    past_sessions: Vec<SessionRecord>,
}

impl Therapist {
    /// Create an orchestrator with no open session
    #[must_use]
    pub fn new(completion: Box<dyn CompletionBackend>, store: SessionStore) -> Self {
        Self {
            completion,
            store,
            current: None,
            context: ConversationContext::new(),
            past_sessions: Vec::new(),
        }
    }

    /// Open a new session, replacing the record and resetting the context.
    ///
    /// A previously open session that was never closed is abandoned in
    /// memory, not auto-saved.
    pub fn start_session(&mut self) -> String {
        if let Some(old) = self.current.take()
            && !old.is_closed()
        {
            tracing::warn!(
                session_id = %old.session_id,
                interactions = old.interactions.len(),
                "abandoning unsaved open session"
            );
        }

        let now = Utc::now();
        let session_id = now.format("%Y%m%d_%H%M%S").to_string();
        self.context.reset();
        self.current = Some(SessionRecord::open(session_id.clone(), now));

        tracing::info!(session_id = %session_id, "session started");
        session_id
    }

    /// Process one user message and return the assistant's response.
    ///
    /// Implicitly starts a session if none is open. On completion failure
    /// this returns an error-description string instead of raising, and
    /// leaves the record and context exactly as they were: a single failed
    /// turn must never crash the interactive loop.
    pub async fn process_message(&mut self, user_message: &str) -> String {
        if self.current.is_none() {
            self.start_session();
        }

        let history_len = self.current.as_ref().map_or(0, |r| r.interactions.len());
        let payload =
            prompts::interaction_payload(&self.context.snapshot(), user_message, history_len);

        match self
            .completion
            .complete(prompts::SYSTEM_PROMPT, &payload, REPLY_MAX_TOKENS, REPLY_TEMPERATURE)
            .await
        {
            Ok(response) => {
                if let Some(record) = self.current.as_mut()
                    && let Err(e) = record.record_interaction(user_message, &response)
                {
                    tracing::error!(error = %e, "failed to log interaction");
                }
                self.context.append(user_message, &response);
                response
            }
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                format!("Error: {e}")
            }
        }
    }

    /// End the open session: request a structured summary, close the
    /// record, and persist it.
    ///
    /// # Errors
    ///
    /// Returns `Completion` if the summary request fails and
    /// `SummaryParse` (with the raw response) if its output holds no
    /// parseable JSON object. In both cases the session stays OPEN and
    /// nothing is lost; the caller may retry.
    pub async fn end_session(&mut self) -> Result<SessionOutcome> {
        let Some(record) = self.current.as_ref() else {
            return Ok(SessionOutcome::NothingToSave);
        };

        // Only the user's side of the conversation feeds the summary
        let user_messages: Vec<String> = record
            .interactions
            .iter()
            .map(|i| i.user_message.clone())
            .collect();
        let payload = prompts::summary_payload(&user_messages);

        let raw = self
            .completion
            .complete(
                prompts::SUMMARY_PROMPT,
                &payload,
                SUMMARY_MAX_TOKENS,
                SUMMARY_TEMPERATURE,
            )
            .await?;

        let Some(span) = prompts::extract_json_object(&raw) else {
            tracing::warn!("summary response contained no JSON object; session stays open");
            return Err(Error::SummaryParse { raw });
        };
        let fields: SummaryFields = match serde_json::from_str(span) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(error = %e, "summary JSON failed to parse; session stays open");
                return Err(Error::SummaryParse { raw });
            }
        };

        // Parse succeeded: the session closes now, exactly once
        let Some(mut record) = self.current.take() else {
            return Ok(SessionOutcome::NothingToSave);
        };
        record.close(
            fields.summary.clone(),
            fields.key_insights.clone(),
            fields.action_items.clone(),
        )?;

        let saved = self.store.save(&record);
        // Keep the record recoverable in memory even if the write failed
        self.past_sessions.push(record);
        let path = saved?;

        Ok(SessionOutcome::Saved {
            path,
            summary: fields.summary,
            key_insights: fields.key_insights,
            action_items: fields.action_items,
        })
    }

    /// The open session record, if any
    #[must_use]
    pub fn current_session(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    /// Snapshot of the rolling context
    #[must_use]
    pub fn context_snapshot(&self) -> Vec<crate::session::Turn> {
        self.context.snapshot()
    }

    /// Sessions closed and saved by this orchestrator
    #[must_use]
    pub fn past_sessions(&self) -> &[SessionRecord] {
        &self.past_sessions
    }
}
