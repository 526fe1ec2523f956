//! Crewmind - voice therapy companion for isolated habitat crews
//!
//! This library provides the core functionality for crewmind:
//! - Session lifecycle (open, interaction log, summarized close)
//! - Bounded conversation context for short-term model memory
//! - Signal-gated audio capture, STT, and TTS
//! - Chat-completion routing with a therapist persona
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Surfaces                          │
//! │        Text console       │      Voice loop          │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Therapist                           │
//! │  SessionRecord │ ConversationContext │ SessionStore  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External capabilities                   │
//! │    Chat completion  │  Whisper STT  │  TTS          │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod prompts;
pub mod session;
pub mod therapist;
pub mod voice;

pub use completion::{ChatCompletion, CompletionBackend};
pub use config::Config;
pub use error::{Error, Result};
pub use session::{ConversationContext, Interaction, SessionRecord, SessionStore, Turn};
pub use therapist::{SessionOutcome, Therapist};
pub use voice::{AudioCapture, AudioPlayback, SpeechBridge, SpeechToText, StopSignal, TextToSpeech};
