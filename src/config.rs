//! Configuration management for crewmind
//!
//! All settings come from environment variables with sensible defaults;
//! only the `OpenAI` API key is required.

use std::path::PathBuf;

use crate::{Error, Result};

/// Default directory for saved session records
pub const DEFAULT_SESSIONS_DIR: &str = "sessions";

/// Crewmind configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// `OpenAI` API key (chat completion, STT, TTS)
    pub api_key: String,

    /// Chat-completion model identifier
    pub chat_model: String,

    /// STT model (e.g. "whisper-1")
    pub stt_model: String,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice selector (alloy, echo, fable, onyx, nova, shimmer)
    pub tts_voice: String,

    /// TTS playback speed multiplier
    pub tts_speed: f32,

    /// Directory where closed session records are written
    pub sessions_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment (env > default)
    ///
    /// # Errors
    ///
    /// Returns error if `OPENAI_API_KEY` is not set
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY is required".to_string()))?;

        if api_key.is_empty() {
            return Err(Error::Config("OPENAI_API_KEY is empty".to_string()));
        }

        let config = Self {
            api_key,
            chat_model: std::env::var("CREWMIND_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            stt_model: std::env::var("CREWMIND_STT_MODEL")
                .unwrap_or_else(|_| "whisper-1".to_string()),
            tts_model: std::env::var("CREWMIND_TTS_MODEL")
                .unwrap_or_else(|_| "tts-1".to_string()),
            tts_voice: std::env::var("CREWMIND_TTS_VOICE")
                .unwrap_or_else(|_| "alloy".to_string()),
            tts_speed: std::env::var("CREWMIND_TTS_SPEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sessions_dir: std::env::var("CREWMIND_SESSIONS_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_SESSIONS_DIR), PathBuf::from),
        };

        tracing::debug!(
            chat_model = %config.chat_model,
            stt_model = %config.stt_model,
            tts_model = %config.tts_model,
            tts_voice = %config.tts_voice,
            sessions_dir = %config.sessions_dir.display(),
            "loaded configuration"
        );

        Ok(config)
    }
}
