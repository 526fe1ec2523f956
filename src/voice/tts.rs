//! Text-to-speech via the `OpenAI` speech API

use crate::{Error, Result};

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    model: String,
    voice: String,
    speed: f32,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String, voice: String, speed: f32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for speech synthesis".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            voice,
            speed,
        })
    }

    /// Synthesize text to MP3 audio bytes
    ///
    /// # Errors
    ///
    /// Returns `Synthesis` with the underlying cause on any failure
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "synthesis API error");
            return Err(Error::Synthesis(format!("API error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        tracing::debug!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}
