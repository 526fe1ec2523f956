//! Speech-to-text via the Whisper transcription API

use crate::{Error, Result};

#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl SpeechToText {
    /// Create a new STT instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for transcription".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        })
    }

    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns `Transcription` with the underlying cause on any failure
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Transcription(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Transcription(format!("API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("malformed response: {e}")))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}
