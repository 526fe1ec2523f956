//! Speech bridge: microphone in, speakers out
//!
//! Ties capture, transcription, synthesis, and playback together for the
//! voice session loop. All audio stays in owned in-memory buffers, so
//! there are no temporary artifacts to clean up.
//!
//! cpal streams are not `Send`, so each capture or playback opens its
//! device inside `spawn_blocking` and drives it on the blocking thread
//! that owns it; async workers are never stalled by audio.

use crate::config::Config;
use crate::voice::capture::{AudioCapture, SAMPLE_RATE, StopSignal, samples_to_wav};
use crate::voice::playback::AudioPlayback;
use crate::voice::stt::SpeechToText;
use crate::voice::tts::TextToSpeech;
use crate::{Error, Result};

/// Voice round trip for a session: listen to the user, speak the reply
pub struct SpeechBridge {
    stt: SpeechToText,
    tts: TextToSpeech,
}

impl SpeechBridge {
    /// Build the speech clients. Audio devices are opened per operation,
    /// not held here.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            stt: SpeechToText::new(config.api_key.clone(), config.stt_model.clone())?,
            tts: TextToSpeech::new(
                config.api_key.clone(),
                config.tts_model.clone(),
                config.tts_voice.clone(),
                config.tts_speed,
            )?,
        })
    }

    /// Record until the signal fires and transcribe the result
    ///
    /// # Errors
    ///
    /// Returns `EmptyRecording` if nothing was captured, an `Audio`
    /// error if the device cannot be opened, or `Transcription` if the
    /// remote call fails
    pub async fn listen(&self, signal: &StopSignal) -> Result<String> {
        let signal = signal.clone();
        let samples = tokio::task::spawn_blocking(move || {
            let mut capture = AudioCapture::new()?;
            capture.capture_until_signal(&signal)
        })
        .await
        .map_err(|e| Error::Audio(format!("capture task failed: {e}")))??;

        let wav = samples_to_wav(&samples, SAMPLE_RATE)?;
        self.stt.transcribe(&wav).await
    }

    /// Synthesize and play a response, returning once playback completes.
    ///
    /// Speech failures must never crash the session loop: on any
    /// synthesis or playback error the text is surfaced on the console
    /// instead and the error is swallowed.
    pub async fn speak(&self, text: &str) {
        match self.tts.synthesize(text).await {
            Ok(mp3) => {
                let played = tokio::task::spawn_blocking(move || {
                    let mut playback = AudioPlayback::new()?;
                    playback.play_mp3(&mp3)
                })
                .await
                .map_err(|e| Error::Audio(format!("playback task failed: {e}")))
                .and_then(|result| result);

                if let Err(e) = played {
                    tracing::warn!(error = %e, "playback failed, falling back to text");
                    println!("(voice unavailable) {text}");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed, falling back to text");
                println!("(voice unavailable) {text}");
            }
        }
    }
}
