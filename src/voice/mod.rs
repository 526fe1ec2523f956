//! Voice processing module
//!
//! Handles signal-gated audio capture, transcription, synthesis, and
//! playback. STT and TTS go over HTTP; capture and playback use the
//! local default devices.

mod bridge;
mod capture;
mod playback;
mod stt;
mod tts;

pub use bridge::SpeechBridge;
pub use capture::{AudioCapture, SAMPLE_RATE, StopSignal, rms_energy, samples_to_wav};
pub use playback::AudioPlayback;
pub use stt::SpeechToText;
pub use tts::TextToSpeech;
