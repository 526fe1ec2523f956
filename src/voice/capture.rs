//! Audio capture from microphone
//!
//! Recording is gated on a user signal rather than a fixed duration: the
//! stream callback appends blocks to a shared buffer while the capture
//! loop polls a stop flag set by a concurrent key-press listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for audio capture
pub const SAMPLE_RATE: u32 = 44_100;

/// How often the capture loop checks the stop flag (roughly one block)
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Termination signal shared between a key-press listener and the capture
/// loop. The listener writes the flag; the loop polls it. No other state
/// is shared between the two.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Create an unset signal
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the signal as fired
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has fired
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the signal for reuse
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Captures audio from the default input device
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Create a new audio capture instance
    ///
    /// # Errors
    ///
    /// Returns error if no input device supports mono capture at the
    /// expected sample rate
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no suitable input config found".to_string()))?;

        let config = supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Record until the stop signal fires, then return the accumulated
    /// samples. Blocks the calling thread. The stream is torn down on
    /// every exit path.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRecording` if the signal fired before any audio was
    /// captured, or an `Audio` error if the device cannot be opened
    pub fn capture_until_signal(&mut self, signal: &StopSignal) -> Result<Vec<f32>> {
        self.start()?;

        let samples = await_signal_then_drain(signal, || {
            self.stop();
            self.take_buffer()
        })?;

        tracing::debug!(samples = samples.len(), "capture complete");
        Ok(samples)
    }

    /// Start capturing audio into the shared buffer
    ///
    /// # Errors
    ///
    /// Returns error if the input stream cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let buffer = Arc::clone(&self.buffer);
        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    /// Stop capturing and release the stream
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("audio capture stopped");
        }
    }

    /// Drain the captured samples
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf: MutexGuard<'_, Vec<f32>>| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Whether a stream is currently open
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }
}

/// Core of `capture_until_signal`: poll until the signal fires, run the
/// teardown-and-drain step, then reject captures that produced no audio.
/// `finish` always runs, so the stream is released on both paths.
fn await_signal_then_drain(
    signal: &StopSignal,
    finish: impl FnOnce() -> Vec<f32>,
) -> Result<Vec<f32>> {
    while !signal.is_set() {
        std::thread::sleep(POLL_INTERVAL);
    }

    let samples = finish();
    if samples.is_empty() {
        return Err(Error::EmptyRecording);
    }
    Ok(samples)
}

/// Convert f32 samples to WAV bytes for the transcription API
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

/// RMS energy of a sample window, for the mic level meter
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_starts_unset() {
        let signal = StopSignal::new();
        assert!(!signal.is_set());
    }

    #[test]
    fn trigger_is_visible_through_clones() {
        let signal = StopSignal::new();
        let listener_side = signal.clone();
        listener_side.trigger();
        assert!(signal.is_set());
    }

    #[test]
    fn reset_allows_reuse() {
        let signal = StopSignal::new();
        signal.trigger();
        signal.reset();
        assert!(!signal.is_set());
    }

    #[test]
    fn empty_capture_fails_after_teardown() {
        let signal = StopSignal::new();
        signal.trigger();

        let torn_down = std::cell::Cell::new(false);
        let result = await_signal_then_drain(&signal, || {
            torn_down.set(true);
            Vec::new()
        });

        assert!(matches!(result, Err(Error::EmptyRecording)));
        assert!(torn_down.get(), "stream must be released before the error is returned");
    }

    #[test]
    fn captured_samples_pass_through_after_signal() {
        let signal = StopSignal::new();
        signal.trigger();

        let samples = await_signal_then_drain(&signal, || vec![0.1, -0.2, 0.3]).unwrap();
        assert_eq!(samples, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn drain_waits_until_the_signal_fires() {
        let signal = StopSignal::new();
        let trigger_side = signal.clone();
        let listener = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger_side.trigger();
        });

        let samples = await_signal_then_drain(&signal, || vec![0.5]).unwrap();
        assert_eq!(samples, vec![0.5]);
        listener.join().unwrap();
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms_energy(&[]), 0.0);
        assert_eq!(rms_energy(&[0.0; 64]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal_is_its_magnitude() {
        let rms = rms_energy(&[0.5; 128]);
        assert!((rms - 0.5).abs() < 1e-6);
    }
}
