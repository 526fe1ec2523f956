//! Audio playback to speakers

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Plays audio to the default output device
pub struct AudioPlayback {
    device: Device,
    config: StreamConfig,
}

impl AudioPlayback {
    /// Create a new audio playback instance
    ///
    /// # Errors
    ///
    /// Returns error if no output device supports the playback rate
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let rate = SampleRate(PLAYBACK_SAMPLE_RATE);
        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| c.channels() == 1 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .or_else(|| {
                // Fallback: stereo
                device
                    .supported_output_configs()
                    .ok()?
                    .find(|c| c.channels() == 2 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported.with_sample_rate(rate).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = PLAYBACK_SAMPLE_RATE,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self { device, config })
    }

    /// Play MP3 audio, blocking until playback completes
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(&mut self, mp3_data: &[u8]) -> Result<()> {
        let samples = decode_mp3(mp3_data)?;
        self.play(samples)
    }

    /// Play raw f32 samples, blocking until playback completes
    ///
    /// # Errors
    ///
    /// Returns error if the output stream cannot be opened
    pub fn play(&mut self, samples: Vec<f32>) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let channels = self.config.channels as usize;
        let samples = Arc::new(samples);
        let position = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let cb_samples = Arc::clone(&samples);
        let cb_position = Arc::clone(&position);
        let cb_finished = Arc::clone(&finished);

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let pos = cb_position.fetch_add(1, Ordering::Relaxed);
                        let sample = cb_samples.get(pos).copied().unwrap_or_else(|| {
                            cb_finished.store(true, Ordering::Relaxed);
                            0.0
                        });
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        // Wait for the cursor to drain, bounded by the nominal duration
        let duration_ms = (samples.len() as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(duration_ms + 500);

        while !finished.load(Ordering::Relaxed) {
            if std::time::Instant::now() > deadline {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }

        // Let the device flush its last block
        std::thread::sleep(std::time::Duration::from_millis(100));

        drop(stream);
        tracing::debug!(samples = samples.len(), "playback complete");
        Ok(())
    }
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if frame.channels == 2 {
                    // Stereo: average the channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}
