//! cpal-based audio capture
//!
//! Uses the cpal crate for cross-platform audio input.
//! Works with PipeWire, PulseAudio, and ALSA backends.
//!
//! Note: cpal::Stream is not Send, so we run the audio capture in a
//! dedicated thread and communicate via channels.

use super::{frame_len, FrameSource};
use crate::config::VoiceConfig;
use crate::error::AudioError;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// How long to wait for the device to deliver audio before giving up
const CHUNK_TIMEOUT: Duration = Duration::from_secs(2);

/// Parameters for building an audio input stream
struct StreamBuildParams {
    tx: mpsc::Sender<Vec<f32>>,
    source_rate: u32,
    target_rate: u32,
    source_channels: usize,
}

/// Live microphone capture delivering fixed-size frames
///
/// The stream runs until this value is dropped.
pub struct CpalCapture {
    /// Resampled mono chunks from the capture thread
    chunk_rx: mpsc::Receiver<Vec<f32>>,
    /// Dropping this tells the capture thread to stop
    stop_tx: Option<mpsc::Sender<()>>,
    /// Handle to the capture thread
    thread_handle: Option<thread::JoinHandle<()>>,
    /// Samples received but not yet handed out
    pending: Vec<f32>,
    frame_len: usize,
}

impl CpalCapture {
    /// Open the configured input device and start streaming
    pub fn open(config: &VoiceConfig) -> Result<Self, AudioError> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();

        let device = if config.device == "default" {
            host.default_input_device()
                .ok_or_else(|| AudioError::DeviceNotFound("default".to_string()))?
        } else {
            find_audio_device(&host, &config.device)?
        };

        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        tracing::info!("Using audio device: {}", device_name);

        let supported_config = device
            .default_input_config()
            .map_err(|e| AudioError::Connection(e.to_string()))?;

        let source_sample_rate = supported_config.sample_rate().0;
        let source_channels = supported_config.channels() as usize;
        let target_sample_rate = config.sample_rate;
        let sample_format = supported_config.sample_format();

        tracing::debug!(
            "Device config: {} Hz, {} channel(s), format: {:?}",
            source_sample_rate,
            source_channels,
            sample_format
        );

        let (chunk_tx, chunk_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let thread_handle = thread::spawn(move || {
            let stream_config = cpal::StreamConfig {
                channels: supported_config.channels(),
                sample_rate: supported_config.sample_rate(),
                buffer_size: cpal::BufferSize::Default,
            };

            let err_fn = |err| tracing::error!("Audio stream error: {}", err);

            let params = StreamBuildParams {
                tx: chunk_tx,
                source_rate: source_sample_rate,
                target_rate: target_sample_rate,
                source_channels,
            };

            let stream_result = match sample_format {
                cpal::SampleFormat::F32 => {
                    build_stream::<f32>(&device, &stream_config, params, err_fn)
                }
                cpal::SampleFormat::I16 => {
                    build_stream::<i16>(&device, &stream_config, params, err_fn)
                }
                cpal::SampleFormat::U16 => {
                    build_stream::<u16>(&device, &stream_config, params, err_fn)
                }
                format => Err(AudioError::StreamError(format!(
                    "Unsupported sample format: {:?}",
                    format
                ))),
            };

            let stream = match stream_result {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(AudioError::StreamError(e.to_string())));
                return;
            }

            let _ = ready_tx.send(Ok(()));
            tracing::debug!("Audio capture thread started");

            // Blocks until the owner drops its sender
            let _ = stop_rx.recv();
            drop(stream);

            tracing::debug!("Audio capture thread stopped");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread_handle.join();
                return Err(AudioError::StreamError(
                    "Capture thread exited during startup".to_string(),
                ));
            }
        }

        Ok(Self {
            chunk_rx,
            stop_tx: Some(stop_tx),
            thread_handle: Some(thread_handle),
            pending: Vec::new(),
            frame_len: frame_len(config).max(1),
        })
    }
}

impl FrameSource for CpalCapture {
    fn read_frame(&mut self) -> Result<Option<Vec<i16>>, AudioError> {
        while self.pending.len() < self.frame_len {
            match self.chunk_rx.recv_timeout(CHUNK_TIMEOUT) {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(AudioError::StreamError(format!(
                        "No audio received for {}s",
                        CHUNK_TIMEOUT.as_secs()
                    )))
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }

        Ok(take_frame(&mut self.pending, self.frame_len))
    }
}

/// Cut one frame of 16-bit samples off the front of the buffer
fn take_frame(pending: &mut Vec<f32>, frame_len: usize) -> Option<Vec<i16>> {
    if pending.len() < frame_len {
        return None;
    }
    Some(pending.drain(..frame_len).map(to_i16).collect())
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Convert a float sample to 16-bit PCM
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// How well a device name matches the configured one, lower is better
///
/// 0: exact, 1: exact ignoring case, 2: contains the requested name
/// ignoring case. Short PipeWire/PulseAudio names and partial names both work.
fn match_rank(name: &str, requested: &str) -> Option<u8> {
    let name_lower = name.to_lowercase();
    let requested_lower = requested.to_lowercase();
    if name == requested {
        Some(0)
    } else if name_lower == requested_lower {
        Some(1)
    } else if name_lower.contains(&requested_lower) {
        Some(2)
    } else {
        None
    }
}

/// Find an input device by name, listing the available ones on failure
fn find_audio_device(host: &cpal::Host, device_name: &str) -> Result<cpal::Device, AudioError> {
    use cpal::traits::{DeviceTrait, HostTrait};

    let mut names = Vec::new();
    let mut best: Option<(u8, String, cpal::Device)> = None;

    for device in host
        .input_devices()
        .map_err(|e| AudioError::Connection(e.to_string()))?
    {
        let Ok(name) = device.name() else {
            continue;
        };
        if let Some(rank) = match_rank(&name, device_name) {
            if best.as_ref().map_or(true, |(current, _, _)| rank < *current) {
                best = Some((rank, name.clone(), device));
            }
        }
        names.push(name);
    }

    if let Some((rank, name, device)) = best {
        tracing::debug!(
            "Found audio device {} (searched for: {}, rank {})",
            name,
            device_name,
            rank
        );
        return Ok(device);
    }

    let available = if names.is_empty() {
        "No audio input devices found.".to_string()
    } else {
        format!(
            "Available devices:\n{}",
            names
                .iter()
                .map(|n| format!("  - {}", n))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    Err(AudioError::DeviceNotFoundWithList {
        requested: device_name.to_string(),
        available,
    })
}

/// Build an input stream for a specific sample type
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    params: StreamBuildParams,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::Sample + cpal::SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    use cpal::traits::DeviceTrait;

    let StreamBuildParams {
        tx,
        source_rate,
        target_rate,
        source_channels,
    } = params;

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Convert to f32 and mix to mono
                let mono_f32: Vec<f32> = data
                    .chunks(source_channels)
                    .map(|frame| {
                        let sum: f32 = frame
                            .iter()
                            .map(|&s| <f32 as cpal::FromSample<T>>::from_sample_(s))
                            .sum();
                        sum / source_channels as f32
                    })
                    .collect();

                // Resample if needed
                let resampled = if source_rate != target_rate {
                    resample(&mono_f32, source_rate, target_rate)
                } else {
                    mono_f32
                };

                // Receiver is gone once capture is dropped
                let _ = tx.send(resampled);
            },
            err_fn,
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))?;

    Ok(stream)
}

/// Linear interpolation resampling
/// For better quality, consider using the `rubato` crate
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let new_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_idx = i as f64 / ratio;
        let idx = src_idx.floor() as usize;
        let frac = (src_idx - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else {
            samples.get(idx).copied().unwrap_or(0.0)
        };

        output.push(sample);
    }

    output
}
