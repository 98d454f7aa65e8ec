//! Audio input capture using cpal
//!
//! Captures the default input device as mono 16-bit PCM at 44.1 kHz

use super::buffer::PcmProducer;
use super::source::StreamFault;
use crate::spectrum::SAMPLE_RATE;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SizedSample, Stream, StreamConfig, SupportedStreamConfig};
use std::sync::mpsc;
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to query device configs: {0}")]
    SupportedConfigs(String),

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Device cannot capture at 44100 Hz in f32 or i16 (default rate: {0} Hz)")]
    UnsupportedSampleRate(u32),

    #[error("Audio input thread failed: {0}")]
    Thread(String),
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Audio input stream
pub struct AudioInput {
    stream: Stream,
    device_info: AudioDeviceInfo,
    fault: StreamFault,
}

impl AudioInput {
    /// Create audio input from default device
    ///
    /// # Arguments
    /// * `producer` - Ring buffer producer receiving mono PCM
    pub fn from_default_device(producer: PcmProducer) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::NoDevice)?;

        Self::from_device(device, producer)
    }

    /// Create audio input from specific device
    pub fn from_device(device: Device, producer: PcmProducer) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let supported = capture_config(&device)?;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };

        let fault = StreamFault::new();
        let stream = match sample_format {
            SampleFormat::F32 => build_mono_stream::<f32>(
                &device,
                &stream_config,
                producer,
                fault.clone(),
                |s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i32,
            )?,
            _ => build_mono_stream::<i16>(
                &device,
                &stream_config,
                producer,
                fault.clone(),
                |s| s as i32,
            )?,
        };

        log::info!(
            "Opened input '{}' ({} Hz, {} ch, {:?})",
            device_info.name,
            device_info.sample_rate,
            device_info.channels,
            sample_format
        );

        Ok(Self {
            stream,
            device_info,
            fault,
        })
    }

    /// Start capturing audio
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause audio capture
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }

    /// Fault flag tripped when the device disappears mid-stream
    pub fn fault(&self) -> StreamFault {
        self.fault.clone()
    }
}

/// Default input device kept open on a dedicated thread
///
/// cpal streams cannot move between threads, so the stream lives on its own
/// `audio-input` thread. Dropping the handle pauses and closes the device.
pub struct InputHandle {
    device_info: AudioDeviceInfo,
    fault: StreamFault,
    shutdown: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl InputHandle {
    /// Open and start the default input device
    pub fn open_default(producer: PcmProducer) -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("audio-input".into())
            .spawn(move || {
                let opened = AudioInput::from_default_device(producer).and_then(|input| {
                    input.start()?;
                    Ok(input)
                });
                let input = match opened {
                    Ok(input) => input,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok((input.device_info().clone(), input.fault())));

                // Returns once every sender is gone
                let _ = shutdown_rx.recv();
                if let Err(e) = input.pause() {
                    log::warn!("Failed to pause audio input: {}", e);
                }
                log::info!("Closed input '{}'", input.device_info().name);
            })
            .map_err(|e| AudioError::Thread(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok((device_info, fault))) => Ok(Self {
                device_info,
                fault,
                shutdown: Some(shutdown_tx),
                thread: Some(thread),
            }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => Err(AudioError::Thread("audio input thread exited".into())),
        }
    }

    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }

    pub fn fault(&self) -> StreamFault {
        self.fault.clone()
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        drop(self.shutdown.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Audio input thread panicked");
            }
        }
    }
}

/// Pick a 44.1 kHz config, preferring fewer channels and f32 samples
fn capture_config(device: &Device) -> Result<SupportedStreamConfig, AudioError> {
    let target = cpal::SampleRate(SAMPLE_RATE);

    let chosen = device
        .supported_input_configs()
        .map_err(|e| AudioError::SupportedConfigs(e.to_string()))?
        .filter(|range| matches!(range.sample_format(), SampleFormat::F32 | SampleFormat::I16))
        .filter(|range| range.min_sample_rate() <= target && target <= range.max_sample_rate())
        .min_by_key(|range| (range.channels(), range.sample_format() != SampleFormat::F32));

    match chosen {
        Some(range) => Ok(range.with_sample_rate(target)),
        None => {
            let default_rate = device
                .default_input_config()
                .map(|c| c.sample_rate().0)
                .unwrap_or(0);
            Err(AudioError::UnsupportedSampleRate(default_rate))
        }
    }
}

/// Build an input stream that downmixes interleaved frames to mono PCM
fn build_mono_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut producer: PcmProducer,
    fault: StreamFault,
    to_pcm: fn(T) -> i32,
) -> Result<Stream, AudioError>
where
    T: SizedSample + Send + 'static,
{
    let channels = config.channels.max(1) as usize;
    let mut mono: Vec<i16> = Vec::with_capacity(4096);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                mono.clear();
                mono.extend(data.chunks(channels).map(|frame| {
                    let sum: i32 = frame.iter().map(|&s| to_pcm(s)).sum();
                    (sum / frame.len() as i32) as i16
                }));
                producer.write(&mono);
            },
            move |err| match err {
                cpal::StreamError::DeviceNotAvailable => {
                    log::error!("Audio input device is no longer available");
                    fault.trip("audio input device is no longer available");
                }
                other => log::warn!("Audio input error: {}", other),
            },
            None,
        )
        .map_err(|e| AudioError::BuildStream(e.to_string()))
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_input_config() {
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}
