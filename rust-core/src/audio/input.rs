//! Audio input capture using cpal
//!
//! Live frame source: the device callback quantizes the first channel to 8-bit
//! samples and pushes them into a ring buffer that the analysis loop drains.

use super::buffer::{AudioConsumer, AudioProducer, AudioRingBuffer};
use super::frame::{quantize_u8, Frame, FrameSource};
use crate::error::CaptureError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    Device, FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig,
    SupportedStreamConfig,
};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Frames of headroom held by the capture ring buffer
const BUFFERED_FRAMES: usize = 8;

/// Acquisition timeout in frame periods when none is configured
const DEFAULT_TIMEOUT_FRAMES: f64 = 4.0;

/// Poll interval while waiting for a frame to fill
const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Audio input device information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// How to open the capture device
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Input device name; `None` selects the host's default input
    pub device_name: Option<String>,

    /// Required sample rate; `None` accepts the device default
    pub sample_rate: Option<u32>,

    /// Samples per analysis frame
    pub frame_size: usize,

    /// Longest wait for a complete frame; `None` means four frame periods
    pub timeout: Option<Duration>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            device_name: None,
            sample_rate: None,
            frame_size: 2048,
            timeout: None,
        }
    }
}

/// Frame source backed by a live input stream
pub struct CpalFrameSource {
    stream: Option<Stream>,
    consumer: AudioConsumer,
    device_info: AudioDeviceInfo,
    device_lost: Arc<AtomicBool>,
    timeout: Duration,
}

impl CpalFrameSource {
    /// Open and start capturing from the device described by `options`
    pub fn open(options: &CaptureOptions) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = match &options.device_name {
            Some(name) => find_input_device(&host, name)?,
            None => host
                .default_input_device()
                .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))?,
        };

        Self::from_device(device, options)
    }

    /// Open and start capturing from a specific device
    pub fn from_device(device: Device, options: &CaptureOptions) -> Result<Self, CaptureError> {
        let name = device
            .name()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let supported = select_config(&device, options.sample_rate)?;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();

        let device_info = AudioDeviceInfo {
            name,
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };

        let frame_size = options.frame_size.max(1);
        let rb = AudioRingBuffer::new(frame_size * BUFFERED_FRAMES);
        let (producer, consumer) = rb.split();
        let device_lost = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            SampleFormat::F32 => {
                build_capture_stream::<f32>(&device, &stream_config, producer, &device_lost)
            }
            SampleFormat::I16 => {
                build_capture_stream::<i16>(&device, &stream_config, producer, &device_lost)
            }
            SampleFormat::U16 => {
                build_capture_stream::<u16>(&device, &stream_config, producer, &device_lost)
            }
            SampleFormat::I32 => {
                build_capture_stream::<i32>(&device, &stream_config, producer, &device_lost)
            }
            SampleFormat::U8 => {
                build_capture_stream::<u8>(&device, &stream_config, producer, &device_lost)
            }
            other => Err(CaptureError::BuildStream(format!(
                "unsupported sample format {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| CaptureError::PlayStream(e.to_string()))?;

        let timeout = options.timeout.unwrap_or_else(|| {
            Duration::from_secs_f64(
                DEFAULT_TIMEOUT_FRAMES * frame_size as f64 / device_info.sample_rate as f64,
            )
        });

        info!(
            "Capturing from '{}' at {} Hz ({} channel(s), {:?})",
            device_info.name, device_info.sample_rate, device_info.channels, sample_format
        );

        Ok(Self {
            stream: Some(stream),
            consumer,
            device_info,
            device_lost,
            timeout,
        })
    }

    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl FrameSource for CpalFrameSource {
    fn acquire_frame(&mut self, frame_size: usize) -> Result<Frame, CaptureError> {
        if self.stream.is_none() {
            return Err(CaptureError::DeviceUnavailable("capture stream released".into()));
        }

        let started = Instant::now();
        let mut samples = vec![0u8; frame_size];

        loop {
            if self.device_lost.load(Ordering::SeqCst) {
                return Err(CaptureError::DeviceUnavailable(format!(
                    "'{}' stopped delivering audio",
                    self.device_info.name
                )));
            }

            if self.consumer.read_latest(&mut samples) {
                return Ok(Frame::new(samples));
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(CaptureError::Timeout { frame_size, waited });
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                debug!("Pausing capture stream failed: {}", e);
            }
            self.consumer.clear();
            let overruns = self.consumer.overruns();
            if overruns > 0 {
                warn!(
                    "Capture buffer overran: {} sample(s) dropped on '{}'",
                    overruns, self.device_info.name
                );
            }
            info!("Released capture device '{}'", self.device_info.name);
        }
    }
}

impl Drop for CpalFrameSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn build_capture_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut producer: AudioProducer,
    device_lost: &Arc<AtomicBool>,
) -> Result<Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    let device_lost = Arc::clone(device_lost);
    let mut scratch: Vec<u8> = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                // Interleaved input: keep the first channel
                scratch.clear();
                scratch.extend(
                    data.iter()
                        .step_by(channels)
                        .map(|&s| quantize_u8(f32::from_sample_(s))),
                );
                producer.write(&scratch);
            },
            move |err| {
                warn!("Audio input error: {}", err);
                if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                    device_lost.store(true, Ordering::SeqCst);
                }
            },
            None,
        )
        .map_err(|e| CaptureError::BuildStream(e.to_string()))
}

/// Pick a stream configuration, honoring a required sample rate when given
fn select_config(
    device: &Device,
    sample_rate: Option<u32>,
) -> Result<SupportedStreamConfig, CaptureError> {
    let default = device
        .default_input_config()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    let requested = match sample_rate {
        Some(rate) if rate != default.sample_rate().0 => rate,
        _ => return Ok(default),
    };

    let ranges = device
        .supported_input_configs()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    let mut fallback = None;
    for range in ranges {
        if range.min_sample_rate().0 > requested || range.max_sample_rate().0 < requested {
            continue;
        }
        if range.sample_format() == default.sample_format() {
            return Ok(range.with_sample_rate(SampleRate(requested)));
        }
        if fallback.is_none() {
            fallback = Some(range.with_sample_rate(SampleRate(requested)));
        }
    }

    fallback.ok_or(CaptureError::UnsupportedSampleRate { requested })
}

fn find_input_device(host: &cpal::Host, name: &str) -> Result<Device, CaptureError> {
    let mut devices = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    devices
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| CaptureError::DeviceUnavailable(format!("no input device named '{}'", name)))
}

/// List available audio input devices
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, CaptureError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

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
