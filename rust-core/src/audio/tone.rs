//! Synthetic tone source
//!
//! Deterministic stand-in for a capture device: a sum of sinusoids quantized to
//! 8-bit samples, phase-continuous across frames.

use super::frame::{quantize_u8, Frame, FrameSource};
use crate::error::CaptureError;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

/// One sinusoidal component of a synthetic signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub frequency_hz: f64,
    /// Peak amplitude relative to full scale
    pub amplitude: f64,
}

/// Frame source generating a mix of sinusoids
#[derive(Debug, Clone)]
pub struct ToneSource {
    sample_rate: f64,
    partials: Vec<Partial>,
    /// Absolute sample index of the next frame's first sample
    position: u64,
    /// Emulate device timing by sleeping until each frame would have been captured
    realtime: bool,
    started: Option<Instant>,
    released: bool,
}

impl ToneSource {
    /// Silent source at the given sample rate; add components with [`ToneSource::with_partial`]
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            partials: Vec::new(),
            position: 0,
            realtime: false,
            started: None,
            released: false,
        }
    }

    /// Single tone at `amplitude` of full scale
    pub fn sine(sample_rate: f64, frequency_hz: f64, amplitude: f64) -> Self {
        Self::new(sample_rate).with_partial(frequency_hz, amplitude)
    }

    pub fn with_partial(mut self, frequency_hz: f64, amplitude: f64) -> Self {
        self.partials.push(Partial {
            frequency_hz,
            amplitude,
        });
        self
    }

    pub fn with_realtime_pacing(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn sample_at(&self, index: u64) -> f32 {
        let t = index as f64 / self.sample_rate;
        let value: f64 = self
            .partials
            .iter()
            .map(|p| p.amplitude * (2.0 * PI * p.frequency_hz * t).sin())
            .sum();
        value as f32
    }

    fn wait_for_capture(&mut self, frame_end: u64) {
        let started = *self.started.get_or_insert_with(Instant::now);
        let due = started + Duration::from_secs_f64(frame_end as f64 / self.sample_rate);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
    }
}

impl FrameSource for ToneSource {
    fn acquire_frame(&mut self, frame_size: usize) -> Result<Frame, CaptureError> {
        if self.released {
            return Err(CaptureError::DeviceUnavailable("tone source released".into()));
        }

        let start = self.position;
        let end = start + frame_size as u64;
        if self.realtime {
            self.wait_for_capture(end);
        }

        let samples = (start..end).map(|n| quantize_u8(self.sample_at(n))).collect();
        self.position = end;

        Ok(Frame::new(samples))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_source_sits_at_bias() {
        let mut source = ToneSource::new(8000.0);
        let frame = source.acquire_frame(256).unwrap();
        assert!(frame.samples().iter().all(|&s| s == 128));
    }

    #[test]
    fn test_frames_are_phase_continuous() {
        let mut split = ToneSource::sine(8000.0, 440.0, 0.8);
        let mut whole = ToneSource::sine(8000.0, 440.0, 0.8);

        let a = split.acquire_frame(128).unwrap();
        let b = split.acquire_frame(128).unwrap();
        let ab = whole.acquire_frame(256).unwrap();

        assert_eq!(&ab.samples()[..128], a.samples());
        assert_eq!(&ab.samples()[128..], b.samples());
    }

    #[test]
    fn test_released_source_fails() {
        let mut source = ToneSource::sine(8000.0, 440.0, 0.5);
        source.release();
        assert!(matches!(
            source.acquire_frame(64),
            Err(CaptureError::DeviceUnavailable(_))
        ));
    }
}
