//! Raw audio frames and the source boundary that produces them

use crate::error::CaptureError;

/// One fixed-size block of unsigned 8-bit samples (DC bias 128)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Vec<u8>,
}

impl Frame {
    pub fn new(samples: Vec<u8>) -> Self {
        Self { samples }
    }

    /// Frame of `len` samples sitting at the bias level
    pub fn silence(len: usize) -> Self {
        Self::new(vec![128; len])
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<u8>> for Frame {
    fn from(samples: Vec<u8>) -> Self {
        Self::new(samples)
    }
}

/// Supplier of analysis frames
///
/// Implementations either return a complete frame of exactly `frame_size`
/// samples or an error; partial frames are never handed out.
pub trait FrameSource {
    /// Block until one fresh frame is available
    ///
    /// Fails with [`CaptureError::Timeout`] when no complete frame arrives
    /// within the source's buffering window, and with
    /// [`CaptureError::DeviceUnavailable`] when the device is gone.
    fn acquire_frame(&mut self, frame_size: usize) -> Result<Frame, CaptureError>;

    /// Release any device handles; further acquisitions fail
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn acquire_frame(&mut self, frame_size: usize) -> Result<Frame, CaptureError> {
        (**self).acquire_frame(frame_size)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Convert a normalized sample in [-1, 1] to the offset-128 8-bit encoding
#[inline]
pub fn quantize_u8(sample: f32) -> u8 {
    let scaled = (sample.clamp(-1.0, 1.0) * 127.0).round() + 128.0;
    scaled as u8
}
