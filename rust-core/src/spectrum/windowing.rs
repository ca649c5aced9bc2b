//! Frame windowing
//!
//! Removes the 8-bit DC bias and applies a precomputed window table before the
//! transform.

use super::windows::{generate_window, WindowType};
use crate::audio::Frame;
use crate::config::SAMPLE_BIAS;
use crate::error::SpectrumError;

/// Windower with a coefficient table fixed for one frame size
#[derive(Debug, Clone)]
pub struct Windower {
    window_type: WindowType,
    coefficients: Vec<f64>,
}

impl Windower {
    pub fn new(window_type: WindowType, frame_size: usize) -> Self {
        Self {
            window_type,
            coefficients: generate_window(window_type, frame_size),
        }
    }

    /// Window a frame into a newly allocated buffer
    ///
    /// output[i] = (raw[i] - 128) * w[i]
    pub fn apply(&self, frame: &Frame) -> Result<Vec<f64>, SpectrumError> {
        let mut output = vec![0.0; self.coefficients.len()];
        self.apply_into(frame.samples(), &mut output)?;
        Ok(output)
    }

    /// Window raw samples into a caller-owned buffer (no allocation)
    pub fn apply_into(&self, samples: &[u8], output: &mut [f64]) -> Result<(), SpectrumError> {
        let expected = self.coefficients.len();
        if samples.len() != expected {
            return Err(SpectrumError::SizeMismatch {
                expected,
                actual: samples.len(),
            });
        }
        if output.len() != expected {
            return Err(SpectrumError::SizeMismatch {
                expected,
                actual: output.len(),
            });
        }

        for ((out, &raw), &w) in output.iter_mut().zip(samples).zip(&self.coefficients) {
            *out = (f64::from(raw) - SAMPLE_BIAS) * w;
        }

        Ok(())
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Frame size this windower accepts
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_windows_to_zero() {
        let windower = Windower::new(WindowType::Hann, 256);
        let windowed = windower.apply(&Frame::silence(256)).unwrap();

        assert_eq!(windowed.len(), 256);
        assert!(windowed.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_bias_removed_before_window() {
        let windower = Windower::new(WindowType::Rectangular, 4);
        let frame = Frame::new(vec![0, 128, 255, 100]);
        let windowed = windower.apply(&frame).unwrap();

        assert_eq!(windowed, vec![-128.0, 0.0, 127.0, -28.0]);
    }

    #[test]
    fn test_hann_tapers_edges() {
        let windower = Windower::new(WindowType::Hann, 129);
        let windowed = windower.apply(&Frame::new(vec![228; 129])).unwrap();

        assert!(windowed[0].abs() < 1e-12);
        assert!((windowed[64] - 100.0).abs() < 1e-9);
        assert!(windowed[128].abs() < 1e-12);
    }

    #[test]
    fn test_size_mismatch() {
        let windower = Windower::new(WindowType::Hann, 512);
        let result = windower.apply(&Frame::silence(500));

        assert_eq!(
            result,
            Err(SpectrumError::SizeMismatch {
                expected: 512,
                actual: 500
            })
        );
    }
}
