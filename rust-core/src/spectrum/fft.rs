//! Magnitude spectrum via realfft
//!
//! Real-to-complex transform of one windowed frame, normalized to the sample
//! amplitude range.

use crate::error::SpectrumError;
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Transform engine for one fixed frame size
pub struct SpectralTransformer {
    /// FFT size (number of samples)
    fft_size: usize,

    /// Normalization denominator: amplitude_scale * fft_size
    norm: f64,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Reusable input buffer (overwritten by the transform)
    input_buffer: Vec<f64>,

    /// Reusable output buffer (fft_size/2 + 1 complex bins)
    output_buffer: Vec<Complex<f64>>,

    scratch: Vec<Complex<f64>>,
}

impl SpectralTransformer {
    /// Create a transformer
    ///
    /// # Arguments
    /// * `fft_size` - Transform length N, a power of two >= 2
    /// * `amplitude_scale` - Full-scale sample amplitude (128 for 8-bit audio)
    pub fn new(fft_size: usize, amplitude_scale: f64) -> Result<Self, SpectrumError> {
        if fft_size < 2 || !fft_size.is_power_of_two() {
            return Err(SpectrumError::UnsupportedSize(fft_size));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Ok(Self {
            fft_size,
            norm: amplitude_scale * fft_size as f64,
            r2c,
            input_buffer,
            output_buffer,
            scratch,
        })
    }

    /// Compute the normalized magnitude spectrum
    ///
    /// # Returns
    /// N/2 magnitudes |X[k]| / (scale * N) for k = 0..N/2-1, with k = 0 forced to 0
    pub fn magnitude_spectrum(&mut self, signal: &[f64]) -> Result<Vec<f64>, SpectrumError> {
        let mut magnitudes = vec![0.0; self.num_bins()];
        self.magnitude_spectrum_into(signal, &mut magnitudes)?;
        Ok(magnitudes)
    }

    /// Compute the normalized magnitude spectrum into a caller-owned buffer
    pub fn magnitude_spectrum_into(
        &mut self,
        signal: &[f64],
        magnitudes: &mut [f64],
    ) -> Result<(), SpectrumError> {
        if signal.len() != self.fft_size {
            return Err(SpectrumError::SizeMismatch {
                expected: self.fft_size,
                actual: signal.len(),
            });
        }
        if magnitudes.len() != self.num_bins() {
            return Err(SpectrumError::SizeMismatch {
                expected: self.num_bins(),
                actual: magnitudes.len(),
            });
        }

        self.input_buffer.copy_from_slice(signal);
        self.r2c
            .process_with_scratch(
                &mut self.input_buffer,
                &mut self.output_buffer,
                &mut self.scratch,
            )
            .map_err(|e| SpectrumError::Transform(e.to_string()))?;

        for (mag, bin) in magnitudes.iter_mut().zip(&self.output_buffer) {
            *mag = bin.norm() / self.norm;
        }

        // DC carries the sample bias, not pitch
        magnitudes[0] = 0.0;

        Ok(())
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of magnitude bins returned (fft_size / 2, Nyquist excluded)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }
}
