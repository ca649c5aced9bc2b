//! Dominant harmonic estimation
//!
//! Finds the strongest bin inside the admissible band, then refines its
//! position by fitting a parabola through the log magnitudes of the bin and
//! its two neighbors. For a windowed sinusoid the log-magnitude peak is close
//! to a parabola, so the vertex lands much nearer the true frequency than the
//! bin center does.

use crate::config::AnalysisConfig;
use crate::error::SpectrumError;

/// Floor applied to magnitudes before taking logarithms
pub const MAGNITUDE_FLOOR: f64 = 1e-5;

/// Coarse peak and refined frequency for one spectrum
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HarmonicPeak {
    /// Index of the strongest admissible bin (0 when the band holds no energy)
    pub bin: usize,

    /// Normalized magnitude of that bin
    pub magnitude: f64,

    /// Refined frequency in Hz, 0 when no harmonic is detectable
    pub frequency_hz: f64,
}

/// Band-limited peak picker with log-parabolic refinement
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicEstimator {
    min_hz: f64,
    max_hz: f64,
    bin_width: f64,
}

impl HarmonicEstimator {
    /// # Arguments
    /// * `min_hz` - Inclusive lower bound of the search band
    /// * `max_hz` - Exclusive upper bound of the search band
    /// * `bin_width` - sample_rate / frame_size
    pub fn new(min_hz: f64, max_hz: f64, bin_width: f64) -> Self {
        Self {
            min_hz,
            max_hz,
            bin_width,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.min_frequency_hz, config.max_frequency_hz(), config.bin_width())
    }

    /// Estimate the dominant frequency of a magnitude spectrum
    ///
    /// `axis[k]` must hold the frequency of `magnitudes[k]`.
    pub fn estimate(
        &self,
        magnitudes: &[f64],
        axis: &[f64],
    ) -> Result<HarmonicPeak, SpectrumError> {
        if magnitudes.len() != axis.len() {
            return Err(SpectrumError::SizeMismatch {
                expected: axis.len(),
                actual: magnitudes.len(),
            });
        }
        if magnitudes.is_empty() {
            return Ok(HarmonicPeak::default());
        }

        let (idx, y_max) = self.coarse_peak(magnitudes, axis);
        let last = magnitudes.len() - 1;

        // No neighbor on one side: report the bin itself
        if idx == 0 || idx == last {
            return Ok(HarmonicPeak {
                bin: idx,
                magnitude: y_max,
                frequency_hz: axis[idx],
            });
        }

        let delta = log_parabolic_offset(magnitudes[idx - 1], y_max, magnitudes[idx + 1]);
        let frequency_hz = self.bin_width * (idx as f64 + delta);

        Ok(HarmonicPeak {
            bin: idx,
            magnitude: y_max,
            frequency_hz: if frequency_hz > 0.0 { frequency_hz } else { 0.0 },
        })
    }

    /// Index and magnitude of the strongest bin in [min_hz, max_hz)
    ///
    /// Scans upward and updates on `>=`, so the last of several equal maxima
    /// wins. Bins with zero magnitude never qualify; when nothing in the band
    /// carries energy the result is `(0, 0.0)`, the pre-zeroed DC bin.
    pub fn coarse_peak(&self, magnitudes: &[f64], axis: &[f64]) -> (usize, f64) {
        let mut idx = 0;
        let mut y_max = 0.0;

        for (k, (&mag, &freq)) in magnitudes.iter().zip(axis).enumerate() {
            if freq < self.min_hz || freq >= self.max_hz {
                continue;
            }
            if mag > 0.0 && mag >= y_max {
                y_max = mag;
                idx = k;
            }
        }

        (idx, y_max)
    }

    pub fn min_hz(&self) -> f64 {
        self.min_hz
    }

    pub fn max_hz(&self) -> f64 {
        self.max_hz
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }
}

/// Fractional bin offset of the vertex of a parabola through three log magnitudes
///
/// δ = ln(y2/y0) / (2·ln(y1² / (y0·y2))), with every y floored at
/// [`MAGNITUDE_FLOOR`]. A flat neighborhood has no vertex and yields 0.
///
/// The result is limited to ±0.5. When `y1` is a local maximum the vertex
/// already lies within half a bin; the limit only bites when a stronger bin
/// outside the search band flanks the peak and the fitted parabola opens
/// upward, which would otherwise push the estimate away from the peak bin.
pub fn log_parabolic_offset(y0: f64, y1: f64, y2: f64) -> f64 {
    let y0 = y0.max(MAGNITUDE_FLOOR);
    let y1 = y1.max(MAGNITUDE_FLOOR);
    let y2 = y2.max(MAGNITUDE_FLOOR);

    let numerator = (y2 / y0).ln();
    let denominator = 2.0 * (y1 * y1 / (y0 * y2)).ln();

    let delta = numerator / denominator;
    if denominator.abs() < 1e-12 || !delta.is_finite() {
        0.0
    } else {
        delta.clamp(-0.5, 0.5)
    }
}
