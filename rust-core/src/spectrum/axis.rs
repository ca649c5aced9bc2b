//! Frequency axis shared by every spectrum of a given configuration

use std::sync::Arc;

/// Bin center frequencies in Hz, k * sample_rate / N for k = 0..N/2-1
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyAxis {
    bin_width: f64,
    frequencies: Arc<[f64]>,
}

impl FrequencyAxis {
    pub fn new(sample_rate: f64, frame_size: usize) -> Self {
        let bin_width = sample_rate / frame_size as f64;
        let frequencies = (0..frame_size / 2).map(|k| k as f64 * bin_width).collect();

        Self {
            bin_width,
            frequencies,
        }
    }

    /// Spacing between adjacent bins in Hz
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Cheap handle for publishing alongside per-frame results
    pub fn shared(&self) -> Arc<[f64]> {
        Arc::clone(&self.frequencies)
    }

    /// Number of bins whose frequency lies in [min_hz, max_hz)
    pub fn count_in_band(&self, min_hz: f64, max_hz: f64) -> usize {
        self.frequencies
            .iter()
            .filter(|&&f| f >= min_hz && f < max_hz)
            .count()
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}
