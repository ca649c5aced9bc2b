//! Analysis configuration
//!
//! Set once at startup and never mutated. Values can come from defaults, a TOML
//! file, or command-line overrides.

use crate::error::{AnalysisError, ConfigError, SpectrumError};
use crate::spectrum::windows::WindowType;
use serde::Deserialize;
use std::path::Path;

/// DC bias of unsigned 8-bit samples
pub const SAMPLE_BIAS: f64 = 128.0;

/// Harmonic analysis configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Frame size N (samples per analysis cycle, power of 2)
    pub frame_size: usize,

    /// Lowest frequency admitted to the peak search (Hz)
    pub min_frequency_hz: f64,

    /// Upper bound of the peak search as a fraction of the sample rate
    pub max_frequency_fraction: f64,

    /// Full-scale sample amplitude used to normalize magnitudes
    pub amplitude_scale: f64,

    /// Analysis window applied before the transform
    pub window: WindowType,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            frame_size: 2048,
            min_frequency_hz: 20.0,
            max_frequency_fraction: 0.5,
            amplitude_scale: 128.0,
            window: WindowType::Hann,
        }
    }
}

impl AnalysisConfig {
    /// Exclusive upper bound of the peak search in Hz
    pub fn max_frequency_hz(&self) -> f64 {
        self.sample_rate * self.max_frequency_fraction
    }

    /// Spacing between transform bins in Hz
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.frame_size as f64
    }

    /// Number of magnitude bins produced per frame (N/2)
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2
    }

    /// Check the configuration before any buffers are sized from it
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.frame_size.is_power_of_two() || self.frame_size < 2 {
            return Err(SpectrumError::UnsupportedSize(self.frame_size).into());
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate).into());
        }
        if !(self.min_frequency_hz.is_finite() && self.min_frequency_hz >= 0.0) {
            return Err(ConfigError::InvalidMinFrequency(self.min_frequency_hz).into());
        }
        if !(self.max_frequency_fraction.is_finite() && self.max_frequency_fraction > 0.0) {
            return Err(ConfigError::InvalidMaxFraction(self.max_frequency_fraction).into());
        }
        if !(self.amplitude_scale.is_finite() && self.amplitude_scale > 0.0) {
            return Err(ConfigError::InvalidAmplitudeScale(self.amplitude_scale).into());
        }
        Ok(())
    }
}

/// Load an analysis configuration from a TOML file
///
/// Missing keys fall back to [`AnalysisConfig::default`].
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
