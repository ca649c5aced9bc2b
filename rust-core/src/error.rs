//! Error types shared across the capture, spectrum and engine modules

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while acquiring frames from an audio source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("No complete frame of {frame_size} samples within {waited:?}")]
    Timeout { frame_size: usize, waited: Duration },

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to play stream: {0}")]
    PlayStream(String),

    #[error("Device does not support {requested} Hz capture")]
    UnsupportedSampleRate { requested: u32 },
}

impl CaptureError {
    /// Whether the analysis loop may skip this cycle and try again
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CaptureError::Timeout { .. })
    }
}

/// Errors raised by the windowing / transform / estimation stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpectrumError {
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported transform size {0} (must be a power of two, at least 2)")]
    UnsupportedSize(usize),

    #[error("FFT processing failed: {0}")]
    Transform(String),
}

/// Invalid or unreadable analysis configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Sample rate must be positive and finite (got {0})")]
    InvalidSampleRate(f64),

    #[error("Minimum frequency must be non-negative and finite (got {0})")]
    InvalidMinFrequency(f64),

    #[error("Maximum frequency fraction must be positive and finite (got {0})")]
    InvalidMaxFraction(f64),

    #[error("Amplitude scale must be positive and finite (got {0})")]
    InvalidAmplitudeScale(f64),

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error for building and running the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Analysis thread terminated unexpectedly")]
    ThreadPanicked,
}
