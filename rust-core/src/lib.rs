//! Harmonic Scope - Live Dominant-Frequency Analysis
//!
//! Windowed FFT magnitude spectra and sub-bin harmonic estimates for a live
//! 8-bit audio stream, with optional Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod spectrum;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use audio::{Frame, FrameSource, CpalFrameSource, ToneSource};
pub use config::{AnalysisConfig, load_config};
pub use engine::{AnalysisLoop, AnalysisOutput, HarmonicMonitor, Mailbox, ShutdownSignal};
pub use error::{AnalysisError, CaptureError, ConfigError, SpectrumError};
pub use spectrum::{HarmonicAnalyzer, HarmonicEstimator, WindowType};
