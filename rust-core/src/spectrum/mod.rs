//! Spectral analysis: windowing, transform and harmonic estimation

pub mod windows;
pub mod windowing;
pub mod fft;
pub mod axis;
pub mod harmonic;
pub mod analysis;

pub use windows::{WindowType, generate_window};
pub use windowing::Windower;
pub use fft::SpectralTransformer;
pub use axis::FrequencyAxis;
pub use harmonic::{HarmonicEstimator, HarmonicPeak, log_parabolic_offset};
pub use analysis::{FrameAnalysis, HarmonicAnalyzer};
