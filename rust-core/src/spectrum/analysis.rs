//! Per-frame harmonic analyzer
//!
//! Combines windowing, the transform and harmonic estimation for one fixed
//! configuration.

use super::axis::FrequencyAxis;
use super::fft::SpectralTransformer;
use super::harmonic::{HarmonicEstimator, HarmonicPeak};
use super::windowing::Windower;
use crate::audio::Frame;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, SpectrumError};
use log::warn;

/// Result of analyzing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameAnalysis {
    /// Normalized magnitudes for bins 0..N/2 (DC zeroed)
    pub magnitudes: Vec<f64>,

    /// Coarse peak and refined estimate
    pub peak: HarmonicPeak,
}

impl FrameAnalysis {
    /// Refined dominant frequency in Hz (0 when none was found)
    pub fn harmonic_hz(&self) -> f64 {
        self.peak.frequency_hz
    }
}

/// Real-time harmonic analyzer
pub struct HarmonicAnalyzer {
    config: AnalysisConfig,
    windower: Windower,
    transformer: SpectralTransformer,
    estimator: HarmonicEstimator,
    axis: FrequencyAxis,

    /// Reusable windowed-frame buffer
    windowed: Vec<f64>,
}

impl HarmonicAnalyzer {
    /// Build an analyzer, failing fast on an invalid configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        let windower = Windower::new(config.window, config.frame_size);
        let transformer = SpectralTransformer::new(config.frame_size, config.amplitude_scale)?;
        let estimator = HarmonicEstimator::from_config(&config);
        let axis = FrequencyAxis::new(config.sample_rate, config.frame_size);

        if axis.count_in_band(estimator.min_hz(), estimator.max_hz()) == 0 {
            warn!(
                "No bins fall in [{} Hz, {} Hz); every estimate will be 0 Hz",
                estimator.min_hz(),
                estimator.max_hz()
            );
        }

        Ok(Self {
            windowed: vec![0.0; config.frame_size],
            config,
            windower,
            transformer,
            estimator,
            axis,
        })
    }

    /// Window, transform and estimate one frame
    pub fn analyze(&mut self, frame: &Frame) -> Result<FrameAnalysis, SpectrumError> {
        self.windower.apply_into(frame.samples(), &mut self.windowed)?;

        let magnitudes = self.transformer.magnitude_spectrum(&self.windowed)?;
        let peak = self.estimator.estimate(&magnitudes, self.axis.frequencies())?;

        Ok(FrameAnalysis { magnitudes, peak })
    }

    pub fn frequency_axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    pub fn estimator(&self) -> &HarmonicEstimator {
        &self.estimator
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn num_bins(&self) -> usize {
        self.transformer.num_bins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{FrameSource, ToneSource};
    use crate::spectrum::windows::WindowType;

    #[test]
    fn test_analyzer_tracks_tone() {
        let config = AnalysisConfig {
            sample_rate: 48000.0,
            frame_size: 2048,
            ..AnalysisConfig::default()
        };
        let mut analyzer = HarmonicAnalyzer::new(config).unwrap();
        let mut source = ToneSource::sine(48000.0, 1000.0, 0.7);

        let frame = source.acquire_frame(2048).unwrap();
        let result = analyzer.analyze(&frame).unwrap();

        assert_eq!(result.magnitudes.len(), 1024);
        assert_eq!(result.magnitudes[0], 0.0);
        assert!((result.harmonic_hz() - 1000.0).abs() < 23.4 / 4.0);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = AnalysisConfig {
            frame_size: 3000,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            HarmonicAnalyzer::new(config),
            Err(AnalysisError::Spectrum(SpectrumError::UnsupportedSize(3000)))
        ));
    }

    #[test]
    fn test_wrong_frame_length() {
        let mut analyzer = HarmonicAnalyzer::new(AnalysisConfig::default()).unwrap();
        let result = analyzer.analyze(&Frame::silence(1024));
        assert_eq!(
            result,
            Err(SpectrumError::SizeMismatch {
                expected: 2048,
                actual: 1024
            })
        );
    }

    #[test]
    fn test_every_window_finds_tone() {
        for window in [
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Rectangular,
        ] {
            let config = AnalysisConfig {
                window,
                frame_size: 4096,
                ..AnalysisConfig::default()
            };
            let mut analyzer = HarmonicAnalyzer::new(config).unwrap();
            let frame = ToneSource::sine(44100.0, 660.0, 0.8).acquire_frame(4096).unwrap();
            let estimate = analyzer.analyze(&frame).unwrap().harmonic_hz();

            assert!((estimate - 660.0).abs() < 11.0, "{} window gave {}", window, estimate);
        }
    }
}
