//! Python bindings for per-frame harmonic analysis

use pyo3::prelude::*;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use numpy::{PyArray1, PyReadonlyArray1};
use crate::audio::Frame;
use crate::config::AnalysisConfig;
use crate::spectrum::{HarmonicAnalyzer, WindowType, log_parabolic_offset};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

/// Harmonic analyzer exposed to Python
#[pyclass(name = "HarmonicAnalyzer")]
pub struct PyHarmonicAnalyzer {
    analyzer: HarmonicAnalyzer,
}

#[pymethods]
impl PyHarmonicAnalyzer {
    /// Create a new harmonic analyzer
    ///
    /// Args:
    ///     sample_rate: Sample rate in Hz
    ///     frame_size: Samples per frame (power of 2)
    ///     min_frequency_hz: Lowest frequency considered for the peak
    ///     max_frequency_fraction: Upper search bound as a fraction of sample_rate
    ///     amplitude_scale: Full-scale sample amplitude
    ///     window_type: Analysis window
    #[new]
    #[pyo3(signature = (
        sample_rate=44100.0,
        frame_size=2048,
        min_frequency_hz=20.0,
        max_frequency_fraction=0.5,
        amplitude_scale=128.0,
        window_type=PyWindowType::Hann
    ))]
    fn new(
        sample_rate: f64,
        frame_size: usize,
        min_frequency_hz: f64,
        max_frequency_fraction: f64,
        amplitude_scale: f64,
        window_type: PyWindowType,
    ) -> PyResult<Self> {
        let config = AnalysisConfig {
            sample_rate,
            frame_size,
            min_frequency_hz,
            max_frequency_fraction,
            amplitude_scale,
            window: window_type.into(),
        };

        let analyzer = HarmonicAnalyzer::new(config)
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;

        Ok(Self { analyzer })
    }

    /// Analyze one frame of unsigned 8-bit samples
    ///
    /// Args:
    ///     frame: uint8 numpy array of exactly frame_size samples
    ///
    /// Returns:
    ///     Tuple of (magnitude spectrum, harmonic frequency in Hz)
    fn analyze<'py>(
        &mut self,
        py: Python<'py>,
        frame: PyReadonlyArray1<u8>,
    ) -> PyResult<(&'py PyArray1<f64>, f64)> {
        let samples = frame
            .as_slice()
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;

        let result = self
            .analyzer
            .analyze(&Frame::new(samples.to_vec()))
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;

        let harmonic = result.harmonic_hz();
        Ok((PyArray1::from_vec(py, result.magnitudes), harmonic))
    }

    /// Estimate the harmonic of an existing magnitude spectrum
    fn estimate(&self, magnitudes: PyReadonlyArray1<f64>) -> PyResult<f64> {
        let mags = magnitudes
            .as_slice()
            .map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))?;

        self.analyzer
            .estimator()
            .estimate(mags, self.analyzer.frequency_axis().frequencies())
            .map(|peak| peak.frequency_hz)
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(e.to_string()))
    }

    /// Get frequency bins in Hz
    fn frequency_bins_hz<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_slice(py, self.analyzer.frequency_axis().frequencies())
    }

    /// Get number of frequency bins (frame_size / 2)
    fn num_bins(&self) -> usize {
        self.analyzer.num_bins()
    }

    /// Fractional bin offset of a log-parabolic peak fit
    #[staticmethod]
    fn parabolic_offset(y0: f64, y1: f64, y2: f64) -> f64 {
        log_parabolic_offset(y0, y1, y2)
    }
}
