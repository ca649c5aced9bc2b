//! Python bindings for the live harmonic monitor

use pyo3::prelude::*;
use pyo3::exceptions::PyRuntimeError;
use pyo3::types::PyDict;
use numpy::PyArray1;
use crate::config::AnalysisConfig;
use crate::engine::HarmonicMonitor;
use super::analyzer_bindings::PyWindowType;

/// Live capture and analysis exposed to Python
///
/// Capture and analysis run on a Rust thread; Python only polls results
#[pyclass(name = "HarmonicMonitor", unsendable)]
pub struct PyHarmonicMonitor {
    monitor: HarmonicMonitor,
}

#[pymethods]
impl PyHarmonicMonitor {
    /// Create a new monitor (does not open the device yet)
    #[new]
    #[pyo3(signature = (
        sample_rate=44100.0,
        frame_size=2048,
        window_type=PyWindowType::Hann,
        device=None
    ))]
    fn new(
        sample_rate: f64,
        frame_size: usize,
        window_type: PyWindowType,
        device: Option<String>,
    ) -> Self {
        let config = AnalysisConfig {
            sample_rate,
            frame_size,
            window: window_type.into(),
            ..AnalysisConfig::default()
        };

        let monitor = match device {
            Some(name) => HarmonicMonitor::new(config).with_device(name),
            None => HarmonicMonitor::new(config),
        };

        Self { monitor }
    }

    /// Start audio capture and analysis
    ///
    /// Returns:
    ///     Device name as string
    fn start(&mut self) -> PyResult<String> {
        self.monitor
            .start()
            .map(|info| info.name)
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Failed to start audio: {}", e)))
    }

    /// Stop capture and release the device
    fn stop(&mut self) -> PyResult<()> {
        match self.monitor.stop() {
            Some(Err(e)) => Err(PyErr::new::<PyRuntimeError, _>(e.to_string())),
            _ => Ok(()),
        }
    }

    fn is_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Get latest analysis results
    ///
    /// Returns:
    ///     Dictionary with keys: 'waveform', 'spectrum_magnitude',
    ///     'spectrum_frequencies', 'harmonic_hz', 'peak_magnitude', 'sequence'
    ///     or None if no new data
    fn get_results(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        let results = match self.monitor.get_results() {
            Some(results) => results,
            None => return Ok(None),
        };

        let dict = PyDict::new(py);
        dict.set_item("waveform", PyArray1::from_slice(py, results.waveform.samples()))?;
        dict.set_item("spectrum_magnitude", PyArray1::from_vec(py, results.magnitudes))?;
        dict.set_item(
            "spectrum_frequencies",
            PyArray1::from_slice(py, &results.frequency_axis[..]),
        )?;
        dict.set_item("harmonic_hz", results.harmonic_hz)?;
        dict.set_item("peak_magnitude", results.peak_magnitude)?;
        dict.set_item("sequence", results.sequence)?;

        Ok(Some(dict.into()))
    }

    /// List available audio devices
    #[staticmethod]
    fn list_devices() -> PyResult<Vec<String>> {
        HarmonicMonitor::list_devices()
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Failed to list devices: {}", e)))
    }
}
