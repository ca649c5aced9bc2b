//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod analyzer_bindings;
mod monitor_bindings;

/// Python module definition
#[pymodule]
fn harmonic_scope(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<analyzer_bindings::PyHarmonicAnalyzer>()?;
    m.add_class::<monitor_bindings::PyHarmonicMonitor>()?;
    m.add_class::<analyzer_bindings::PyWindowType>()?;

    Ok(())
}
