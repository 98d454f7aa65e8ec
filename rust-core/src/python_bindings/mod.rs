//! PyO3 bindings for Python integration

use pyo3::prelude::*;
use crate::relay::events::{CAPTURE_ERROR_EVENT, FFT_DATA_EVENT};

mod capture_bindings;

/// Python module definition
#[pymodule]
fn spectral_relay(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<capture_bindings::PyAudioCapture>()?;
    m.add("FFT_DATA_EVENT", FFT_DATA_EVENT)?;
    m.add("CAPTURE_ERROR_EVENT", CAPTURE_ERROR_EVENT)?;

    Ok(())
}
