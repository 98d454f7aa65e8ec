//! Python bindings for the capture controller
//!
//! The host-facing surface: start/stop, UDP target and event listeners

use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::Path;
use crate::capture::CaptureController;
use crate::config::RelayConfig;
use crate::relay::{CaptureEvent, ListenerId};

/// Audio capture session exposed to Python
#[pyclass(name = "AudioCapture", unsendable)]
pub struct PyAudioCapture {
    controller: CaptureController,
}

#[pymethods]
impl PyAudioCapture {
    /// Create a capture session
    ///
    /// Args:
    ///     config_path: Optional TOML config file
    #[new]
    #[pyo3(signature = (config_path=None))]
    fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => RelayConfig::load(Path::new(path))
                .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?,
            None => RelayConfig::default(),
        };

        let controller = CaptureController::new(config.capture_settings());
        if let Some(udp) = &config.udp {
            controller
                .set_udp_config(&udp.ip, udp.port)
                .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;
        }

        Ok(Self { controller })
    }

    /// Start capturing from the default input device
    ///
    /// Returns:
    ///     Device name as string
    fn start_capture(&mut self, py: Python<'_>) -> PyResult<String> {
        self.stop_without_gil(py);
        self.controller
            .start_default_device()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
    }

    /// Stop capturing (no-op when already stopped)
    fn stop_capture(&mut self, py: Python<'_>) {
        self.stop_without_gil(py);
    }

    /// Set the UDP destination
    ///
    /// Raises ValueError for an unresolvable address or a port outside
    /// 1-65535; the previous destination stays in effect.
    fn set_udp_config(&self, ip: &str, port: i64) -> PyResult<()> {
        self.controller
            .set_udp_config(ip, port)
            .map(|_| ())
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))
    }

    /// Register a callable receiving {'low', 'mid', 'high'} every tick
    ///
    /// Returns:
    ///     Listener id for remove_listener
    fn add_fft_data_listener(&self, listener: PyObject) -> ListenerId {
        self.controller.events().add_listener(move |event| {
            if let CaptureEvent::FftData(levels) = event {
                Python::with_gil(|py| {
                    let payload = PyDict::new(py);
                    payload.set_item("low", levels.low).ok();
                    payload.set_item("mid", levels.mid).ok();
                    payload.set_item("high", levels.high).ok();
                    if let Err(e) = listener.call1(py, (payload,)) {
                        e.print(py);
                    }
                });
            }
        })
    }

    /// Register a callable receiving {'error', 'resultCode'} on capture failure
    fn add_capture_error_listener(&self, listener: PyObject) -> ListenerId {
        self.controller.events().add_listener(move |event| {
            if let CaptureEvent::CaptureError(notice) = event {
                Python::with_gil(|py| {
                    let payload = PyDict::new(py);
                    payload.set_item("error", notice.message.as_str()).ok();
                    payload.set_item("resultCode", notice.result_code).ok();
                    if let Err(e) = listener.call1(py, (payload,)) {
                        e.print(py);
                    }
                });
            }
        })
    }

    /// Remove a listener; returns False if the id was unknown
    fn remove_listener(&self, listener_id: ListenerId) -> bool {
        self.controller.events().remove_listener(listener_id)
    }

    /// Current state: 'idle', 'capturing' or 'stopping'
    fn state(&self) -> String {
        self.controller.state().to_string()
    }
}

impl PyAudioCapture {
    /// Listeners take the GIL on the capture thread, so join it with the GIL released
    fn stop_without_gil(&mut self, py: Python<'_>) {
        self.controller
            .stop_capture_with(|handle| py.allow_threads(move || handle.join()));
    }
}

impl Drop for PyAudioCapture {
    fn drop(&mut self) {
        Python::with_gil(|py| self.stop_without_gil(py));
    }
}
