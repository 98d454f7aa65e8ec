//! Spectral Relay - real-time band-energy streaming core
//!
//! Captures mono audio, reduces each frame to low/mid/high levels with a Fast
//! Hartley Transform, and publishes them to local listeners and over UDP.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod audio;
pub mod spectrum;
pub mod relay;
pub mod capture;
pub mod config;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use capture::{CaptureController, CaptureSettings, CaptureState};
pub use config::RelayConfig;
pub use relay::{CaptureEvent, EventBus, UdpTarget};
pub use spectrum::{BandAnalyzer, BandLevels, Calibration};
