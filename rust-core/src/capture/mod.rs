//! Capture session lifecycle: state machine, real-time loop and control surface

pub mod state;
pub mod capture_loop;
pub mod authorization;
pub mod controller;

pub use state::{CaptureState, SharedState};
pub use capture_loop::{CaptureLoop, TickOutcome};
pub use authorization::{authorization_channel, SourceGrant, SourceRequest};
pub use controller::{CaptureController, CaptureError, CaptureSettings};
