//! Capture session states

use std::fmt;
use std::sync::{Arc, Mutex};

/// `Idle -> Capturing -> Stopping -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
    Stopping,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureState::Idle => "idle",
            CaptureState::Capturing => "capturing",
            CaptureState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// State cell shared by the controller and the loop thread
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<CaptureState>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> CaptureState {
        self.inner.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn set(&self, next: CaptureState) {
        if let Ok(mut state) = self.inner.lock() {
            if *state != next {
                log::debug!("Capture state {} -> {}", *state, next);
                *state = next;
            }
        }
    }

    /// Move to `next` only if currently in `expected`
    pub fn transition(&self, expected: CaptureState, next: CaptureState) -> bool {
        match self.inner.lock() {
            Ok(mut state) if *state == expected => {
                log::debug!("Capture state {} -> {}", *state, next);
                *state = next;
                true
            }
            _ => false,
        }
    }
}
