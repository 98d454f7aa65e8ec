//! In-process event delivery for local consumers

use crate::spectrum::BandLevels;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Name of the per-tick band level event
pub const FFT_DATA_EVENT: &str = "onFftData";

/// Name of the capture failure event
pub const CAPTURE_ERROR_EVENT: &str = "onCaptureError";

/// Failure reported to the host when a capture session cannot start or dies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureErrorNotice {
    pub message: String,
    /// Platform result code, when the failure came with one
    pub result_code: Option<i32>,
}

impl CaptureErrorNotice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result_code: None,
        }
    }

    pub fn with_result_code(message: impl Into<String>, result_code: i32) -> Self {
        Self {
            message: message.into(),
            result_code: Some(result_code),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    FftData(BandLevels),
    CaptureError(CaptureErrorNotice),
}

impl CaptureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureEvent::FftData(_) => FFT_DATA_EVENT,
            CaptureEvent::CaptureError(_) => CAPTURE_ERROR_EVENT,
        }
    }
}

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&CaptureEvent) + Send + Sync>;

/// Registry of listeners, shared between the control thread and the loop
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<Vec<(ListenerId, Listener)>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for every event; returns a handle for removal
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CaptureEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    /// Returns `false` if `id` was not registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        match self.listeners.write() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(existing, _)| *existing != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver `event` to every listener registered at the time of the call
    pub fn publish(&self, event: &CaptureEvent) {
        // Snapshot so listeners run without the registry lock held
        let snapshot: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
