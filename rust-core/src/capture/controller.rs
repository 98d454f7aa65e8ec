//! Capture controller - start/stop surface over the capture loop thread
//!
//! Owns at most one loop thread at a time. Starting while a session is live
//! stops the old one first, so two loops never share a source or a window.

use super::authorization::{AuthorizationError, SourceRequest, DEFAULT_AUTHORIZATION_TIMEOUT};
use super::capture_loop::{CaptureLoop, DEFAULT_PACING};
use super::state::{CaptureState, SharedState};
use crate::audio::{AudioError, InputHandle, PcmRingBuffer, RingSource, SampleSource};
use crate::relay::{CaptureErrorNotice, CaptureEvent, Emitter, EventBus, TargetError, UdpTarget};
use crate::spectrum::{BandAnalyzer, Calibration, Frame, SAMPLE_RATE};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to start audio: {0}")]
    Audio(#[from] AudioError),

    #[error("Capture authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("Failed to spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Tunables for a capture session
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub calibration: Calibration,
    /// Sleep between ticks
    pub pacing: Duration,
    /// How long `start_authorized` waits for the permission flow
    pub authorization_timeout: Duration,
    /// Device ring buffer capacity in samples
    pub ring_capacity: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            pacing: DEFAULT_PACING,
            authorization_timeout: DEFAULT_AUTHORIZATION_TIMEOUT,
            ring_capacity: SAMPLE_RATE as usize,
        }
    }
}

/// Window history, held here while no loop owns it
type ParkedAnalyzer = Arc<Mutex<Option<BandAnalyzer>>>;

/// Control surface for capture sessions
pub struct CaptureController {
    settings: CaptureSettings,
    target: UdpTarget,
    events: EventBus,
    state: SharedState,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    parked: ParkedAnalyzer,
}

impl CaptureController {
    pub fn new(settings: CaptureSettings) -> Self {
        let parked = Arc::new(Mutex::new(Some(BandAnalyzer::new(settings.calibration))));
        Self {
            settings,
            target: UdpTarget::new(),
            events: EventBus::new(),
            state: SharedState::new(),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            parked,
        }
    }

    /// Event bus carrying `onFftData` and `onCaptureError`
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Shared datagram destination
    pub fn target(&self) -> &UdpTarget {
        &self.target
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Validate and apply the UDP destination; safe while capturing
    pub fn set_udp_config(&self, ip: &str, port: i64) -> Result<SocketAddr, TargetError> {
        match self.target.configure(ip, port) {
            Ok(addr) => {
                log::info!("UDP target set to {}", addr);
                Ok(addr)
            }
            Err(e) => {
                log::warn!("Rejected UDP config {}:{}: {}", ip, port, e);
                Err(e)
            }
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state.get()
    }

    pub fn is_capturing(&self) -> bool {
        self.state() == CaptureState::Capturing
    }

    /// History frame, available only while no loop is running
    pub fn previous_frame(&self) -> Option<Frame> {
        self.parked().as_ref().map(|a| a.previous_frame().clone())
    }

    fn parked(&self) -> MutexGuard<'_, Option<BandAnalyzer>> {
        self.parked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session on an already-authorized source
    ///
    /// A live session is stopped first.
    pub fn start_capture(&mut self, source: Box<dyn SampleSource>) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            if self.is_capturing() {
                log::info!("Capture already running; restarting");
            }
            self.stop_capture();
        }

        let mut analyzer = self
            .parked()
            .take()
            .unwrap_or_else(|| BandAnalyzer::new(self.settings.calibration));
        analyzer.set_calibration(self.settings.calibration);

        let emitter = Emitter::new(self.events.clone(), self.target.clone());
        let capture = CaptureLoop::new(source, analyzer, emitter, self.settings.pacing);

        self.running.store(true, Ordering::SeqCst);
        self.state.set(CaptureState::Capturing);

        let running = Arc::clone(&self.running);
        let state = self.state.clone();
        let events = self.events.clone();
        let parked = Arc::clone(&self.parked);

        let spawned = thread::Builder::new()
            .name("capture-loop".into())
            .spawn(move || {
                // The source, and any device it owns, is released inside run
                let exit = capture.run(&running);
                *parked.lock().unwrap_or_else(PoisonError::into_inner) = Some(exit.analyzer);

                if let Some(error) = exit.error {
                    // Fatal read: end the session here, no restart
                    log::error!("Capture stopped: {}", error);
                    running.store(false, Ordering::SeqCst);
                    state.transition(CaptureState::Capturing, CaptureState::Stopping);
                    events.publish(&CaptureEvent::CaptureError(CaptureErrorNotice::new(
                        error.to_string(),
                    )));
                    state.transition(CaptureState::Stopping, CaptureState::Idle);
                }
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                log::info!("Capture started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                self.state.set(CaptureState::Idle);
                *self.parked() = Some(BandAnalyzer::new(self.settings.calibration));
                Err(CaptureError::Spawn(e))
            }
        }
    }

    /// Open the default input device and start a session on it
    ///
    /// The session owns the device: it is closed when the session ends,
    /// including after a fatal read.
    ///
    /// # Returns
    /// The device name
    pub fn start_default_device(&mut self) -> Result<String, CaptureError> {
        // Release any previous device before opening it again
        self.stop_capture();

        let (producer, consumer) = PcmRingBuffer::new(self.settings.ring_capacity).split();
        let input = InputHandle::open_default(producer)?;
        let device_name = input.device_info().name.clone();

        self.start_capture(Box::new(RingSource::with_input(consumer, input)))?;
        Ok(device_name)
    }

    /// Wait for the permission flow, then start on the granted source
    ///
    /// Denials and timeouts are published as `onCaptureError` and returned.
    pub fn start_authorized(&mut self, request: SourceRequest) -> Result<(), CaptureError> {
        match request.wait(self.settings.authorization_timeout) {
            Ok(source) => self.start_capture(source),
            Err(e) => {
                log::error!("Capture authorization failed: {}", e);
                self.events.publish(&CaptureEvent::CaptureError(e.notice()));
                Err(CaptureError::Authorization(e))
            }
        }
    }

    /// Stop the current session. Safe to call when already stopped.
    pub fn stop_capture(&mut self) {
        self.stop_capture_with(|handle| handle.join());
    }

    /// Stop the current session, joining the loop thread through `join`
    ///
    /// Listeners run on the loop thread. A caller holding a lock that a
    /// listener needs must release it inside `join`, or the join never
    /// returns.
    pub fn stop_capture_with<F>(&mut self, join: F)
    where
        F: FnOnce(JoinHandle<()>) -> thread::Result<()>,
    {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.worker.take() {
            self.state.set(CaptureState::Stopping);
            if join(handle).is_err() {
                log::error!("Capture thread panicked");
            }
            log::info!("Capture stopped");
        }

        self.parked()
            .get_or_insert_with(|| BandAnalyzer::new(self.settings.calibration))
            .reset();
        self.state.set(CaptureState::Idle);
    }
}

impl Default for CaptureController {
    fn default() -> Self {
        Self::new(CaptureSettings::default())
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop_capture();
    }
}
