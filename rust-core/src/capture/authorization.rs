//! Handshake between the permission flow and the capture start
//!
//! The flow that obtains capture permission holds a [`SourceGrant`]; the
//! controller waits on the matching [`SourceRequest`]. Exactly one outcome is
//! delivered: an authorized source, or a denial with a result code.

use crate::audio::SampleSource;
use crate::relay::CaptureErrorNotice;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;
use thiserror::Error;

/// Result code for a request the user dismissed
pub const RESULT_CANCELED: i32 = 0;

/// Result code for a request the user explicitly refused
pub const RESULT_DENIED: i32 = 1;

/// Default wait for the permission flow to deliver its outcome
pub const DEFAULT_AUTHORIZATION_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Error, Debug)]
pub enum AuthorizationError {
    #[error("{message}")]
    Denied {
        message: String,
        result_code: Option<i32>,
    },

    #[error("Capture source not ready after {0:?}")]
    TimedOut(Duration),

    #[error("No data received")]
    Abandoned,
}

impl AuthorizationError {
    /// Notice to publish to the host for this failure
    pub fn notice(&self) -> CaptureErrorNotice {
        match self {
            AuthorizationError::Denied {
                message,
                result_code,
            } => CaptureErrorNotice {
                message: message.clone(),
                result_code: *result_code,
            },
            other => CaptureErrorNotice::new(other.to_string()),
        }
    }
}

/// Human-readable reason for a denial result code
pub fn denial_message(result_code: i32) -> &'static str {
    match result_code {
        RESULT_CANCELED => "User cancelled the request",
        RESULT_DENIED => "User denied permission",
        _ => "Unknown error",
    }
}

enum Outcome {
    Authorized(Box<dyn SampleSource>),
    Denied(CaptureErrorNotice),
}

/// Held by the permission flow
pub struct SourceGrant {
    tx: SyncSender<Outcome>,
}

/// Held by whoever starts the capture
pub struct SourceRequest {
    rx: Receiver<Outcome>,
}

pub fn authorization_channel() -> (SourceGrant, SourceRequest) {
    let (tx, rx) = mpsc::sync_channel(1);
    (SourceGrant { tx }, SourceRequest { rx })
}

impl SourceGrant {
    /// Hand over an authorized source
    ///
    /// Returns `false` if the request was already abandoned.
    pub fn authorize(self, source: Box<dyn SampleSource>) -> bool {
        self.tx.send(Outcome::Authorized(source)).is_ok()
    }

    /// Refuse with a platform result code
    pub fn deny(self, result_code: i32) -> bool {
        let notice = CaptureErrorNotice::with_result_code(denial_message(result_code), result_code);
        self.tx.send(Outcome::Denied(notice)).is_ok()
    }

    /// Refuse with a custom notice
    pub fn fail(self, notice: CaptureErrorNotice) -> bool {
        self.tx.send(Outcome::Denied(notice)).is_ok()
    }
}

impl SourceRequest {
    /// Block until the grant side answers or `timeout` elapses
    pub fn wait(self, timeout: Duration) -> Result<Box<dyn SampleSource>, AuthorizationError> {
        match self.rx.recv_timeout(timeout) {
            Ok(Outcome::Authorized(source)) => Ok(source),
            Ok(Outcome::Denied(notice)) => Err(AuthorizationError::Denied {
                message: notice.message,
                result_code: notice.result_code,
            }),
            Err(RecvTimeoutError::Timeout) => Err(AuthorizationError::TimedOut(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(AuthorizationError::Abandoned),
        }
    }
}
