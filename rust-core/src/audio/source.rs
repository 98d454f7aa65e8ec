//! Sample sources feeding the capture loop

use super::buffer::PcmConsumer;
use super::input::InputHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A single read failed; the next tick may succeed
    #[error("Sample read failed: {0}")]
    Transient(String),

    /// Authorization or the underlying capture resource is gone
    #[error("Capture resource lost: {0}")]
    Fatal(String),
}

impl SourceError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::Fatal(_))
    }
}

/// Mono 16-bit PCM supplier at the fixed sample rate
///
/// `read` must not block for longer than a tick. `Ok(0)` means nothing was
/// available this time; a short count is a partial frame.
pub trait SampleSource: Send {
    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, SourceError>;
}

/// Latched failure flag shared between a device error callback and its source
#[derive(Debug, Clone, Default)]
pub struct StreamFault {
    tripped: Arc<AtomicBool>,
    message: Arc<Mutex<Option<String>>>,
}

impl StreamFault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fatal failure. Only the first message is kept.
    pub fn trip(&self, message: impl Into<String>) {
        if let Ok(mut slot) = self.message.lock() {
            if slot.is_none() {
                *slot = Some(message.into());
            }
        }
        self.tripped.store(true, Ordering::SeqCst);
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn message(&self) -> Option<String> {
        self.message.lock().ok().and_then(|m| m.clone())
    }
}

/// Source draining a PCM ring buffer filled by a device callback
///
/// When built with [`RingSource::with_input`] the source owns the device, so
/// dropping the source closes it.
pub struct RingSource {
    consumer: PcmConsumer,
    fault: StreamFault,
    input: Option<InputHandle>,
}

impl RingSource {
    pub fn new(consumer: PcmConsumer, fault: StreamFault) -> Self {
        Self {
            consumer,
            fault,
            input: None,
        }
    }

    pub fn with_input(consumer: PcmConsumer, input: InputHandle) -> Self {
        Self {
            consumer,
            fault: input.fault(),
            input: Some(input),
        }
    }

    /// Name of the owned device, if any
    pub fn device_name(&self) -> Option<&str> {
        self.input.as_ref().map(|i| i.device_info().name.as_str())
    }
}

impl SampleSource for RingSource {
    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, SourceError> {
        if self.fault.is_tripped() {
            let message = self
                .fault
                .message()
                .unwrap_or_else(|| "audio stream failed".to_string());
            return Err(SourceError::Fatal(message));
        }
        Ok(self.consumer.read(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::PcmRingBuffer;

    #[test]
    fn test_ring_source_reads_available_samples() {
        let (mut producer, consumer) = PcmRingBuffer::new(2048).split();
        let mut source = RingSource::new(consumer, StreamFault::new());
        assert_eq!(source.device_name(), None);

        let mut buffer = [0i16; 1024];
        assert_eq!(source.read(&mut buffer), Ok(0));

        producer.write(&[42; 100]);
        assert_eq!(source.read(&mut buffer), Ok(100));
        assert_eq!(buffer[99], 42);
    }

    #[test]
    fn test_tripped_fault_is_fatal() {
        let (mut producer, consumer) = PcmRingBuffer::new(2048).split();
        let fault = StreamFault::new();
        let mut source = RingSource::new(consumer, fault.clone());

        producer.write(&[1; 10]);
        fault.trip("device unplugged");
        fault.trip("second failure");

        let err = source.read(&mut [0i16; 16]).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err, SourceError::Fatal("device unplugged".into()));
    }
}
