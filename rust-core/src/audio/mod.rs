//! Audio capture with cpal and the sample sources feeding the capture loop

pub mod input;
pub mod buffer;
pub mod source;

pub use input::{AudioDeviceInfo, AudioError, AudioInput, InputHandle, list_input_devices};
pub use buffer::{PcmConsumer, PcmProducer, PcmRingBuffer};
pub use source::{RingSource, SampleSource, SourceError, StreamFault};
