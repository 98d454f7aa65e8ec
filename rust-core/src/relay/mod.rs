//! Output side: UDP target, local event bus and the dual-sink emitter

pub mod target;
pub mod events;
pub mod emitter;

pub use target::{TargetError, UdpTarget};
pub use events::{CaptureErrorNotice, CaptureEvent, EventBus, ListenerId};
pub use emitter::Emitter;
