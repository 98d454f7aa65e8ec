//! Band-energy analysis with a Fast Hartley Transform

pub mod window;
pub mod fht;
pub mod bands;
pub mod normalize;
pub mod analysis;

pub use window::{Frame, WindowBuffer};
pub use bands::BandEnergies;
pub use normalize::{BandCalibration, BandLevels, Calibration, LevelsParseError};
pub use analysis::BandAnalyzer;

/// Capture sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// Samples per frame (N)
pub const FRAME_SIZE: usize = 1024;

/// Samples per analysis window (M = 2N)
pub const WINDOW_SIZE: usize = FRAME_SIZE * 2;
