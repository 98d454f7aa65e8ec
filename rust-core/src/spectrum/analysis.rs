//! Frame-by-frame band analyzer
//!
//! Runs window assembly, transform, aggregation and normalization for one
//! tick, reusing the same window buffer every time

use super::bands::{aggregate, BandEnergies};
use super::fht;
use super::normalize::{BandLevels, Calibration};
use super::window::{Frame, WindowBuffer};
use super::SAMPLE_RATE;

/// Stateful analyzer owning the one-frame history
pub struct BandAnalyzer {
    window: WindowBuffer,
    calibration: Calibration,
    last_energies: BandEnergies,
}

impl BandAnalyzer {
    /// Create new analyzer with the given calibration table
    pub fn new(calibration: Calibration) -> Self {
        Self {
            window: WindowBuffer::new(),
            calibration,
            last_energies: BandEnergies::default(),
        }
    }

    /// Analyze `frame` against the previous one and return its band levels
    pub fn process(&mut self, frame: &Frame) -> BandLevels {
        let energies = self.energies(frame);
        self.calibration.normalize(&energies)
    }

    /// Analyze `frame` and return the raw band energies
    pub fn energies(&mut self, frame: &Frame) -> BandEnergies {
        let window = self.window.assemble(frame);
        fht::transform(window);
        let energies = aggregate(window, SAMPLE_RATE as f64);
        self.last_energies = energies;
        energies
    }

    /// Energies computed by the most recent call
    pub fn last_energies(&self) -> BandEnergies {
        self.last_energies
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
    }

    /// Frame retained for the next window
    pub fn previous_frame(&self) -> &Frame {
        self.window.previous()
    }

    /// Drop history, as when a capture session ends
    pub fn reset(&mut self) {
        self.window.reset();
        self.last_energies = BandEnergies::default();
    }

    pub fn is_reset(&self) -> bool {
        self.window.is_reset()
    }
}

impl Default for BandAnalyzer {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}
