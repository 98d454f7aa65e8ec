//! Fixed-scale normalization of band energies to 0..=255
//!
//! The divisors are empirical calibration data tuned for a 44.1 kHz capture
//! and a 2048-sample window. They live in a table so they can be tuned from
//! configuration without touching the analysis code.

use super::bands::BandEnergies;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Divisors for one band: `level = energy / range / calibration * 255`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandCalibration {
    pub range_divisor: f64,
    pub calibration_divisor: f64,
}

impl BandCalibration {
    pub const fn new(range_divisor: f64, calibration_divisor: f64) -> Self {
        Self {
            range_divisor,
            calibration_divisor,
        }
    }

    /// Scale one band energy, rounding and clamping to 0..=255
    pub fn scale(&self, energy: f64) -> u8 {
        let level = (energy / self.range_divisor / self.calibration_divisor * 255.0).round();
        if level.is_nan() {
            return 0;
        }
        level.clamp(0.0, 255.0) as u8
    }
}

/// Per-band calibration table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Calibration {
    pub low: BandCalibration,
    pub mid: BandCalibration,
    pub high: BandCalibration,
}

impl Calibration {
    pub const LOW: BandCalibration = BandCalibration::new(230.0, 64654.0);
    pub const MID: BandCalibration = BandCalibration::new(1750.0, 8427.0);
    pub const HIGH: BandCalibration = BandCalibration::new(18000.0, 1351.0);

    pub fn normalize(&self, energies: &BandEnergies) -> BandLevels {
        BandLevels {
            low: self.low.scale(energies.low),
            mid: self.mid.scale(energies.mid),
            high: self.high.scale(energies.high),
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            low: Self::LOW,
            mid: Self::MID,
            high: Self::HIGH,
        }
    }
}

/// Normalized low / mid / high levels, the unit of output
///
/// `Display` renders the datagram payload `low:L, mid:M, high:H`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BandLevels {
    pub low: u8,
    pub mid: u8,
    pub high: u8,
}

impl BandLevels {
    pub const fn new(low: u8, mid: u8, high: u8) -> Self {
        Self { low, mid, high }
    }

    /// Datagram payload bytes
    pub fn to_datagram(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for BandLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "low:{}, mid:{}, high:{}", self.low, self.mid, self.high)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelsParseError {
    #[error("Expected field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unexpected trailing data: {0}")]
    Trailing(String),
}

impl FromStr for BandLevels {
    type Err = LevelsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(", ");
        let low = parse_field(parts.next(), "low")?;
        let mid = parse_field(parts.next(), "mid")?;
        let high = parse_field(parts.next(), "high")?;
        if let Some(rest) = parts.next() {
            return Err(LevelsParseError::Trailing(rest.to_string()));
        }
        Ok(Self { low, mid, high })
    }
}

fn parse_field(part: Option<&str>, field: &'static str) -> Result<u8, LevelsParseError> {
    let value = part
        .and_then(|p| p.strip_prefix(field))
        .and_then(|p| p.strip_prefix(':'))
        .ok_or(LevelsParseError::MissingField(field))?;
    value.parse().map_err(|_| LevelsParseError::InvalidValue {
        field,
        value: value.to_string(),
    })
}
