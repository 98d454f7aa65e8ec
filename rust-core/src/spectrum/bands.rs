//! Low / mid / high band energy aggregation

/// Upper edge (exclusive) of the low band in Hz
pub const LOW_CUTOFF_HZ: f64 = 250.0;

/// Upper edge (exclusive) of the mid band in Hz
pub const MID_CUTOFF_HZ: f64 = 2000.0;

/// Upper edge (inclusive) of the high band in Hz
pub const HIGH_CUTOFF_HZ: f64 = 20000.0;

/// Summed transform magnitudes per band
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandEnergies {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandEnergies {
    pub fn total(&self) -> f64 {
        self.low + self.mid + self.high
    }
}

/// Number of leading bins that contribute to the band sums
///
/// Only the first quarter of the window (half of the magnitude half) is
/// scanned. Calibration assumes this range.
pub fn scanned_bins(window_len: usize) -> usize {
    window_len / 4
}

/// Sum `|transformed[i]|` into bands by bin frequency `i * sample_rate / len`
///
/// Bins above `HIGH_CUTOFF_HZ` are ignored.
pub fn aggregate(transformed: &[f64], sample_rate: f64) -> BandEnergies {
    let mut energies = BandEnergies::default();
    if transformed.is_empty() {
        return energies;
    }

    let freq_resolution = sample_rate / transformed.len() as f64;
    let scanned = scanned_bins(transformed.len());

    for (i, value) in transformed[..scanned].iter().enumerate() {
        let magnitude = value.abs();
        let freq = i as f64 * freq_resolution;
        if freq < LOW_CUTOFF_HZ {
            energies.low += magnitude;
        } else if freq < MID_CUTOFF_HZ {
            energies.mid += magnitude;
        } else if freq <= HIGH_CUTOFF_HZ {
            energies.high += magnitude;
        }
    }

    energies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::{FRAME_SIZE, SAMPLE_RATE, WINDOW_SIZE};

    const RATE: f64 = SAMPLE_RATE as f64;

    #[test]
    fn test_zero_spectrum_has_no_energy() {
        let energies = aggregate(&[0.0; WINDOW_SIZE], RATE);
        assert_eq!(energies, BandEnergies::default());
    }

    #[test]
    fn test_scan_stops_before_half_frame() {
        assert_eq!(scanned_bins(WINDOW_SIZE), FRAME_SIZE / 2);

        let mut spectrum = vec![0.0; WINDOW_SIZE];
        spectrum[FRAME_SIZE / 2] = 1e9;
        spectrum[WINDOW_SIZE / 2 - 1] = 1e9;

        assert_eq!(aggregate(&spectrum, RATE), BandEnergies::default());
    }

    #[test]
    fn test_band_edges() {
        // 44100 / 2048 = 21.53 Hz per bin: bin 11 < 250 Hz <= bin 12,
        // bin 92 < 2000 Hz <= bin 93
        let mut spectrum = vec![0.0; WINDOW_SIZE];
        spectrum[0] = 1.0;
        spectrum[11] = 2.0;
        spectrum[12] = 4.0;
        spectrum[92] = 8.0;
        spectrum[93] = 16.0;
        spectrum[FRAME_SIZE / 2 - 1] = 32.0;

        let energies = aggregate(&spectrum, RATE);
        assert_eq!(energies.low, 3.0);
        assert_eq!(energies.mid, 12.0);
        assert_eq!(energies.high, 48.0);
    }

    #[test]
    fn test_magnitudes_are_absolute() {
        let mut spectrum = vec![0.0; WINDOW_SIZE];
        spectrum[1] = -5.0;
        spectrum[2] = 5.0;

        let energies = aggregate(&spectrum, RATE);
        assert_eq!(energies.low, 10.0);
        assert_eq!(energies.total(), 10.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(aggregate(&[], RATE), BandEnergies::default());
    }
}
