//! TOML configuration
//!
//! ```toml
//! [udp]
//! ip = "192.168.1.20"
//! port = 8888
//!
//! [capture]
//! pacing_ms = 5
//!
//! [calibration.low]
//! range_divisor = 230.0
//! calibration_divisor = 64654.0
//! ```

use crate::capture::CaptureSettings;
use crate::spectrum::{Calibration, SAMPLE_RATE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    pub udp: Option<UdpConfig>,
    pub capture: CaptureConfig,
    pub calibration: Calibration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UdpConfig {
    pub ip: String,
    pub port: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub pacing_ms: u64,
    pub authorization_timeout_ms: u64,
    pub ring_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 5,
            authorization_timeout_ms: 1000,
            ring_capacity: SAMPLE_RATE as usize,
        }
    }
}

impl RelayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            calibration: self.calibration,
            pacing: Duration::from_millis(self.capture.pacing_ms),
            authorization_timeout: Duration::from_millis(self.capture.authorization_timeout_ms),
            ring_capacity: self.capture.ring_capacity.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::BandCalibration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RelayConfig::from_toml_str("").unwrap();

        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.udp, None);

        let settings = config.capture_settings();
        assert_eq!(settings.pacing, Duration::from_millis(5));
        assert_eq!(settings.authorization_timeout, Duration::from_millis(1000));
        assert_eq!(settings.calibration, Calibration::default());
    }

    #[test]
    fn test_full_config() {
        let config = RelayConfig::from_toml_str(
            r#"
            [udp]
            ip = "127.0.0.1"
            port = 9999

            [capture]
            pacing_ms = 10

            [calibration.high]
            range_divisor = 9000.0
            calibration_divisor = 1000.0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.udp,
            Some(UdpConfig {
                ip: "127.0.0.1".into(),
                port: 9999
            })
        );
        assert_eq!(config.capture.pacing_ms, 10);
        assert_eq!(config.capture.ring_capacity, 44_100);
        assert_eq!(config.calibration.low, Calibration::LOW);
        assert_eq!(
            config.calibration.high,
            BandCalibration::new(9000.0, 1000.0)
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = RelayConfig::from_toml_str("[capture]\nfft_size = 4096\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = RelayConfig::load(Path::new("/nonexistent/spectral-relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
