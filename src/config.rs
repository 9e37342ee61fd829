//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub controller: ControllerConfig,
    pub poll: PollConfig,
    pub storage: StorageConfig,
    pub verify: VerifyConfig,
}

/// Serial port configuration for the controller dongle
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_controller_port")]
    pub port: String,

    #[serde(default = "default_controller_baud_rate")]
    pub baud_rate: u32,
}

/// Serial port configuration for the operator menu transport
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Device paths to try when the preferred port fails to open.
    #[serde(default = "default_fallback_ports")]
    pub fallback_ports: Vec<String>,

    /// Read timeout applied while parsing a notch value from the line.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Poll loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    /// Number of poll cycles between status log messages.
    #[serde(default = "default_status_log_cycles")]
    pub status_log_cycles: u64,
}

/// Calibration storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

/// GCCVerify handshake configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VerifyConfig {
    /// How long after boot to listen for the verification marker.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    #[serde(default = "default_marker")]
    pub marker: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_fallback_ports() -> Vec<String> {
    vec!["/dev/ttyUSB1".to_string(), "/dev/ttyACM1".to_string()]
}
fn default_timeout_ms() -> u64 { 250 }

fn default_controller_port() -> String { "/dev/ttyACM0".to_string() }
fn default_controller_baud_rate() -> u32 { 115_200 }

fn default_rate_hz() -> u32 { 120 }
fn default_status_log_cycles() -> u64 { 1000 }

fn default_storage_path() -> String { "./calibration.bin".to_string() }

fn default_window_ms() -> u64 { 1000 }
fn default_marker() -> String { "GCCVerify".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if self.controller.port.is_empty() {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("controller port cannot be empty")
            ));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("timeout_ms must be between 1 and 10000")
            ));
        }

        // GameCube console polling tops out around 1kHz (OC adapters)
        if self.poll.rate_hz < 50 || self.poll.rate_hz > 1000 {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("rate_hz must be between 50 and 1000")
            ));
        }

        if self.poll.status_log_cycles == 0 {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("status_log_cycles must be greater than 0")
            ));
        }

        if self.storage.path.is_empty() {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("storage path cannot be empty")
            ));
        }

        if self.verify.window_ms == 0 || self.verify.window_ms > 10000 {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("verify window_ms must be between 1 and 10000")
            ));
        }

        if self.verify.marker.is_empty() {
            return Err(crate::error::GccBridgeError::Config(
                toml::de::Error::custom("verify marker cannot be empty")
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig {
                port: default_serial_port(),
                baud_rate: default_baud_rate(),
                fallback_ports: default_fallback_ports(),
                timeout_ms: default_timeout_ms(),
            },
            controller: ControllerConfig {
                port: default_controller_port(),
                baud_rate: default_controller_baud_rate(),
            },
            poll: PollConfig {
                rate_hz: default_rate_hz(),
                status_log_cycles: default_status_log_cycles(),
            },
            storage: StorageConfig {
                path: default_storage_path(),
            },
            verify: VerifyConfig {
                window_ms: default_window_ms(),
                marker: default_marker(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.fallback_ports, vec!["/dev/ttyUSB1", "/dev/ttyACM1"]);
        assert_eq!(config.serial.timeout_ms, 250);
        assert_eq!(config.controller.port, "/dev/ttyACM0");
        assert_eq!(config.controller.baud_rate, 115_200);
        assert_eq!(config.poll.rate_hz, 120);
        assert_eq!(config.poll.status_log_cycles, 1000);
        assert_eq!(config.storage.path, "./calibration.bin");
        assert_eq!(config.verify.window_ms, 1000);
        assert_eq!(config.verify.marker, "GCCVerify");
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyACM1"

[controller]
port = "/dev/ttyACM0"
baud_rate = 1000000

[poll]
rate_hz = 250

[storage]

[verify]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.controller.port, "/dev/ttyACM0");
        assert_eq!(config.controller.baud_rate, 1_000_000);
        assert_eq!(config.poll.rate_hz, 250);
        assert_eq!(config.storage.path, "./calibration.bin");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = Config::load("/nonexistent/gcc-bridge.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_controller_port() {
        let mut config = Config::default();
        config.controller.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_ms_zero() {
        let mut config = Config::default();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_ms_too_high() {
        let mut config = Config::default();
        config.serial.timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_rate_too_low() {
        let mut config = Config::default();
        config.poll.rate_hz = 49;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_rate_too_high() {
        let mut config = Config::default();
        config.poll.rate_hz = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_rate_bounds_are_valid() {
        for rate in [50, 120, 1000] {
            let mut config = Config::default();
            config.poll.rate_hz = rate;
            assert!(config.validate().is_ok(), "rate {} should be valid", rate);
        }
    }

    #[test]
    fn test_status_log_cycles_zero() {
        let mut config = Config::default();
        config.poll.status_log_cycles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_storage_path() {
        let mut config = Config::default();
        config.storage.path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_window_zero() {
        let mut config = Config::default();
        config.verify.window_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_window_too_high() {
        let mut config = Config::default();
        config.verify.window_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_verify_marker() {
        let mut config = Config::default();
        config.verify.marker = String::new();
        assert!(config.validate().is_err());
    }
}
