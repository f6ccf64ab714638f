//! Configuration for HastaIO
//!
//! Loads configuration from a TOML file. Every section has defaults, so an
//! empty file describes the reference setup:
//!
//! ```toml
//! [hardware]
//! port = "/dev/ttyUSB0"
//! baud_rate = 460800
//! read_timeout_ms = 20
//!
//! [mapping]
//! tracked_hand = "Left"
//! idle_command = 15.0
//!
//! [[mapping.channels]]
//! name = "index"
//! from = 0
//! to = 8
//! real_min = 0.9
//! real_max = 1.9
//! # ... six entries in actuator order
//!
//! [control]
//! stats_interval = 100
//!
//! [logging]
//! level = "info"
//! ```
//!
//! [`AppConfig::load`] validates everything the control loop depends on, so
//! a bad calibration table is rejected before the serial port is opened.

use crate::control::CycleConfig;
use crate::error::{Error, Result};
use crate::pose::calibration::{reference_channels, CalibrationTable, ChannelCalibration};
use crate::pose::landmarks::Handedness;
use crate::protocol::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS, IDLE_COMMAND, JOINT_MAX,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial link to the hand
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Serial port path
    #[serde(default = "default_port")]
    pub port: String,
    /// Baud rate (default: 460800)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Bound on each reply read in milliseconds (default: 20)
    ///
    /// A silent or unplugged hand degrades to "no reply" after this long
    /// instead of stalling the loop.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Pose-to-command mapping
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Which detected hand drives the robot; other detections are ignored
    #[serde(default)]
    pub tracked_hand: Handedness,
    /// Setpoint sent on every channel until the first pose arrives
    #[serde(default = "default_idle_command")]
    pub idle_command: f64,
    /// Per-actuator calibration, six entries in actuator order
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelCalibration>,
}

/// Control loop settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Cycles between statistics log lines (0 disables)
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use hasta_io::config::AppConfig;
    ///
    /// let config = AppConfig::load("hasta.toml")?;
    /// # Ok::<(), hasta_io::Error>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse TOML text without validating it
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the control loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.hardware.port.trim().is_empty() {
            return Err(Error::Config("hardware.port must not be empty".to_string()));
        }
        if self.hardware.baud_rate == 0 {
            return Err(Error::Config("hardware.baud_rate must be positive".to_string()));
        }
        if self.hardware.read_timeout_ms == 0 {
            return Err(Error::Config(
                "hardware.read_timeout_ms must be positive".to_string(),
            ));
        }

        let idle = self.mapping.idle_command;
        if !idle.is_finite() || idle.abs() > JOINT_MAX {
            return Err(Error::Config(format!(
                "mapping.idle_command ({}) must be within [-{}, {}]",
                idle, JOINT_MAX, JOINT_MAX
            )));
        }

        self.calibration_table()?;
        Ok(())
    }

    /// Validated calibration table
    pub fn calibration_table(&self) -> Result<CalibrationTable> {
        CalibrationTable::new(self.mapping.channels.clone())
    }

    /// Per-read timeout on the serial link
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.hardware.read_timeout_ms)
    }

    /// Settings for the control cycle
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            tracked_hand: self.mapping.tracked_hand,
            idle_command: self.mapping.idle_command,
            read_timeout: self.read_timeout(),
            stats_interval: self.control.stats_interval,
        }
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            tracked_hand: Handedness::default(),
            idle_command: default_idle_command(),
            channels: default_channels(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            stats_interval: default_stats_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}
fn default_idle_command() -> f64 {
    IDLE_COMMAND
}
fn default_channels() -> Vec<ChannelCalibration> {
    reference_channels().to_vec()
}
fn default_stats_interval() -> u64 {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.hardware.port, "/dev/ttyUSB0");
        assert_eq!(config.hardware.baud_rate, 460_800);
        assert_eq!(config.read_timeout(), Duration::from_millis(20));
        assert_eq!(config.mapping.tracked_hand, Handedness::Left);
        assert_eq!(config.mapping.idle_command, 15.0);
        assert_eq!(config.mapping.channels.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.hardware.baud_rate, 460_800);
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.calibration_table().unwrap(),
            CalibrationTable::reference()
        );
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = AppConfig::from_toml(include_str!("../hasta.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.calibration_table().unwrap(),
            CalibrationTable::reference()
        );
        assert_eq!(config.cycle_config(), AppConfig::default().cycle_config());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[hardware]
port = "/dev/ttyACM1"
read_timeout_ms = 50

[mapping]
tracked_hand = "Right"
idle_command = 20.0

[control]
stats_interval = 0

[logging]
level = "debug"
"#;

        let config = AppConfig::from_toml(toml_content).unwrap();
        assert_eq!(config.hardware.port, "/dev/ttyACM1");
        assert_eq!(config.hardware.baud_rate, 460_800);
        assert_eq!(config.mapping.tracked_hand, Handedness::Right);

        let cycle = config.cycle_config();
        assert_eq!(cycle.idle_command, 20.0);
        assert_eq!(cycle.read_timeout, Duration::from_millis(50));
        assert_eq!(cycle.stats_interval, 0);
    }

    #[test]
    fn test_degenerate_calibration_rejected() {
        let mut config = AppConfig::default();
        config.mapping.channels[3].real_max = config.mapping.channels[3].real_min;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_hardware_rejected() {
        let mut config = AppConfig::default();
        config.hardware.read_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.hardware.baud_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_command_range() {
        let mut config = AppConfig::default();
        config.mapping.idle_command = 250.0;
        assert!(config.validate().is_err());
        config.mapping.idle_command = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hasta.toml");

        let mut config = AppConfig::default();
        config.hardware.port = "/dev/ttyUSB3".to_string();
        config.mapping.channels[0].real_max = 2.1;
        config.to_file(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.hardware.port, "/dev/ttyUSB3");
        assert_eq!(loaded.mapping.channels[0].real_max, 2.1);
        assert!(loaded.mapping.channels[5].inverted);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            r#"
[[mapping.channels]]
name = "index"
from = 0
to = 8
real_min = 0.9
real_max = 1.9
"#,
        )
        .unwrap();

        assert!(matches!(AppConfig::load(&path), Err(Error::Config(_))));
        assert!(AppConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
