//! HastaIO - Hand-pose teleoperation link for a six-actuator robotic hand
//!
//! A hand tracker supplies 21-point skeletons; each one is mapped to six
//! actuator setpoints, sent to the hand over serial, and answered with a
//! telemetry reply carrying joint positions and tactile readings.
//!
//! ## Layout
//!
//! - [`pose`]: landmark types, calibration and the pose-to-command mapper
//! - [`protocol`]: command frame encoding and telemetry reply decoding
//! - [`transport`]: serial port and in-memory mock behind one trait
//! - [`control`]: the synchronous control cycle plus tracker/telemetry seams
//! - [`config`]: TOML configuration

pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod pose;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use control::{ControlCycle, CycleConfig, CycleStats, TelemetrySink};
pub use crate::core::types::{Actuator, CommandVector, NoReplyReason, Reply, TelemetryFrame};
pub use error::{Error, Result};
pub use pose::{Handedness, LandmarkSet, PoseMapper, TrackerFrame};
