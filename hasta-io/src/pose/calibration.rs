//! Per-actuator calibration for the pose mapper
//!
//! Each actuator is driven by the normalized distance between two landmarks.
//! `real_min`/`real_max` bound that distance: at or below `real_min` the
//! actuator is fully closed (100), at or above `real_max` fully open (0).

use super::landmarks::LANDMARK_COUNT;
use crate::core::types::Actuator;
use crate::error::{Error, Result};
use crate::protocol::constants::CHANNEL_COUNT;
use serde::{Deserialize, Serialize};

/// Calibration entry for one actuator channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCalibration {
    /// Channel name (informational, used in logs)
    pub name: String,
    /// First landmark of the measured pair
    pub from: usize,
    /// Second landmark of the measured pair
    pub to: usize,
    /// Normalized distance mapped to a fully closed actuator
    pub real_min: f64,
    /// Normalized distance mapped to a fully open actuator
    pub real_max: f64,
    /// Negate the interpolated command (thumb rotation)
    #[serde(default)]
    pub inverted: bool,
}

impl ChannelCalibration {
    fn reference(actuator: Actuator, from: usize, to: usize, real_min: f64, real_max: f64) -> Self {
        Self {
            name: actuator.name().to_string(),
            from,
            to,
            real_min,
            real_max,
            inverted: false,
        }
    }

    /// Reject entries that would divide by zero or index past the skeleton
    pub fn validate(&self, channel: usize) -> Result<()> {
        if self.from >= LANDMARK_COUNT || self.to >= LANDMARK_COUNT {
            return Err(Error::Config(format!(
                "channel {} ({}): landmark pair ({}, {}) out of range 0..{}",
                channel, self.name, self.from, self.to, LANDMARK_COUNT
            )));
        }
        if !self.real_min.is_finite() || !self.real_max.is_finite() {
            return Err(Error::Config(format!(
                "channel {} ({}): calibration bounds must be finite",
                channel, self.name
            )));
        }
        if self.real_max <= self.real_min {
            return Err(Error::Config(format!(
                "channel {} ({}): real_max ({}) must be greater than real_min ({})",
                channel, self.name, self.real_max, self.real_min
            )));
        }
        Ok(())
    }
}

/// Calibration for all six channels, in actuator order
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    channels: [ChannelCalibration; CHANNEL_COUNT],
}

impl CalibrationTable {
    /// Validate and build a table from exactly six entries
    pub fn new(channels: Vec<ChannelCalibration>) -> Result<Self> {
        let count = channels.len();
        let channels: [ChannelCalibration; CHANNEL_COUNT] =
            channels.try_into().map_err(|_| {
                Error::Config(format!(
                    "calibration table needs {} channels, got {}",
                    CHANNEL_COUNT, count
                ))
            })?;

        for (channel, entry) in channels.iter().enumerate() {
            entry.validate(channel)?;
        }

        Ok(Self { channels })
    }

    /// Table measured for the reference hand
    pub fn reference() -> Self {
        Self {
            channels: reference_channels(),
        }
    }

    /// Entries in actuator order
    #[inline]
    pub fn channels(&self) -> &[ChannelCalibration; CHANNEL_COUNT] {
        &self.channels
    }

    /// Entry for one actuator
    #[inline]
    pub fn get(&self, actuator: Actuator) -> &ChannelCalibration {
        &self.channels[actuator.channel()]
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::reference()
    }
}

/// Reference calibration: fingertip-to-wrist for the fingers and thumb,
/// thumb MCP to pinky knuckle for thumb rotation
pub fn reference_channels() -> [ChannelCalibration; CHANNEL_COUNT] {
    [
        ChannelCalibration::reference(Actuator::Index, 0, 8, 0.9, 1.9),
        ChannelCalibration::reference(Actuator::Middle, 0, 12, 0.8, 2.0),
        ChannelCalibration::reference(Actuator::Ring, 0, 16, 0.7, 1.9),
        ChannelCalibration::reference(Actuator::Pinky, 0, 20, 0.7, 1.8),
        ChannelCalibration::reference(Actuator::ThumbFlexion, 0, 4, 0.9, 1.2),
        ChannelCalibration {
            inverted: true,
            ..ChannelCalibration::reference(Actuator::ThumbRotation, 2, 17, 0.6, 0.9)
        },
    ]
}
