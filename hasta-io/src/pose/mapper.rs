//! Pose-to-command mapping
//!
//! For every actuator:
//!
//! ```text
//! scale = 4 / (d(0,5) + d(0,9) + d(0,13) + d(0,17))
//! raw   = scale * d(from, to)
//! cmd   = interpolate(raw, real_min, real_max)      (negated if inverted)
//! ```
//!
//! Normalizing by the wrist-to-knuckle span makes the command independent of
//! how large the hand appears in the image.

use super::calibration::CalibrationTable;
use super::landmarks::LandmarkSet;
use crate::core::types::CommandVector;
use crate::protocol::constants::{CHANNEL_COUNT, JOINT_MAX, JOINT_MIN};

/// Linear map from a calibrated distance to a joint command, clamped to [0, 100]
///
/// Inverted sense: `real_min` maps to [`JOINT_MAX`], `real_max` to [`JOINT_MIN`].
/// Callers guarantee `real_max > real_min` (see [`CalibrationTable::new`]).
#[inline]
pub fn interpolate(value: f64, real_min: f64, real_max: f64) -> f64 {
    let p = (value - real_min) / (real_max - real_min);
    let control = JOINT_MIN + (1.0 - p) * (JOINT_MAX - JOINT_MIN);
    control.clamp(JOINT_MIN, JOINT_MAX)
}

/// Stateless mapper from a hand skeleton to six actuator commands
#[derive(Debug, Clone, Default)]
pub struct PoseMapper {
    table: CalibrationTable,
}

impl PoseMapper {
    /// Create a mapper over a validated calibration table
    pub fn new(table: CalibrationTable) -> Self {
        Self { table }
    }

    /// Calibration in use
    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Map a pose to actuator commands
    ///
    /// Returns `None` only for a degenerate skeleton with no measurable hand
    /// size; the caller then keeps its previous command.
    pub fn map(&self, pose: &LandmarkSet) -> Option<CommandVector> {
        let scale = pose.hand_scale()?;

        let mut values = [0.0; CHANNEL_COUNT];
        for (value, cal) in values.iter_mut().zip(self.table.channels()) {
            let raw = scale * pose.distance(cal.from, cal.to)?;
            let command = interpolate(raw, cal.real_min, cal.real_max);
            *value = if cal.inverted { -command } else { command };
        }

        Some(CommandVector::new(values))
    }
}
