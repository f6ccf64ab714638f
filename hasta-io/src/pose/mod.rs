//! Hand pose input and pose-to-command mapping

pub mod calibration;
pub mod landmarks;
pub mod mapper;

pub use calibration::{CalibrationTable, ChannelCalibration};
pub use landmarks::{Handedness, Landmark, LandmarkSet, TrackedHand, TrackerFrame};
pub use mapper::{interpolate, PoseMapper};
