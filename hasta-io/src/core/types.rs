//! Core data types shared by the mapper, the codec and the control cycle.
//!
//! - [`CommandVector`]: six actuator setpoints sent to the hand every cycle
//! - [`TelemetryFrame`]: decoded positions and touch readings from one reply
//! - [`Reply`]: outcome of a read, distinguishing real telemetry from silence

use crate::protocol::constants::{CHANNEL_COUNT, IDLE_COMMAND, TOUCH_SENSOR_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Actuator positions in degrees-equivalent, one per channel
pub type PositionVector = [f64; CHANNEL_COUNT];

/// Tactile readings, each a 12-bit value
pub type TouchVector = [u16; TOUCH_SENSOR_COUNT];

/// Actuator channel order used on the wire and by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actuator {
    Index,
    Middle,
    Ring,
    Pinky,
    ThumbFlexion,
    ThumbRotation,
}

impl Actuator {
    /// All channels in wire order
    pub const ALL: [Actuator; CHANNEL_COUNT] = [
        Actuator::Index,
        Actuator::Middle,
        Actuator::Ring,
        Actuator::Pinky,
        Actuator::ThumbFlexion,
        Actuator::ThumbRotation,
    ];

    /// Channel index on the wire
    #[inline]
    pub const fn channel(self) -> usize {
        self as usize
    }

    /// Lowercase name used in configuration files and logs
    pub const fn name(self) -> &'static str {
        match self {
            Actuator::Index => "index",
            Actuator::Middle => "middle",
            Actuator::Ring => "ring",
            Actuator::Pinky => "pinky",
            Actuator::ThumbFlexion => "thumb_flexion",
            Actuator::ThumbRotation => "thumb_rotation",
        }
    }
}

/// Six actuator setpoints, one per [`Actuator`] channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandVector([f64; CHANNEL_COUNT]);

impl CommandVector {
    /// Create from raw channel values
    pub const fn new(values: [f64; CHANNEL_COUNT]) -> Self {
        Self(values)
    }

    /// Same value on every channel
    pub const fn uniform(value: f64) -> Self {
        Self([value; CHANNEL_COUNT])
    }

    /// Command sent while no pose has been seen yet
    pub const fn idle() -> Self {
        Self::uniform(IDLE_COMMAND)
    }

    /// Channel values in wire order
    #[inline]
    pub fn values(&self) -> &[f64; CHANNEL_COUNT] {
        &self.0
    }

    /// Value for one actuator
    #[inline]
    pub fn get(&self, actuator: Actuator) -> f64 {
        self.0[actuator.channel()]
    }
}

impl Default for CommandVector {
    fn default() -> Self {
        Self::idle()
    }
}

impl Index<usize> for CommandVector {
    type Output = f64;

    fn index(&self, channel: usize) -> &f64 {
        &self.0[channel]
    }
}

impl From<[f64; CHANNEL_COUNT]> for CommandVector {
    fn from(values: [f64; CHANNEL_COUNT]) -> Self {
        Self(values)
    }
}

/// Decoded telemetry from one reply
///
/// `touch` is all-zero whenever the reply used the short format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub positions: PositionVector,
    pub touch: TouchVector,
}

impl TelemetryFrame {
    /// All positions and touch readings at zero
    pub const fn zeroed() -> Self {
        Self {
            positions: [0.0; CHANNEL_COUNT],
            touch: [0; TOUCH_SENSOR_COUNT],
        }
    }

    /// True when every position and touch value is zero
    pub fn is_all_zero(&self) -> bool {
        self.positions.iter().all(|&p| p == 0.0) && self.touch.iter().all(|&t| t == 0)
    }
}

impl Default for TelemetryFrame {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Why a cycle produced no telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoReplyReason {
    /// Header byte never arrived
    NoHeader,
    /// Header arrived but the payload was cut short
    ShortRead { expected: usize, received: usize },
}

/// Outcome of reading one reply from the hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    Telemetry(TelemetryFrame),
    NoReply(NoReplyReason),
}

impl Reply {
    /// Decoded frame, if one arrived
    pub fn telemetry(&self) -> Option<&TelemetryFrame> {
        match self {
            Reply::Telemetry(frame) => Some(frame),
            Reply::NoReply(_) => None,
        }
    }

    /// True when nothing (or only part of a reply) arrived
    pub fn is_no_reply(&self) -> bool {
        matches!(self, Reply::NoReply(_))
    }

    /// Collapse to the legacy representation where silence reads as zeros
    pub fn into_frame_or_zeroed(self) -> TelemetryFrame {
        match self {
            Reply::Telemetry(frame) => frame,
            Reply::NoReply(_) => TelemetryFrame::zeroed(),
        }
    }

    /// Recorder-side "null sample" test: no reply, or a reply of all zeros
    pub fn is_null_sample(&self) -> bool {
        match self {
            Reply::Telemetry(frame) => frame.is_all_zero(),
            Reply::NoReply(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_command_default() {
        let cmd = CommandVector::default();
        assert_eq!(cmd.values(), &[15.0; CHANNEL_COUNT]);
        assert_eq!(cmd.get(Actuator::ThumbRotation), 15.0);
    }

    #[test]
    fn test_actuator_channel_order() {
        for (i, actuator) in Actuator::ALL.iter().enumerate() {
            assert_eq!(actuator.channel(), i);
        }
        assert_eq!(Actuator::ThumbRotation.name(), "thumb_rotation");
    }

    #[test]
    fn test_no_reply_is_distinct_from_zero_telemetry() {
        let silent = Reply::NoReply(NoReplyReason::NoHeader);
        let zeros = Reply::Telemetry(TelemetryFrame::zeroed());

        assert_ne!(silent, zeros);
        assert!(silent.is_no_reply());
        assert!(!zeros.is_no_reply());

        // Both still count as null samples for a recorder
        assert!(silent.is_null_sample());
        assert!(zeros.is_null_sample());
        assert_eq!(silent.into_frame_or_zeroed(), TelemetryFrame::zeroed());
    }

    #[test]
    fn test_non_zero_telemetry_is_a_sample() {
        let mut frame = TelemetryFrame::zeroed();
        frame.touch[7] = 12;
        let reply = Reply::Telemetry(frame);
        assert!(!reply.is_null_sample());
        assert_eq!(reply.telemetry().map(|f| f.touch[7]), Some(12));
    }
}
