//! Command frame encoding
//!
//! Frame format: [0x50] [0x10] [6 x i16 LE fixed-point] [CKSUM]
//!
//! The checksum is the two's complement of the byte sum of everything before
//! it, so all bytes of a valid frame sum to zero modulo 256.
//!
//! # Pattern
//!
//! ```ignore
//! let frame = TxFrame::encode(&command);
//! frame.send_to(&mut port)?;
//! ```

use super::constants::*;
use crate::core::types::CommandVector;
use std::io::{self, Write};

/// Encoded position command, exactly [`TX_FRAME_LEN`] bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxFrame {
    data: [u8; TX_FRAME_LEN],
}

impl TxFrame {
    /// Encode a command vector into a fresh frame
    ///
    /// Total over every input: setpoints are clamped to
    /// `[-JOINT_MAX, JOINT_MAX]` first, so the fixed-point value always
    /// fits in an `i16`.
    pub fn encode(command: &CommandVector) -> Self {
        let mut data = [0u8; TX_FRAME_LEN];
        data[0] = TX_HEADER;
        data[1] = CMD_SET_POSITIONS;

        for (channel, &value) in command.values().iter().enumerate() {
            let offset = 2 + channel * 2;
            data[offset..offset + 2].copy_from_slice(&to_fixed_point(value).to_le_bytes());
        }

        data[TX_FRAME_LEN - 1] = checksum(&data[..TX_FRAME_LEN - 1]);
        Self { data }
    }

    /// Frame bytes for sending
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Checksum byte
    #[inline]
    pub fn checksum(&self) -> u8 {
        self.data[TX_FRAME_LEN - 1]
    }

    /// Send frame to any writer (serial port, etc.)
    #[inline]
    pub fn send_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}

/// Encode a command vector (free-function form of [`TxFrame::encode`])
#[inline]
pub fn encode(command: &CommandVector) -> TxFrame {
    TxFrame::encode(command)
}

/// Two's complement of the byte sum, masked to 8 bits
#[inline]
pub fn checksum(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
        .wrapping_neg()
}

/// Clamp a setpoint into the encodable range; NaN becomes zero
#[inline]
pub fn clamp_setpoint(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    let clamped = value.clamp(-JOINT_MAX, JOINT_MAX);
    if clamped != value {
        log::debug!("Setpoint {:.3} clamped to {:.3}", value, clamped);
    }
    clamped
}

/// Degrees-equivalent to wire fixed-point (rounded to nearest)
#[inline]
pub fn to_fixed_point(value: f64) -> i16 {
    (clamp_setpoint(value) * FIXED_POINT_MAX / FIXED_POINT_RANGE).round() as i16
}

/// Wire fixed-point to degrees-equivalent
#[inline]
pub fn from_fixed_point(raw: i16) -> f64 {
    raw as f64 * FIXED_POINT_RANGE / FIXED_POINT_MAX
}
