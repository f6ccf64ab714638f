//! Telemetry reply decoding
//!
//! Reply format: [HEADER] [PAYLOAD (37 or 70 bytes)]
//!
//! The low nibble of the header selects the payload:
//! - `2`: short reply, positions only (37 bytes)
//! - anything else: full reply, positions plus 30 touch readings (70 bytes)
//!
//! Payload layout (offsets relative to the byte after the header):
//!
//! ```text
//! 0x00  pos0 i16 LE, 2 bytes unused     (stride 4 per channel)
//! ...
//! 0x14  pos5 i16 LE (sign-inverted)
//! 0x18  touch pairs: 15 x 3 bytes, two 12-bit readings per pair  (full only)
//! ```
//!
//! The reply carries no checksum. A reply whose length does not match the
//! header is discarded, never partially decoded.

use super::constants::*;
use super::packet::from_fixed_point;
use crate::core::types::{NoReplyReason, PositionVector, Reply, TelemetryFrame, TouchVector};
use crate::error::Result;
use crate::transport::{read_within, Transport};
use std::time::Duration;

/// Reply variant selected by the header's low nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    /// Positions only
    Short,
    /// Positions and touch readings
    Full,
}

impl ReplyFormat {
    /// Select the format from a reply header byte
    #[inline]
    pub fn from_header(header: u8) -> Self {
        if header & REPLY_FORMAT_MASK == REPLY_FORMAT_SHORT {
            ReplyFormat::Short
        } else {
            ReplyFormat::Full
        }
    }

    /// Bytes that follow the header
    #[inline]
    pub const fn payload_len(self) -> usize {
        match self {
            ReplyFormat::Short => SHORT_PAYLOAD_LEN,
            ReplyFormat::Full => FULL_PAYLOAD_LEN,
        }
    }

    /// Header plus payload
    #[inline]
    pub const fn total_len(self) -> usize {
        1 + self.payload_len()
    }

    /// Whether the payload carries touch readings
    #[inline]
    pub const fn has_touch(self) -> bool {
        matches!(self, ReplyFormat::Full)
    }
}

/// Unpack two 12-bit readings sharing the middle byte of a 3-byte window
#[inline]
pub fn unpack_touch_pair(window: [u8; TOUCH_PAIR_LEN]) -> (u16, u16) {
    let a = u16::from_le_bytes([window[0], window[1]]) & TOUCH_LOW_MASK;
    let b = (u16::from_le_bytes([window[1], window[2]]) & TOUCH_HIGH_MASK) >> 4;
    (a, b)
}

/// Pack two 12-bit readings into 3 bytes (inverse of [`unpack_touch_pair`])
///
/// Values above 12 bits are truncated to their low 12 bits.
#[inline]
pub fn pack_touch_pair(a: u16, b: u16) -> [u8; TOUCH_PAIR_LEN] {
    let a = a & TOUCH_MAX;
    let b = b & TOUCH_MAX;
    [
        (a & 0xFF) as u8,
        ((a >> 8) as u8) | (((b & 0x0F) as u8) << 4),
        (b >> 4) as u8,
    ]
}

/// Decode a reply payload (bytes after the header)
///
/// Returns `None` if `payload` is not exactly the length `format` requires.
pub fn decode_payload(format: ReplyFormat, payload: &[u8]) -> Option<TelemetryFrame> {
    if payload.len() != format.payload_len() {
        return None;
    }

    let mut positions: PositionVector = [0.0; CHANNEL_COUNT];
    for (channel, position) in positions.iter_mut().enumerate() {
        let offset = channel * POSITION_STRIDE;
        let raw = i16::from_le_bytes([payload[offset], payload[offset + 1]]);
        *position = from_fixed_point(raw);
    }
    positions[THUMB_ROTATION_CHANNEL] = -positions[THUMB_ROTATION_CHANNEL];

    let mut touch: TouchVector = [0; TOUCH_SENSOR_COUNT];
    if format.has_touch() {
        for pair in 0..TOUCH_PAIR_COUNT {
            let offset = OFFSET_TOUCH + pair * TOUCH_PAIR_LEN;
            let window = [payload[offset], payload[offset + 1], payload[offset + 2]];
            let (a, b) = unpack_touch_pair(window);
            touch[pair * 2] = a;
            touch[pair * 2 + 1] = b;
        }
    }

    Some(TelemetryFrame { positions, touch })
}

/// Read and decode one reply from the transport
///
/// Each of the two reads (header, then payload) is bounded by `timeout`.
/// Silence or a short payload yields [`Reply::NoReply`]; the partial bytes
/// are dropped and not retried within this call.
pub fn read_reply<T: Transport + ?Sized>(transport: &mut T, timeout: Duration) -> Result<Reply> {
    let mut header = [0u8; 1];
    if read_within(transport, &mut header, timeout)? == 0 {
        log::debug!("No reply header within {:?}", timeout);
        return Ok(Reply::NoReply(NoReplyReason::NoHeader));
    }

    let format = ReplyFormat::from_header(header[0]);
    let expected = format.payload_len();
    let mut payload = [0u8; FULL_PAYLOAD_LEN];
    let received = read_within(transport, &mut payload[..expected], timeout)?;

    if received != expected {
        log::debug!(
            "Short reply: header=0x{:02X}, expected {} bytes, got {}",
            header[0],
            expected,
            received
        );
        return Ok(Reply::NoReply(NoReplyReason::ShortRead { expected, received }));
    }

    log::trace!("Reply header=0x{:02X} ({:?})", header[0], format);
    Ok(decode_payload(format, &payload[..expected])
        .map(Reply::Telemetry)
        .unwrap_or(Reply::NoReply(NoReplyReason::ShortRead { expected, received })))
}
