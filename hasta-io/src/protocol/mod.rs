//! Hand serial protocol
//!
//! One exchange per control cycle:
//! - host sends a 15-byte position command ([`packet::TxFrame`])
//! - hand answers with a 38- or 71-byte telemetry reply ([`reply::read_reply`])

pub mod constants;
pub mod packet;
pub mod reply;

pub use packet::{encode, TxFrame};
pub use reply::{decode_payload, read_reply, ReplyFormat};
