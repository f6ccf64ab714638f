//! Constants for the hand serial protocol

// Command frame
pub const TX_HEADER: u8 = 0x50;
pub const CMD_SET_POSITIONS: u8 = 0x10; // Position setpoints, replies with telemetry
pub const TX_FRAME_LEN: usize = 15; // HEADER(1) + CMD(1) + 6 x i16(12) + CKSUM(1)

// Channels
pub const CHANNEL_COUNT: usize = 6;
pub const THUMB_ROTATION_CHANNEL: usize = 5; // Reported with inverted sign

// Fixed-point scaling: +-32767 covers +-150 degrees-equivalent
pub const FIXED_POINT_RANGE: f64 = 150.0;
pub const FIXED_POINT_MAX: f64 = 32767.0;

// Joint limits and idle setpoint
pub const JOINT_MIN: f64 = 0.0;
pub const JOINT_MAX: f64 = 100.0;
pub const IDLE_COMMAND: f64 = 15.0;

// Reply framing
pub const REPLY_FORMAT_MASK: u8 = 0x0F;
pub const REPLY_FORMAT_SHORT: u8 = 2; // Positions only
pub const SHORT_PAYLOAD_LEN: usize = 37;
pub const FULL_PAYLOAD_LEN: usize = 70;

// Payload offsets (relative to the byte after the header)
pub const POSITION_STRIDE: usize = 4;
pub const OFFSET_TOUCH: usize = 24;
pub const TOUCH_PAIR_COUNT: usize = 15;
pub const TOUCH_PAIR_LEN: usize = 3;
pub const TOUCH_SENSOR_COUNT: usize = TOUCH_PAIR_COUNT * 2;

// Touch bit packing
pub const TOUCH_LOW_MASK: u16 = 0x0FFF;
pub const TOUCH_HIGH_MASK: u16 = 0xFFF0;
pub const TOUCH_MAX: u16 = 0x0FFF;

// Serial defaults
pub const DEFAULT_BAUD_RATE: u32 = 460_800;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 20;

