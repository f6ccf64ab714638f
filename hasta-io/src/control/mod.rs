//! Control loop: tracker frames in, commands out, telemetry back

pub mod cycle;
pub mod handoff;
pub mod sink;
pub mod source;

pub use cycle::{CommandSource, ControlCycle, CycleConfig, CycleOutcome, CycleStats};
pub use handoff::{spawn_tracker_thread, PoseSlot, SlotSource};
pub use sink::{LogSink, RecordingSink, TelemetrySink};
pub use source::{JsonLinesSource, PoseSource, ReplaySource};
