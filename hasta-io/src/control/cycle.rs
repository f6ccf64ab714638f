//! One request/response exchange per tracker frame
//!
//! ```text
//! TrackerFrame ─▶ select hand ─▶ PoseMapper ─▶ CommandVector ─┐
//!                     │ (no pose)                  ▲          │
//!                     └──────── hold previous ─────┘          ▼
//!                                                    TxFrame ─▶ transport
//!                                                               │
//! TelemetrySink ◀── Reply ◀── read_reply (bounded by timeout) ◀─┘
//! ```
//!
//! The cycle owns the transport exclusively, so there is never more than one
//! command in flight. Every cycle completes with either telemetry or
//! [`Reply::NoReply`]; only hard transport faults return `Err`.

use super::sink::TelemetrySink;
use super::source::PoseSource;
use crate::config::AppConfig;
use crate::core::types::{CommandVector, Reply};
use crate::error::{Error, Result};
use crate::pose::landmarks::{Handedness, LandmarkSet, TrackerFrame};
use crate::pose::mapper::PoseMapper;
use crate::protocol::constants::{DEFAULT_READ_TIMEOUT_MS, IDLE_COMMAND};
use crate::protocol::packet::TxFrame;
use crate::protocol::reply::read_reply;
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Control cycle settings, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct CycleConfig {
    /// Detections labeled with this side drive the hand
    pub tracked_hand: Handedness,
    /// Setpoint held on every channel until the first pose arrives
    pub idle_command: f64,
    /// Bound on each reply read
    pub read_timeout: Duration,
    /// Cycles between statistics log lines (0 disables)
    pub stats_interval: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            tracked_hand: Handedness::Left,
            idle_command: IDLE_COMMAND,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            stats_interval: 100,
        }
    }
}

/// Where this cycle's command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Freshly mapped from this frame's pose
    Mapped,
    /// No usable pose; previous command repeated
    Held,
}

/// Result of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutcome {
    pub command: CommandVector,
    pub source: CommandSource,
    pub reply: Reply,
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub replies: u64,
    pub no_replies: u64,
    pub mapped_commands: u64,
    pub held_commands: u64,
}

/// Synchronous pose → command → telemetry pipeline over one transport
pub struct ControlCycle<T: Transport> {
    transport: T,
    mapper: PoseMapper,
    config: CycleConfig,
    /// Last command sent; repeated whenever no pose is available
    command: CommandVector,
    stats: CycleStats,
    /// Previous read ended without a complete reply
    resync_pending: bool,
}

impl<T: Transport> ControlCycle<T> {
    /// Create a cycle over an already validated mapper and settings
    pub fn new(transport: T, mapper: PoseMapper, config: CycleConfig) -> Self {
        let command = CommandVector::uniform(config.idle_command);
        Self {
            transport,
            mapper,
            config,
            command,
            stats: CycleStats::default(),
            resync_pending: true,
        }
    }

    /// Validate `config` and build a cycle from it
    pub fn from_config(transport: T, config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let mapper = PoseMapper::new(config.calibration_table()?);
        log::info!(
            "Control cycle: tracking {} hand, idle {:.1}, read timeout {:?}",
            config.mapping.tracked_hand,
            config.mapping.idle_command,
            config.read_timeout()
        );
        for (channel, cal) in mapper.table().channels().iter().enumerate() {
            log::debug!(
                "  ch{} {:<14} d({:>2},{:>2}) in [{:.2}, {:.2}]{}",
                channel,
                cal.name,
                cal.from,
                cal.to,
                cal.real_min,
                cal.real_max,
                if cal.inverted { " inverted" } else { "" }
            );
        }
        Ok(Self::new(transport, mapper, config.cycle_config()))
    }

    /// Command that will be repeated if the next frame has no pose
    pub fn current_command(&self) -> &CommandVector {
        &self.command
    }

    /// Counters since construction
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Settings in use
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Mutable access to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Run one cycle for a tracker frame (`None` = no frame this cycle)
    pub fn run_once(&mut self, frame: Option<&TrackerFrame>) -> Result<CycleOutcome> {
        let hand = self.config.tracked_hand;
        self.step(frame.and_then(|f| f.select(hand)))
    }

    /// Run one cycle for an already selected pose
    pub fn step(&mut self, pose: Option<&LandmarkSet>) -> Result<CycleOutcome> {
        let source = match pose.and_then(|p| self.mapper.map(p)) {
            Some(command) => {
                self.command = command;
                self.stats.mapped_commands += 1;
                CommandSource::Mapped
            }
            None => {
                if pose.is_some() {
                    log::debug!("Degenerate pose, holding previous command");
                }
                log::trace!("Holding command {:?}", self.command.values());
                self.stats.held_commands += 1;
                CommandSource::Held
            }
        };

        self.resync()?;
        let frame = TxFrame::encode(&self.command);
        self.transport.write_all(frame.as_bytes())?;
        self.transport.flush()?;

        let reply = read_reply(&mut self.transport, self.config.read_timeout)?;
        self.record(&reply);

        Ok(CycleOutcome {
            command: self.command,
            source,
            reply,
        })
    }

    /// Drive cycles from `source` into `sink` until the source ends,
    /// `running` clears, or `max_cycles` is reached
    ///
    /// Cancellation is only observed between cycles.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        running: &AtomicBool,
        max_cycles: Option<u64>,
    ) -> Result<CycleStats>
    where
        S: PoseSource + ?Sized,
        K: TelemetrySink + ?Sized,
    {
        let mut completed = 0u64;

        while running.load(Ordering::Relaxed) {
            if max_cycles.is_some_and(|max| completed >= max) {
                log::info!("Reached {} cycles, stopping", completed);
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("Pose source exhausted after {} cycles", completed);
                    break;
                }
                Err(Error::TrackerInput(e)) => {
                    log::warn!("Skipping malformed tracker frame: {}", e);
                    TrackerFrame::empty()
                }
                Err(e) => return Err(e),
            };

            let outcome = self.run_once(Some(&frame))?;
            sink.consume(&outcome.reply)?;
            completed += 1;
        }

        Ok(self.stats)
    }

    /// Send the idle command once (used on shutdown) and drain the reply
    pub fn release(&mut self) -> Result<Reply> {
        self.command = CommandVector::uniform(self.config.idle_command);
        log::info!("Returning hand to idle ({:.1})", self.config.idle_command);

        self.resync()?;
        let frame = TxFrame::encode(&self.command);
        self.transport.write_all(frame.as_bytes())?;
        self.transport.flush()?;
        read_reply(&mut self.transport, self.config.read_timeout)
    }

    /// Drop bytes left over from an incomplete exchange
    fn resync(&mut self) -> Result<()> {
        if self.resync_pending {
            let discarded = self.transport.clear_input()?;
            if discarded > 0 {
                log::debug!("Discarded {} stale bytes before sending", discarded);
            }
        }
        Ok(())
    }

    fn record(&mut self, reply: &Reply) {
        self.stats.cycles += 1;
        match reply {
            Reply::Telemetry(_) => {
                self.stats.replies += 1;
                self.resync_pending = false;
            }
            Reply::NoReply(reason) => {
                self.stats.no_replies += 1;
                self.resync_pending = true;
                log::debug!("Cycle {}: no reply ({:?})", self.stats.cycles, reason);
            }
        }

        let interval = self.config.stats_interval;
        if interval > 0 && self.stats.cycles % interval == 0 {
            log::info!(
                "Cycles: {} | replies: {} | no reply: {} | mapped: {} | held: {}",
                self.stats.cycles,
                self.stats.replies,
                self.stats.no_replies,
                self.stats.mapped_commands,
                self.stats.held_commands
            );
        }
    }
}
