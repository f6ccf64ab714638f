//! Telemetry consumers

use crate::core::types::Reply;
use crate::error::Result;

/// Receives the outcome of every control cycle
pub trait TelemetrySink {
    fn consume(&mut self, reply: &Reply) -> Result<()>;
}

impl<K: TelemetrySink + ?Sized> TelemetrySink for &mut K {
    fn consume(&mut self, reply: &Reply) -> Result<()> {
        (**self).consume(reply)
    }
}

/// Logs decoded samples and counts the cycles that produced none
///
/// No-reply cycles and all-zero frames are counted as null samples and never
/// logged as data.
#[derive(Debug, Default)]
pub struct LogSink {
    samples: u64,
    null_samples: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames logged as data
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Cycles with no reply or an all-zero reply
    pub fn null_samples(&self) -> u64 {
        self.null_samples
    }
}

impl TelemetrySink for LogSink {
    fn consume(&mut self, reply: &Reply) -> Result<()> {
        match reply.telemetry() {
            Some(frame) if !reply.is_null_sample() => {
                self.samples += 1;
                log::debug!(
                    "Sample {}: pos={:.1?} touch={:?}",
                    self.samples,
                    frame.positions,
                    frame.touch
                );
            }
            _ => {
                self.null_samples += 1;
                log::trace!("Null sample ({} so far)", self.null_samples);
            }
        }
        Ok(())
    }
}

/// Keeps every reply in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub replies: Vec<Reply>,
}

impl TelemetrySink for RecordingSink {
    fn consume(&mut self, reply: &Reply) -> Result<()> {
        self.replies.push(*reply);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{NoReplyReason, TelemetryFrame};

    #[test]
    fn test_log_sink_counts() {
        let mut sink = LogSink::new();
        let mut frame = TelemetryFrame::zeroed();
        frame.positions[0] = 12.5;

        sink.consume(&Reply::Telemetry(frame)).unwrap();
        sink.consume(&Reply::Telemetry(TelemetryFrame::zeroed())).unwrap();
        sink.consume(&Reply::NoReply(NoReplyReason::NoHeader)).unwrap();

        assert_eq!(sink.samples(), 1);
        assert_eq!(sink.null_samples(), 2);
    }

    fn feed<K: TelemetrySink>(mut sink: K, reply: Reply) {
        sink.consume(&reply).unwrap();
    }

    #[test]
    fn test_sink_through_reference() {
        let mut recorder = RecordingSink::default();
        feed(&mut recorder, Reply::NoReply(NoReplyReason::NoHeader));
        feed(&mut recorder, Reply::Telemetry(TelemetryFrame::zeroed()));
        assert_eq!(recorder.replies.len(), 2);
        assert!(recorder.replies[0].is_no_reply());
    }
}
