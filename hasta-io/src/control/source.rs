//! Tracker input
//!
//! The hand tracker runs outside this crate and hands over one
//! [`TrackerFrame`] per video frame. [`JsonLinesSource`] reads them as JSON
//! lines, one frame per line:
//!
//! ```text
//! {"hands":[{"handedness":"Left","landmarks":[[0.51,0.88],[0.47,0.81],...]}]}
//! ```
//!
//! A blank line is a frame in which nothing was detected.

use crate::error::Result;
use crate::pose::landmarks::TrackerFrame;
use std::io::BufRead;

/// Producer of tracker frames
pub trait PoseSource {
    /// Next frame; `Ok(None)` once the source is exhausted
    ///
    /// A malformed frame is reported as [`crate::Error::TrackerInput`] and
    /// does not end the source.
    fn next_frame(&mut self) -> Result<Option<TrackerFrame>>;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<TrackerFrame>> {
        (**self).next_frame()
    }
}

/// Reads newline-delimited JSON tracker frames
pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_number: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
        }
    }

    /// Lines consumed so far
    pub fn line_number(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> PoseSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<TrackerFrame>> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        if self.line.iter().all(u8::is_ascii_whitespace) {
            return Ok(Some(TrackerFrame::empty()));
        }

        // Parsed as bytes so a line that is not UTF-8 is a malformed frame,
        // not a read failure
        let frame: TrackerFrame = serde_json::from_slice(&self.line).map_err(|e| {
            log::debug!("Tracker line {} rejected", self.line_number);
            e
        })?;
        log::trace!(
            "Tracker line {}: {} hand(s)",
            self.line_number,
            frame.hands.len()
        );
        Ok(Some(frame))
    }
}

/// Replays a fixed list of frames, then ends
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: std::collections::VecDeque<TrackerFrame>,
}

impl ReplaySource {
    pub fn new<I: IntoIterator<Item = TrackerFrame>>(frames: I) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl PoseSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<TrackerFrame>> {
        Ok(self.frames.pop_front())
    }
}
