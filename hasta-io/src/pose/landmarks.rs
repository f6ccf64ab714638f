//! Hand landmark types handed over by the external tracker
//!
//! A [`LandmarkSet`] is the 21-point hand skeleton in normalized image
//! coordinates. Only `x`/`y` take part in the mapping; `z` is carried along
//! when the tracker provides it.
//!
//! Point indices follow the usual hand-tracking layout:
//!
//! ```text
//! 0 wrist
//! 1-4   thumb  (CMC, MCP, IP, tip)
//! 5-8   index  (MCP, PIP, DIP, tip)
//! 9-12  middle
//! 13-16 ring
//! 17-20 pinky
//! ```

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of points in a hand skeleton
pub const LANDMARK_COUNT: usize = 21;

/// Wrist point
pub const WRIST: usize = 0;

/// Knuckle (MCP) points of the four fingers, used for hand-size normalization
pub const KNUCKLES: [usize; 4] = [5, 9, 13, 17];

/// One tracked keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Accepted wire shapes: `[x, y]`, `[x, y, z]` or `{"x": .., "y": .., "z": ..}`
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Xy([f64; 2]),
    Xyz([f64; 3]),
    Named {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Xy([x, y]) => Landmark::new(x, y),
            LandmarkRepr::Xyz([x, y, z]) => Landmark { x, y, z },
            LandmarkRepr::Named { x, y, z } => Landmark { x, y, z },
        }
    }
}

impl Landmark {
    /// Planar landmark (z = 0)
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the image plane (x/y only)
    #[inline]
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Complete 21-point hand skeleton for one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Build from tracker output
    ///
    /// Fails unless there are exactly 21 points with finite coordinates.
    pub fn new(points: &[Landmark]) -> Result<Self, Error> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            Error::InvalidLandmarks(format!(
                "expected {} points, got {}",
                LANDMARK_COUNT,
                points.len()
            ))
        })?;

        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(Error::InvalidLandmarks(format!(
                "point {} has a non-finite coordinate",
                index
            )));
        }

        Ok(Self { points })
    }

    /// Point by skeleton index (0..21)
    #[inline]
    pub fn point(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// All points in skeleton order
    #[inline]
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Planar distance between two points; `None` if an index is out of range
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> Option<f64> {
        Some(self.point(a)?.planar_distance(self.point(b)?))
    }

    /// Hand-size normalization scalar: `4 / (sum of wrist-to-knuckle distances)`
    ///
    /// `None` for a degenerate skeleton whose knuckles collapse onto the wrist.
    pub fn hand_scale(&self) -> Option<f64> {
        let wrist = &self.points[WRIST];
        let span: f64 = KNUCKLES
            .iter()
            .map(|&k| wrist.planar_distance(&self.points[k]))
            .sum();

        if span.is_finite() && span > f64::EPSILON {
            Some(KNUCKLES.len() as f64 / span)
        } else {
            None
        }
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Error> {
        LandmarkSet::new(&points)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.points.to_vec()
    }
}

/// Which hand a detection belongs to, as labeled by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Handedness {
    #[default]
    Left,
    Right,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => write!(f, "Left"),
            Handedness::Right => write!(f, "Right"),
        }
    }
}

/// One labeled hand detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedHand {
    pub handedness: Handedness,
    pub landmarks: LandmarkSet,
}

/// Tracker output for one video frame (zero or more hands)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerFrame {
    #[serde(default)]
    pub hands: Vec<TrackedHand>,
}

impl TrackerFrame {
    /// Frame with no detections
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frame with a single detection
    pub fn single(handedness: Handedness, landmarks: LandmarkSet) -> Self {
        Self {
            hands: vec![TrackedHand {
                handedness,
                landmarks,
            }],
        }
    }

    /// First detection labeled `side`; other detections are ignored
    pub fn select(&self, side: Handedness) -> Option<&LandmarkSet> {
        self.hands
            .iter()
            .find(|hand| hand.handedness == side)
            .map(|hand| &hand.landmarks)
    }
}
