use serde::{Deserialize, Serialize};
use std::fmt;

/// Cartesian arm coordinates, in the arm's own units (mm).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Position) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2) + (other.z - self.z).powi(2))
            .sqrt()
    }

    pub fn rounded(&self) -> Self {
        Self::new(self.x.round(), self.y.round(), self.z.round())
    }
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// One recorded arm state. Persisted as `{x, y, z, pump, time}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseSample {
    #[serde(flatten)]
    pub position: Position,
    pub pump: bool,
    /// Seconds since the recording started.
    pub time: f64,
}

impl PoseSample {
    pub fn new(position: Position, pump: bool, time: f64) -> Self {
        Self {
            position,
            pump,
            time,
        }
    }

    /// True when both samples put the arm in the same state. Time is not compared.
    pub fn same_pose(&self, other: &PoseSample) -> bool {
        self.position == other.position && self.pump == other.pump
    }

    pub fn distance(&self, other: &PoseSample) -> f64 {
        self.position.distance(&other.position)
    }
}
