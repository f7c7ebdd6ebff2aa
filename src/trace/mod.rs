mod record;
mod replay;
mod store;

pub use record::record;
pub use replay::{replay_speed, ReplayConfig};

use crate::models::PoseSample;

/// Time-stamped sequence of arm poses and pump states, in recording order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionTrace {
    samples: Vec<PoseSample>,
}

impl MotionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: Vec<PoseSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[PoseSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// First sample; replay starts here.
    pub fn entry_pose(&self) -> Option<&PoseSample> {
        self.samples.first()
    }

    /// Append `sample` unless it puts the arm in the same state as the last one.
    /// Returns whether it was appended.
    pub(crate) fn push_distinct(&mut self, sample: PoseSample) -> bool {
        if let Some(last) = self.samples.last() {
            if last.same_pose(&sample) {
                return false;
            }
        }
        self.samples.push(sample);
        true
    }
}
