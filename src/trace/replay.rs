use anyhow::{bail, Result};

use crate::arm::ArmController;
use crate::models::PoseSample;

use super::MotionTrace;

const ENABLE_LOGS: bool = false;

use crate::log_debug;

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Speed used to reach the entry pose
    pub setup_speed: f64,
    /// Ceiling on the reconstructed speed between waypoints
    pub max_speed: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            setup_speed: 100.0,
            max_speed: 150.0,
        }
    }
}

/// Speed needed to cover the distance between two samples in the time that
/// separated them, capped at `max_speed`. A non-positive gap gives `max_speed`.
pub fn replay_speed(previous: &PoseSample, next: &PoseSample, max_speed: f64) -> f64 {
    let elapsed = next.time - previous.time;
    if elapsed <= 0.0 {
        return max_speed;
    }
    (previous.distance(next) / elapsed).min(max_speed)
}

impl MotionTrace {
    /// Drive the arm through the trace, pacing each leg by the recorded timing.
    pub fn play<A: ArmController + ?Sized>(&self, arm: &mut A, config: &ReplayConfig) -> Result<()> {
        let Some(entry) = self.entry_pose() else {
            bail!("cannot replay an empty trace");
        };

        arm.set_position(entry.position, config.setup_speed, false, true)?;
        arm.set_pump(false)?;

        for pair in self.samples().windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            let speed = replay_speed(previous, next, config.max_speed);
            log_debug!(
                "leg to {} over {:.2}s at speed {:.1}",
                next.position,
                next.time - previous.time,
                speed
            );

            arm.set_position(next.position, speed, false, true)?;
            if previous.pump != next.pump {
                arm.set_pump(next.pump)?;
            }
        }

        Ok(())
    }
}
