use anyhow::Result;
use std::time::Instant;

use crate::arm::ArmController;
use crate::models::PoseSample;

use super::MotionTrace;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Record waypoints while the operator moves the arm by hand.
///
/// `next_waypoint` blocks until the operator asks for a waypoint and returns
/// `false` to end the recording. Each reading of the contact sensor toggles
/// the pump. A waypoint identical to the previous one (ignoring time) is dropped.
pub fn record<A, F>(arm: &mut A, mut next_waypoint: F) -> Result<MotionTrace>
where
    A: ArmController + ?Sized,
    F: FnMut() -> Result<bool>,
{
    let mut trace = MotionTrace::new();

    arm.set_pump(false)?;
    let mut pump = false;
    let started = Instant::now();

    while next_waypoint()? {
        let position = arm.get_position()?;

        if arm.get_limit_switch()? {
            pump = !pump;
            arm.set_pump(pump)?;
        }

        let sample = PoseSample::new(position, pump, started.elapsed().as_secs_f64());
        if trace.push_distinct(sample) {
            log_debug!("waypoint {} at {} pump={}", trace.len(), position, pump);
        }
    }

    log_info!("Finishing recording with {} waypoints", trace.len());
    Ok(trace)
}
