use anyhow::Result;
use std::thread;
use std::time::Duration;

use crate::models::Position;

use super::{wait_until_stopped, ArmController, Polar};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Tunables for grabbing the top item off a pile.
#[derive(Debug, Clone)]
pub struct PickupConfig {
    /// Speed of the initial, non-blocking move over the pile
    pub approach_speed: f64,
    /// Upper bound on waiting for the approach move to finish
    pub approach_timeout: Duration,
    pub poll_interval: Duration,

    /// Relative drop taken in one go before probing for contact
    pub initial_descent: f64,
    /// Per-step height change while probing (negative is down)
    pub down_increment: f64,
    /// Probing depth budget
    pub max_down_distance: f64,
    /// Base rotation alternated each probing step so the switch catches
    pub wiggle: f64,
    pub descent_speed: f64,

    /// Time given to the suction cup to seat before lifting
    pub seat_pause: Duration,
    pub safe_height: f64,
    pub ascent_speed: f64,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            approach_speed: 25.0,
            approach_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(20),
            initial_descent: -100.0,
            down_increment: -3.0,
            max_down_distance: 100.0,
            wiggle: 2.0,
            descent_speed: 150.0,
            seat_pause: Duration::from_millis(500),
            safe_height: 165.0,
            ascent_speed: 150.0,
        }
    }
}

impl PickupConfig {
    /// Number of probing steps the depth budget allows.
    pub fn max_steps(&self) -> usize {
        if self.down_increment == 0.0 {
            return 0;
        }
        (self.max_down_distance / self.down_increment).floor().abs() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupOutcome {
    /// Whether the contact sensor fired before the depth budget ran out
    pub contact: bool,
    /// Probing steps taken
    pub steps: usize,
}

/// Lower onto the pile at `target` with suction on, probe down until the
/// contact sensor fires, then lift to the safe height.
///
/// Running out of probing depth is not an error: the arm lifts anyway.
pub fn pickup<A: ArmController + ?Sized>(
    arm: &mut A,
    target: Position,
    config: &PickupConfig,
) -> Result<PickupOutcome> {
    arm.set_position(target, config.approach_speed, false, false)?;
    arm.set_pump(true)?;

    wait_until_stopped(arm, config.approach_timeout, config.poll_interval)?;

    arm.set_position(
        Position::new(0.0, 0.0, config.initial_descent),
        config.descent_speed,
        true,
        true,
    )?;

    let mut outcome = PickupOutcome {
        contact: false,
        steps: 0,
    };
    for step in 0..config.max_steps() {
        if arm.get_limit_switch()? {
            outcome.contact = true;
            break;
        }
        let s = if step % 2 == 0 {
            -config.wiggle
        } else {
            config.wiggle
        };
        arm.set_polar(
            Polar {
                r: 0.0,
                h: config.down_increment,
                s,
            },
            config.descent_speed,
            true,
            true,
        )?;
        outcome.steps += 1;
    }

    if outcome.contact {
        log_debug!("contact after {} probing steps at {}", outcome.steps, target);
    } else {
        log_warn!("The limit switch was never hit picking up at {}", target);
    }

    if !config.seat_pause.is_zero() {
        thread::sleep(config.seat_pause);
    }

    arm.set_position(
        Position::new(target.x, target.y, config.safe_height),
        config.ascent_speed,
        false,
        true,
    )?;

    Ok(outcome)
}
