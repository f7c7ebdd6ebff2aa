pub mod pickup;
pub mod prompt;
pub mod swift;

#[cfg(test)]
pub mod mock;

use anyhow::{bail, Result};
use std::thread;
use std::time::{Duration, Instant};

use crate::models::Position;

pub use pickup::{pickup, PickupConfig, PickupOutcome};
pub use prompt::prompt_position;
pub use swift::SwiftArm;

/// Polar coordinates as the arm understands them: stretch, height and base rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polar {
    pub r: f64,
    pub h: f64,
    pub s: f64,
}

/// Motion, pump and sensor operations the bot needs from an arm.
///
/// Moves with `wait = true` return only once the arm has stopped.
pub trait ArmController {
    fn set_position(&mut self, position: Position, speed: f64, relative: bool, wait: bool)
        -> Result<()>;

    fn set_polar(&mut self, polar: Polar, speed: f64, relative: bool, wait: bool) -> Result<()>;

    fn set_pump(&mut self, on: bool) -> Result<()>;

    fn get_position(&mut self) -> Result<Position>;

    fn get_is_moving(&mut self) -> Result<bool>;

    /// Contact sensor under the suction cup.
    fn get_limit_switch(&mut self) -> Result<bool>;

    /// Lets the arm be moved by hand.
    fn set_servo_detach(&mut self, wait: bool) -> Result<()>;

    fn reset(&mut self) -> Result<()>;
}

/// Poll the arm until it reports it is not moving, giving up after `timeout`.
pub fn wait_until_stopped<A: ArmController + ?Sized>(
    arm: &mut A,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let started = Instant::now();
    while arm.get_is_moving()? {
        if started.elapsed() >= timeout {
            bail!("arm still moving after {:.1}s", timeout.as_secs_f64());
        }
        if !poll_interval.is_zero() {
            thread::sleep(poll_interval);
        }
    }
    Ok(())
}
