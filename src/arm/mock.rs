//! Scripted in-memory arm used by unit tests.

use anyhow::Result;
use std::collections::VecDeque;

use super::{ArmController, Polar};
use crate::models::Position;

#[derive(Debug, Clone, PartialEq)]
pub enum ArmCall {
    SetPosition {
        position: Position,
        speed: f64,
        relative: bool,
        wait: bool,
    },
    SetPolar {
        polar: Polar,
        speed: f64,
        relative: bool,
        wait: bool,
    },
    SetPump(bool),
    GetPosition,
    GetIsMoving,
    GetLimitSwitch,
    Detach,
    Reset,
}

#[derive(Debug, Default)]
pub struct MockArm {
    pub calls: Vec<ArmCall>,
    position: Position,
    moving: VecDeque<bool>,
    moving_default: bool,
    limit_switch: VecDeque<bool>,
    positions: VecDeque<Position>,
}

impl MockArm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_moving(&mut self, values: impl IntoIterator<Item = bool>) {
        self.moving.extend(values);
    }

    pub fn always_moving(&mut self, moving: bool) {
        self.moving_default = moving;
    }

    /// Limit switch readings, consumed in order; `false` once exhausted.
    pub fn script_limit_switch(&mut self, values: impl IntoIterator<Item = bool>) {
        self.limit_switch.extend(values);
    }

    /// Positions returned by `get_position`, consumed in order; the tracked position once exhausted.
    pub fn script_positions(&mut self, values: impl IntoIterator<Item = Position>) {
        self.positions.extend(values);
    }

    pub fn moving_polls(&self) -> usize {
        self.count(|c| matches!(c, ArmCall::GetIsMoving))
    }

    pub fn count(&self, pred: impl Fn(&ArmCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn polar_moves(&self) -> Vec<Polar> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ArmCall::SetPolar { polar, .. } => Some(*polar),
                _ => None,
            })
            .collect()
    }

    pub fn pump_changes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ArmCall::SetPump(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    /// Absolute targets and speeds of `set_position` calls, in order.
    pub fn absolute_moves(&self) -> Vec<(Position, f64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ArmCall::SetPosition {
                    position,
                    speed,
                    relative: false,
                    ..
                } => Some((*position, *speed)),
                _ => None,
            })
            .collect()
    }
}

impl ArmController for MockArm {
    fn set_position(
        &mut self,
        position: Position,
        speed: f64,
        relative: bool,
        wait: bool,
    ) -> Result<()> {
        self.calls.push(ArmCall::SetPosition {
            position,
            speed,
            relative,
            wait,
        });
        self.position = if relative {
            Position::new(
                self.position.x + position.x,
                self.position.y + position.y,
                self.position.z + position.z,
            )
        } else {
            position
        };
        Ok(())
    }

    fn set_polar(&mut self, polar: Polar, speed: f64, relative: bool, wait: bool) -> Result<()> {
        self.calls.push(ArmCall::SetPolar {
            polar,
            speed,
            relative,
            wait,
        });
        if relative {
            self.position.z += polar.h;
        }
        Ok(())
    }

    fn set_pump(&mut self, on: bool) -> Result<()> {
        self.calls.push(ArmCall::SetPump(on));
        Ok(())
    }

    fn get_position(&mut self) -> Result<Position> {
        self.calls.push(ArmCall::GetPosition);
        Ok(self.positions.pop_front().unwrap_or(self.position))
    }

    fn get_is_moving(&mut self) -> Result<bool> {
        self.calls.push(ArmCall::GetIsMoving);
        Ok(self.moving.pop_front().unwrap_or(self.moving_default))
    }

    fn get_limit_switch(&mut self) -> Result<bool> {
        self.calls.push(ArmCall::GetLimitSwitch);
        Ok(self.limit_switch.pop_front().unwrap_or(false))
    }

    fn set_servo_detach(&mut self, _wait: bool) -> Result<()> {
        self.calls.push(ArmCall::Detach);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.calls.push(ArmCall::Reset);
        Ok(())
    }
}
