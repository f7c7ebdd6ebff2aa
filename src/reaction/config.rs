use std::time::Duration;

use crate::models::Position;

/// Fixed poses, speeds and timings of the reward and penalty routines.
#[derive(Debug, Clone)]
pub struct ReactionConfig {
    /// Minimum gap between an alert's start and the previous reaction
    pub debounce_secs: f64,

    /// Zone whose alerts are considered, on every stream
    pub zone_name: String,

    pub home: Position,
    pub home_speed: f64,
    /// Slow return home while holding an item
    pub carry_speed: f64,
    pub return_speed: f64,

    /// Where confiscated masks get flung
    pub throw_position: Position,
    pub throw_speed: f64,

    /// Pause after the pump releases, before heading home
    pub release_pause: Duration,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 3.0,
            zone_name: "Screen".to_string(),
            home: Position::new(150.0, 0.0, 150.0),
            home_speed: 100.0,
            carry_speed: 30.0,
            return_speed: 50.0,
            throw_position: Position::new(200.0, 0.0, 30.0),
            throw_speed: 125.0,
            release_pause: Duration::from_secs(1),
        }
    }
}

/// Pile locations the arm picks from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PilePositions {
    pub snack: Position,
    pub mask: Position,
}
