mod config;
mod controller;
pub mod debounce;
mod state;

pub use config::{PilePositions, ReactionConfig};
pub use controller::{Dispatched, ReactionController};
pub use state::ReactionState;
