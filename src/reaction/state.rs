use std::collections::HashSet;

use crate::models::AlertId;

/// Alerts already reacted to, and when the last reaction happened.
/// Lives as long as the process; nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct ReactionState {
    handled: HashSet<AlertId>,
    /// Unix seconds; zero until the first reaction.
    last_reaction_time: f64,
}

impl ReactionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handled(&self) -> &HashSet<AlertId> {
        &self.handled
    }

    pub fn is_handled(&self, id: AlertId) -> bool {
        self.handled.contains(&id)
    }

    pub fn last_reaction_time(&self) -> f64 {
        self.last_reaction_time
    }

    /// Call only once the reaction for `id` has completed.
    pub fn mark_handled(&mut self, id: AlertId, now: f64) {
        self.handled.insert(id);
        self.last_reaction_time = now;
    }
}
