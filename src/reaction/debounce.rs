use std::collections::HashSet;

use crate::models::{AlarmCatalog, Alert, AlertId};

/// Alerts that may be reacted to: not yet handled, raised by a mask alarm,
/// and started at least `debounce_secs` after the last reaction.
pub fn filter<'a, I>(
    ongoing: I,
    handled: &HashSet<AlertId>,
    known_alarms: &AlarmCatalog,
    last_reaction_time: f64,
    debounce_secs: f64,
) -> Vec<&'a Alert>
where
    I: IntoIterator<Item = &'a Alert>,
{
    ongoing
        .into_iter()
        .filter(|a| !handled.contains(&a.id))
        .filter(|a| known_alarms.contains(a.alarm_id))
        .filter(|a| a.start_time - last_reaction_time >= debounce_secs)
        .collect()
}

/// The alert to react to, if exactly one is eligible. Several eligible alerts
/// in one snapshot are all skipped rather than queued.
pub fn select_single<'a>(eligible: &[&'a Alert]) -> Option<&'a Alert> {
    match eligible {
        [only] => Some(*only),
        _ => None,
    }
}
