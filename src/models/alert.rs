use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub type AlertId = u64;
pub type AlarmId = u64;

/// One firing of a zone alarm, as reported by the analytics server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: AlertId,
    pub alarm_id: AlarmId,
    /// Unix time in seconds.
    pub start_time: f64,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub zone_id: Option<u64>,
    #[serde(default)]
    pub stream_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ZoneStatus {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Point-in-time status of every monitored stream: stream id -> zone name -> status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, HashMap<String, ZoneStatus>>);

impl Snapshot {
    /// Every alert in `zone_name`, across all streams. Streams without that zone are skipped.
    pub fn alerts_in_zone<'a>(&'a self, zone_name: &'a str) -> impl Iterator<Item = &'a Alert> + 'a {
        self.0
            .values()
            .filter_map(move |zones| zones.get(zone_name))
            .flat_map(|status| status.alerts.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmCategory {
    Masked,
    Maskless,
}

impl AlarmCategory {
    pub const ALL: [AlarmCategory; 2] = [AlarmCategory::Masked, AlarmCategory::Maskless];

    /// Name of the alarm as provisioned on the analytics server.
    pub fn alarm_name(&self) -> &'static str {
        match self {
            AlarmCategory::Masked => "Masked Person Detected!",
            AlarmCategory::Maskless => "Maskless Person Detected!",
        }
    }

    /// Attribute value the alarm's count condition matches on.
    pub fn mask_attribute(&self) -> &'static str {
        match self {
            AlarmCategory::Masked => "wearing_mask",
            AlarmCategory::Maskless => "not_wearing_mask",
        }
    }

    pub fn from_alarm_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.alarm_name() == name)
    }
}

/// Alarm id -> category, for the alarms this bot reacts to. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AlarmCatalog {
    categories: HashMap<AlarmId, AlarmCategory>,
}

impl AlarmCatalog {
    /// Build from `(alarm id, alarm name)` pairs; unrelated alarms are dropped.
    pub fn from_alarms<'a, I>(alarms: I) -> Self
    where
        I: IntoIterator<Item = (AlarmId, &'a str)>,
    {
        let categories = alarms
            .into_iter()
            .filter_map(|(id, name)| AlarmCategory::from_alarm_name(name).map(|c| (id, c)))
            .collect();
        Self { categories }
    }

    pub fn contains(&self, alarm_id: AlarmId) -> bool {
        self.categories.contains_key(&alarm_id)
    }

    pub fn category(&self, alarm_id: AlarmId) -> Option<AlarmCategory> {
        self.categories.get(&alarm_id).copied()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
