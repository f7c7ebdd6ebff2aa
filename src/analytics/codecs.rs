//! Wire types for the analytics server's REST API. Unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::AlarmCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfiguration {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: u64,
    pub name: String,
    pub stream_id: u64,
    #[serde(default)]
    pub alarms: Vec<ZoneAlarm>,
}

impl Zone {
    /// Mask alarm categories this zone has no alarm for yet.
    pub fn missing_categories(&self) -> Vec<AlarmCategory> {
        AlarmCategory::ALL
            .into_iter()
            .filter(|c| !self.alarms.iter().any(|a| a.name == c.alarm_name()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub category: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneAlarmCountCondition {
    pub test: String,
    pub check_value: u32,
    pub with_class_name: String,
    pub with_attribute: Option<Attribute>,
    pub window_duration: f64,
    pub window_threshold: f64,
    pub intersection_point: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneAlarm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub zone_id: u64,
    #[serde(default)]
    pub count_conditions: Vec<ZoneAlarmCountCondition>,
    #[serde(default)]
    pub rate_conditions: Vec<serde_json::Value>,
    #[serde(default)]
    pub use_active_time: bool,
    #[serde(default)]
    pub active_start_time: Option<String>,
    #[serde(default)]
    pub active_end_time: Option<String>,
}

impl ZoneAlarm {
    /// Alarm that fires while at least one face with the category's mask
    /// attribute stands in the zone.
    pub fn mask_alarm(category: AlarmCategory, zone_id: u64) -> Self {
        Self {
            id: None,
            name: category.alarm_name().to_string(),
            zone_id,
            count_conditions: vec![ZoneAlarmCountCondition {
                test: ">".to_string(),
                check_value: 0,
                with_class_name: "face".to_string(),
                with_attribute: Some(Attribute {
                    category: "mask".to_string(),
                    value: category.mask_attribute().to_string(),
                }),
                window_duration: 4.0,
                window_threshold: 0.5,
                intersection_point: "bottom".to_string(),
            }],
            rate_conditions: Vec::new(),
            use_active_time: false,
            active_start_time: None,
            active_end_time: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDescription {
    #[serde(default)]
    pub detections: Vec<String>,
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capsule {
    pub name: String,
    #[serde(default)]
    pub capability: NodeDescription,
    #[serde(default)]
    pub output_type: NodeDescription,
}

impl Capsule {
    pub fn detects_faces(&self) -> bool {
        self.capability.detections.iter().any(|d| d == "face")
    }

    pub fn classifies_masks(&self) -> bool {
        self.capability.attributes.contains_key("mask")
            && self.output_type.detections.iter().any(|d| d == "face")
    }
}
