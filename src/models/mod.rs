mod alert;
mod pose;

pub use alert::{AlarmCatalog, AlarmCategory, AlarmId, Alert, AlertId, Snapshot, ZoneStatus};
pub use pose::{PoseSample, Position};
