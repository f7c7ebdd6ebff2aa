use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::models::PoseSample;

use super::MotionTrace;

impl MotionTrace {
    /// Serialize as a JSON array of `{x, y, z, pump, time}` records.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.samples).context("failed to serialize motion trace")
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let samples: Vec<PoseSample> =
            serde_json::from_str(contents).context("failed to decode motion trace")?;
        Ok(Self::from_samples(samples))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_json()?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write motion trace to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read motion trace from {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("Invalid motion trace in {}", path.display()))
    }
}
