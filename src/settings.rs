use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::models::Position;
use crate::reaction::PilePositions;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct UserSettings {
    #[serde(default)]
    snack_position: Option<Position>,
    #[serde(default)]
    mask_position: Option<Position>,
}

/// Pile positions remembered between runs, kept in a small JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: UserSettings,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self { path, data })
    }

    pub fn snack_position(&self) -> Option<Position> {
        self.data.snack_position
    }

    pub fn mask_position(&self) -> Option<Position> {
        self.data.mask_position
    }

    pub fn update_piles(&mut self, piles: PilePositions) -> Result<()> {
        self.data.snack_position = Some(piles.snack);
        self.data.mask_position = Some(piles.mask);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
