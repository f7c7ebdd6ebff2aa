use anyhow::{bail, Context, Result};
use std::fs;
use std::iter::Cycle;
use std::path::{Path, PathBuf};
use std::vec;

const CUE_EXTENSION: &str = "mp3";

/// Endless, order-preserving rotation over a fixed list of sound files.
#[derive(Debug, Clone)]
pub struct SoundCycle {
    cues: Cycle<vec::IntoIter<PathBuf>>,
    len: usize,
}

impl SoundCycle {
    pub fn new(cues: Vec<PathBuf>) -> Result<Self> {
        if cues.is_empty() {
            bail!("a sound cycle needs at least one file");
        }
        let len = cues.len();
        Ok(Self {
            cues: cues.into_iter().cycle(),
            len,
        })
    }

    /// Every `*.mp3` in `dir`, sorted by path.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !dir.is_dir() {
            bail!("The path {} could not be found!", dir.display());
        }

        let mut cues = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == CUE_EXTENSION) {
                cues.push(path);
            }
        }
        if cues.is_empty() {
            bail!("There were no '*.{CUE_EXTENSION}' files found in {}!", dir.display());
        }
        cues.sort();
        Self::new(cues)
    }

    /// Number of distinct cues in one rotation.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next_cue(&mut self) -> PathBuf {
        // Cycle over a non-empty list never ends.
        self.cues.next().unwrap_or_default()
    }
}

/// Reward and penalty cues, loaded from `<sounds>/good` and `<sounds>/bad`.
#[derive(Debug, Clone)]
pub struct SoundLibrary {
    pub good: SoundCycle,
    pub bad: SoundCycle,
}

impl SoundLibrary {
    pub fn load(sounds_dir: &Path) -> Result<Self> {
        Ok(Self {
            good: SoundCycle::from_dir(&sounds_dir.join("good"))?,
            bad: SoundCycle::from_dir(&sounds_dir.join("bad"))?,
        })
    }
}
