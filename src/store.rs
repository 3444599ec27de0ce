//! Persisted keep/drop choices, fed by the swiper's swipe notifications

use crate::engine::{Decision, Direction, Swipe};
use crate::error::{PhotoSwipeError, Result};
use crate::library::Photo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Keep,
    Drop,
}

impl From<Direction> for Choice {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Choice::Drop,
            Direction::Right => Choice::Keep,
        }
    }
}

impl From<Choice> for Direction {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::Drop => Direction::Left,
            Choice::Keep => Direction::Right,
        }
    }
}

impl Choice {
    pub fn toggled(self) -> Self {
        match self {
            Choice::Keep => Choice::Drop,
            Choice::Drop => Choice::Keep,
        }
    }
}

/// Keep/drop/undecided counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub keep: usize,
    pub drop: usize,
    pub unknown: usize,
    pub total: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    choices: BTreeMap<String, Choice>,
    last_update: Option<DateTime<Utc>>,
}

/// Choice per photo id, saved as JSON
#[derive(Debug)]
pub struct ChoiceStore {
    path: Option<PathBuf>,
    data: StoreFile,
}

impl ChoiceStore {
    /// Default store location (~/.local/share/photoswipe/choices.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("photoswipe").join("choices.json"))
    }

    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: StoreFile::default(),
        }
    }

    /// Loads the store at `path`, starting empty when the file does not exist
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            StoreFile::default()
        };
        tracing::debug!(path = %path.display(), choices = data.choices.len(), "choice store loaded");
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    pub fn load_default() -> Result<Self> {
        let path = Self::default_path().ok_or_else(|| {
            PhotoSwipeError::ConfigError("Could not determine data directory".to_string())
        })?;
        Self::load(path)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.data)?)?;
        tracing::debug!(path = %path.display(), "choice store saved");
        Ok(())
    }

    pub fn choice(&self, id: &str) -> Option<Choice> {
        self.data.choices.get(id).copied()
    }

    pub fn set_choice(&mut self, id: impl Into<String>, choice: Choice) {
        self.data.choices.insert(id.into(), choice);
        self.touch();
    }

    /// Records a decision, or removes it when the swipe is a retraction
    pub fn apply_swipe(&mut self, swipe: &Swipe) {
        match swipe.direction {
            Some(direction) => {
                self.data.choices.insert(swipe.id.clone(), direction.into());
            }
            None => {
                self.data.choices.remove(&swipe.id);
            }
        }
        self.touch();
    }

    /// Decisions for the given photos, in photo order, to resume a swiper
    pub fn initial_decisions(&self, photos: &[Photo]) -> Vec<Decision> {
        photos
            .iter()
            .filter_map(|photo| {
                self.choice(&photo.id)
                    .map(|choice| Decision::new(photo.id.clone(), choice.into()))
            })
            .collect()
    }

    /// Every photo has a choice
    pub fn month_is_complete(&self, photos: &[Photo]) -> bool {
        photos.iter().all(|photo| self.choice(&photo.id).is_some())
    }

    /// Every photo has a choice and all of them are kept
    pub fn month_is_kept(&self, photos: &[Photo]) -> bool {
        !photos.is_empty()
            && photos
                .iter()
                .all(|photo| self.choice(&photo.id) == Some(Choice::Keep))
    }

    pub fn month_stats(&self, photos: &[Photo]) -> Stats {
        let mut stats = Stats::default();
        for photo in photos {
            match self.choice(&photo.id) {
                Some(Choice::Keep) => stats.keep += 1,
                Some(Choice::Drop) => stats.drop += 1,
                None => stats.unknown += 1,
            }
        }
        stats.total = stats.keep + stats.drop + stats.unknown;
        stats
    }

    /// Counts over every stored choice
    pub fn stats(&self) -> Stats {
        let keep = self
            .data
            .choices
            .values()
            .filter(|c| **c == Choice::Keep)
            .count();
        let drop = self.data.choices.len() - keep;
        Stats {
            keep,
            drop,
            unknown: 0,
            total: keep + drop,
        }
    }

    /// Removes choices for photos that no longer exist
    pub fn forget<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.data.choices.remove(id);
        }
        self.touch();
    }

    /// Forgets every choice; the file is only rewritten by [`save`](Self::save)
    pub fn reset(&mut self) {
        tracing::info!(choices = self.data.choices.len(), "choice store reset");
        self.data = StoreFile::default();
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.data.last_update
    }

    fn touch(&mut self) {
        self.data.last_update = Some(Utc::now());
    }
}
