//! Review of a finished month and batch deletion of dropped photos

use crate::error::{PhotoSwipeError, Result};
use crate::library::Photo;
use crate::store::{Choice, ChoiceStore, Stats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub photo: Photo,
    pub choice: Choice,
}

/// Outcome of [`ReviewSession::commit`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Ids moved to the trash (or that would have been, in dry-run)
    pub deleted: Vec<String>,
    /// Ids that could not be trashed, with the reason
    pub failed: Vec<(String, String)>,
    pub dry_run: bool,
}

/// Decided photos of one month, editable before deletion is confirmed
#[derive(Debug)]
pub struct ReviewSession {
    entries: Vec<ReviewEntry>,
    selected: usize,
    dry_run: bool,
}

impl ReviewSession {
    pub fn new(photos: &[Photo], store: &ChoiceStore) -> Self {
        let entries = photos
            .iter()
            .filter_map(|photo| {
                store.choice(&photo.id).map(|choice| ReviewEntry {
                    photo: photo.clone(),
                    choice,
                })
            })
            .collect();

        Self {
            entries,
            selected: 0,
            dry_run: false,
        }
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Flips keep/drop for `id`. Returns false for unknown ids.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|entry| entry.photo.id == id) {
            Some(entry) => {
                entry.choice = entry.choice.toggled();
                true
            }
            None => false,
        }
    }

    pub fn toggle_selected(&mut self) -> bool {
        match self.entries.get(self.selected) {
            Some(entry) => {
                let id = entry.photo.id.clone();
                self.toggle(&id)
            }
            None => false,
        }
    }

    pub fn to_drop(&self) -> Vec<&Photo> {
        self.entries
            .iter()
            .filter(|entry| entry.choice == Choice::Drop)
            .map(|entry| &entry.photo)
            .collect()
    }

    pub fn stats(&self) -> Stats {
        let drop = self.to_drop().len();
        let keep = self.entries.len() - drop;
        Stats {
            keep,
            drop,
            unknown: 0,
            total: self.entries.len(),
        }
    }

    /// Writes the reviewed choices back to the store and moves dropped
    /// photos to the system trash.
    ///
    /// Failures on individual files are reported, not returned; only a
    /// failure to save the store is an error.
    pub fn commit(&self, store: &mut ChoiceStore) -> Result<CommitReport> {
        for entry in &self.entries {
            store.set_choice(entry.photo.id.clone(), entry.choice);
        }

        let mut report = CommitReport {
            dry_run: self.dry_run,
            ..CommitReport::default()
        };

        for photo in self.to_drop() {
            if self.dry_run {
                report.deleted.push(photo.id.clone());
                continue;
            }
            match trash::delete(&photo.path).map_err(PhotoSwipeError::from) {
                Ok(()) => report.deleted.push(photo.id.clone()),
                Err(e) => {
                    tracing::warn!(path = %photo.path.display(), error = %e, "trash failed");
                    report.failed.push((photo.id.clone(), e.to_string()));
                }
            }
        }

        if !self.dry_run {
            store.forget(report.deleted.iter().map(String::as_str));
        }
        store.save()?;

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            dry_run = self.dry_run,
            "review committed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn photo_at(path: PathBuf) -> Photo {
        Photo {
            id: path.to_string_lossy().into_owned(),
            name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("test")
                .to_string(),
            path,
            size: 0,
            taken: Utc::now(),
        }
    }

    fn photo(id: &str) -> Photo {
        photo_at(PathBuf::from(id))
    }

    fn session(store: &mut ChoiceStore) -> (ReviewSession, Vec<Photo>) {
        let photos = vec![photo("a"), photo("b"), photo("c")];
        store.set_choice("a", Choice::Keep);
        store.set_choice("b", Choice::Drop);
        (ReviewSession::new(&photos, store), photos)
    }

    #[test]
    fn test_only_decided_photos_are_listed() {
        let mut store = ChoiceStore::in_memory();
        let (review, _) = session(&mut store);
        let ids: Vec<&str> = review.entries().iter().map(|e| e.photo.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_flips_choice() {
        let mut store = ChoiceStore::in_memory();
        let (mut review, _) = session(&mut store);

        assert!(review.toggle("a"));
        assert!(!review.toggle("missing"));
        assert_eq!(review.to_drop().len(), 2);

        review.select_next();
        review.toggle_selected();
        assert_eq!(review.to_drop().len(), 1);
        assert_eq!(review.to_drop()[0].id, "a");
    }

    #[test]
    fn test_selection_is_bounded() {
        let mut store = ChoiceStore::in_memory();
        let (mut review, _) = session(&mut store);
        review.select_previous();
        assert_eq!(review.selected(), 0);
        review.select_next();
        review.select_next();
        assert_eq!(review.selected(), 1);
    }

    #[test]
    fn test_stats() {
        let mut store = ChoiceStore::in_memory();
        let (review, _) = session(&mut store);
        let stats = review.stats();
        assert_eq!(stats.keep, 1);
        assert_eq!(stats.drop, 1);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_dry_run_commit_keeps_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("drop.jpg");
        fs::write(&path, b"content").unwrap();
        let target = photo_at(path.clone());

        let mut store = ChoiceStore::in_memory();
        store.set_choice(target.id.clone(), Choice::Drop);
        let mut review = ReviewSession::new(std::slice::from_ref(&target), &store);
        review.set_dry_run(true);

        let report = review.commit(&mut store).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.deleted, vec![target.id.clone()]);
        assert!(path.exists());
        // Choices survive a dry run
        assert_eq!(store.choice(&target.id), Some(Choice::Drop));
    }

    #[test]
    fn test_commit_writes_back_toggled_choices() {
        let mut store = ChoiceStore::in_memory();
        let (mut review, _) = session(&mut store);
        review.set_dry_run(true);
        review.toggle("b");

        review.commit(&mut store).unwrap();
        assert_eq!(store.choice("b"), Some(Choice::Keep));
    }

    #[test]
    fn test_commit_reports_missing_files() {
        let missing = photo("/nonexistent/photoswipe/missing.jpg");
        let mut store = ChoiceStore::in_memory();
        store.set_choice(missing.id.clone(), Choice::Drop);
        let review = ReviewSession::new(std::slice::from_ref(&missing), &store);

        let report = review.commit(&mut store).unwrap();
        assert!(report.deleted.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(store.choice(&missing.id), Some(Choice::Drop));
    }
}
