//! Photo discovery and month bucketing

use crate::engine::SwipeItem;
use crate::error::PhotoSwipeError;
use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "tif", "tiff",
];

pub fn is_photo_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    PHOTO_EXTENSIONS.contains(&ext.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Stable identity, the canonical path as a string
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// Capture time, approximated by the file's modification time
    pub taken: DateTime<Utc>,
}

impl Photo {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let taken: DateTime<Utc> = metadata.modified()?.into();
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Photo {
            id: path.to_string_lossy().into_owned(),
            path,
            name,
            size: metadata.len(),
            taken,
        })
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(&self.taken)
    }
}

impl SwipeItem for Photo {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Calendar month a photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// English month name, e.g. "March"
    pub fn month_name(&self) -> &'static str {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        NAMES[(self.month as usize).saturating_sub(1).min(11)]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = PhotoSwipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PhotoSwipeError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

/// Order of photos inside a month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Asc,
    Desc,
}

/// Options for photo discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Include files starting with '.'
    pub show_hidden: bool,
    /// Descend into subdirectories
    pub recursive: bool,
}

/// Lists the photos in `dir`.
///
/// Unreadable entries are skipped rather than failing the whole scan.
pub fn discover_photos(dir: &Path, options: &DiscoveryOptions) -> io::Result<Vec<Photo>> {
    let mut photos = Vec::new();
    collect_photos(dir, options, &mut photos)?;
    tracing::debug!(dir = %dir.display(), count = photos.len(), "photos discovered");
    Ok(photos)
}

fn collect_photos(dir: &Path, options: &DiscoveryOptions, photos: &mut Vec<Photo>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !options.show_hidden && file_name.starts_with('.') {
            continue;
        }

        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if metadata.is_dir() {
            if options.recursive {
                if let Err(e) = collect_photos(&path, options, photos) {
                    tracing::warn!(path = %path.display(), error = %e, "skipping directory");
                }
            }
            continue;
        }

        let is_photo = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_photo_extension);
        if !is_photo {
            continue;
        }

        match Photo::from_path(&path) {
            Ok(photo) => photos.push(photo),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping photo"),
        }
    }
    Ok(())
}

/// Buckets photos by month, each bucket sorted by capture time
pub fn group_by_month(photos: Vec<Photo>, order: SortOrder) -> BTreeMap<MonthKey, Vec<Photo>> {
    let mut months: BTreeMap<MonthKey, Vec<Photo>> = BTreeMap::new();
    for photo in photos {
        months.entry(photo.month()).or_default().push(photo);
    }

    for photos in months.values_mut() {
        photos.sort_by(|a, b| a.taken.cmp(&b.taken).then_with(|| a.name.cmp(&b.name)));
        if order == SortOrder::Desc {
            photos.reverse();
        }
    }
    months
}
