// Photo thumbnails rendered with half-block characters, loaded in the background
//
// The TUI asks for the thumbnails of every mounted card, so the photos
// behind the current one are decoded before they reach the top.

use crate::error::Result;
use image::{DynamicImage, GenericImageView, Pixel};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Maximum number of cached thumbnails
const CACHE_SIZE: usize = 16;

pub type ThumbnailLines = Arc<Vec<Line<'static>>>;

/// A thumbnail is specific to the cell area it was rendered for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    pub path: PathBuf,
    pub cols: u16,
    pub rows: u16,
}

#[derive(Debug, Clone)]
pub enum ThumbnailState {
    Loading,
    Ready(ThumbnailLines),
    Error(String),
}

/// Loads an image from a file path
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;
    let ratio = width_ratio.min(height_ratio).min(1.0);

    (
        ((original_width as f64 * ratio) as u32).max(1),
        ((original_height as f64 * ratio) as u32).max(1),
    )
}

/// Converts an image to styled lines, two pixels per cell: the upper pixel
/// is the foreground of '▀', the lower one its background.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    let height = height + height % 2;

    let img = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let img = img.to_rgb8();

    (0..height / 2)
        .map(|row| {
            let upper_y = row * 2;
            let lower_y = upper_y + 1;
            let spans: Vec<Span<'static>> = (0..width)
                .map(|x| {
                    let upper = img.get_pixel(x, upper_y).to_rgb();
                    let lower = img.get_pixel(x, lower_y).to_rgb();
                    Span::styled(
                        "▀",
                        Style::default()
                            .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                            .bg(Color::Rgb(lower[0], lower[1], lower[2])),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Renders the photo at `path` to fit inside `cols` x `rows` cells
pub fn render_thumbnail(path: &Path, cols: u16, rows: u16) -> Result<Vec<Line<'static>>> {
    let img = load_image(path)?;
    let (width, height) = img.dimensions();
    let (new_width, new_height) =
        calculate_resize_dimensions(width, height, cols as u32, rows as u32 * 2);
    if new_width == 0 || new_height == 0 {
        return Ok(Vec::new());
    }
    Ok(image_to_halfblock_lines(&img, new_width, new_height))
}

/// LRU-like cache for thumbnails
#[derive(Debug)]
struct ThumbnailCache {
    entries: HashMap<ThumbnailKey, ThumbnailLines>,
    /// Most recent at the end
    access_order: Vec<ThumbnailKey>,
    max_size: usize,
}

impl ThumbnailCache {
    fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            access_order: Vec::new(),
            max_size,
        }
    }

    fn get(&mut self, key: &ThumbnailKey) -> Option<ThumbnailLines> {
        let lines = self.entries.get(key)?.clone();
        self.access_order.retain(|k| k != key);
        self.access_order.push(key.clone());
        Some(lines)
    }

    fn insert(&mut self, key: ThumbnailKey, lines: ThumbnailLines) {
        if self.entries.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else if self.entries.len() >= self.max_size && !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.entries.remove(&oldest);
        }

        self.entries.insert(key.clone(), lines);
        self.access_order.push(key);
    }

    fn contains(&self, key: &ThumbnailKey) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

type LoadResult = (ThumbnailKey, std::result::Result<Vec<Line<'static>>, String>);

/// Decodes thumbnails on a background runtime; the UI loop polls results
/// without blocking
pub struct ThumbnailLoader {
    runtime: Option<tokio::runtime::Runtime>,
    results_tx: mpsc::UnboundedSender<LoadResult>,
    results_rx: mpsc::UnboundedReceiver<LoadResult>,
    cache: ThumbnailCache,
    pending: HashSet<ThumbnailKey>,
    /// Decode errors by path; a file that fails fails at every size
    failed: HashMap<PathBuf, String>,
}

impl ThumbnailLoader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("photoswipe-thumbnails")
            .enable_all()
            .build()?;
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime: Some(runtime),
            results_tx,
            results_rx,
            cache: ThumbnailCache::new(CACHE_SIZE),
            pending: HashSet::new(),
            failed: HashMap::new(),
        })
    }

    /// Starts decoding unless the thumbnail is cached, pending or failed
    pub fn request(&mut self, path: &Path, cols: u16, rows: u16) {
        if self.failed.contains_key(path) {
            return;
        }
        let key = ThumbnailKey {
            path: path.to_path_buf(),
            cols,
            rows,
        };
        if self.cache.contains(&key) || self.pending.contains(&key) {
            return;
        }
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };

        self.pending.insert(key.clone());
        let tx = self.results_tx.clone();
        runtime.spawn_blocking(move || {
            let result = render_thumbnail(&key.path, key.cols, key.rows).map_err(|e| e.to_string());
            // Loader dropped while decoding
            let _ = tx.send((key, result));
        });
    }

    /// Requests every path, e.g. the mounted cards of the stack
    pub fn prefetch<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>, cols: u16, rows: u16) {
        for path in paths {
            self.request(path, cols, rows);
        }
    }

    /// Collects finished decodes
    pub fn poll(&mut self) {
        while let Ok((key, result)) = self.results_rx.try_recv() {
            self.pending.remove(&key);
            match result {
                Ok(lines) => self.cache.insert(key, Arc::new(lines)),
                Err(e) => {
                    tracing::warn!(path = %key.path.display(), error = %e, "thumbnail failed");
                    self.failed.insert(key.path, e);
                }
            }
        }
    }

    pub fn state(&mut self, path: &Path, cols: u16, rows: u16) -> ThumbnailState {
        let key = ThumbnailKey {
            path: path.to_path_buf(),
            cols,
            rows,
        };
        if let Some(lines) = self.cache.get(&key) {
            return ThumbnailState::Ready(lines);
        }
        match self.failed.get(path) {
            Some(e) => ThumbnailState::Error(e.clone()),
            None => ThumbnailState::Loading,
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for ThumbnailLoader {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 10 % 256) as u8, (y * 10 % 256) as u8, 128])
        });
        img.save(&path).unwrap();
        path
    }

    fn wait_for(loader: &mut ThumbnailLoader, path: &Path, cols: u16, rows: u16) -> ThumbnailState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            loader.poll();
            let state = loader.state(path, cols, rows);
            if !matches!(state, ThumbnailState::Loading) || Instant::now() > deadline {
                return state;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_calculate_resize_dimensions_scale_down() {
        assert_eq!(calculate_resize_dimensions(200, 100, 50, 50), (50, 25));
        assert_eq!(calculate_resize_dimensions(100, 400, 50, 50), (12, 50));
    }

    #[test]
    fn test_calculate_resize_dimensions_no_upscale() {
        assert_eq!(calculate_resize_dimensions(10, 10, 100, 100), (10, 10));
    }

    #[test]
    fn test_calculate_resize_dimensions_zero() {
        assert_eq!(calculate_resize_dimensions(0, 10, 100, 100), (0, 0));
    }

    #[test]
    fn test_image_to_halfblock_dimensions() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(8, 8));
        let lines = image_to_halfblock_lines(&img, 5, 3);
        // Odd heights are rounded up to a full cell
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.spans.len(), 5);
        }
    }

    #[test]
    fn test_load_image_nonexistent() {
        assert!(load_image(Path::new("/nonexistent/image.png")).is_err());
    }

    #[test]
    fn test_render_thumbnail_fits_area() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_png(temp_dir.path(), "wide.png", 80, 40);

        let lines = render_thumbnail(&path, 20, 20).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].spans.len(), 20);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = ThumbnailCache::new(2);
        let key = |name: &str| ThumbnailKey {
            path: PathBuf::from(name),
            cols: 1,
            rows: 1,
        };
        cache.insert(key("a"), Arc::new(Vec::new()));
        cache.insert(key("b"), Arc::new(Vec::new()));
        // Touch "a" so "b" becomes the oldest
        assert!(cache.get(&key("a")).is_some());
        cache.insert(key("c"), Arc::new(Vec::new()));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
    }

    #[test]
    fn test_loader_decodes_in_background() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_png(temp_dir.path(), "photo.png", 30, 30);

        let mut loader = ThumbnailLoader::new().unwrap();
        assert!(matches!(loader.state(&path, 10, 5), ThumbnailState::Loading));

        loader.request(&path, 10, 5);
        loader.request(&path, 10, 5);
        assert_eq!(loader.pending(), 1);

        match wait_for(&mut loader, &path, 10, 5) {
            ThumbnailState::Ready(lines) => assert_eq!(lines.len(), 5),
            other => panic!("expected ready thumbnail, got {other:?}"),
        }
        assert_eq!(loader.cache_size(), 1);
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_loader_reports_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let mut loader = ThumbnailLoader::new().unwrap();
        loader.prefetch([path.as_path()], 10, 5);

        assert!(matches!(
            wait_for(&mut loader, &path, 10, 5),
            ThumbnailState::Error(_)
        ));

        // A new size after a resize does not decode the broken file again
        loader.request(&path, 20, 10);
        assert_eq!(loader.pending(), 0);
        assert!(matches!(
            loader.state(&path, 20, 10),
            ThumbnailState::Error(_)
        ));
    }
}
