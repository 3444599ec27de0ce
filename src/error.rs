//! Error types shared by the library and the binary

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoSwipeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Trash error: {0}")]
    Trash(String),

    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
}

pub type Result<T> = std::result::Result<T, PhotoSwipeError>;

impl From<trash::Error> for PhotoSwipeError {
    fn from(err: trash::Error) -> Self {
        PhotoSwipeError::Trash(err.to_string())
    }
}
