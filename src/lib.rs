//! Photoswipe - a terminal photo triage library
//!
//! Photos are grouped by month and presented as a stack of cards: swipe
//! right to keep, left to drop, then confirm the batch deletion of each
//! finished month. The swipe interaction itself lives in [`engine`] and is
//! independent of the terminal front-end.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod library;
pub mod review;
pub mod store;
pub mod thumbnail;
pub mod tui;

// Re-export primary types for convenience
pub use config::UserConfig;
pub use engine::{
    card_stack, Decision, Direction, Swipe, SwipeController, SwipeEngine, SwipeItem, SwiperConfig,
};
pub use error::{PhotoSwipeError, Result};
pub use library::{discover_photos, group_by_month, DiscoveryOptions, MonthKey, Photo};
pub use review::{CommitReport, ReviewSession};
pub use store::{Choice, ChoiceStore, Stats};
