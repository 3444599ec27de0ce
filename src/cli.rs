// CLI module for argument parsing and configuration

use crate::config::SwiperPreferences;
use crate::library::{MonthKey, SortOrder};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Photoswipe - triage your photos month by month
///
/// Swipe right to keep, left to drop, then confirm the deletions.
#[derive(Parser, Debug, Clone)]
#[command(name = "photoswipe")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the photos
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Open this month directly (format: YYYY-MM)
    #[arg(short = 'm', long = "month")]
    pub month: Option<String>,

    /// Dry run mode - review and confirm without moving anything to trash
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Horizontal drag distance that commits a swipe
    #[arg(long = "threshold")]
    pub swipe_threshold: Option<f64>,

    /// Start over from the first photo after the last one
    #[arg(long = "loop", action = ArgAction::SetTrue)]
    pub loop_items: bool,

    /// Number of upcoming photos prepared behind the current one
    #[arg(long = "prerender")]
    pub prerender: Option<usize>,

    /// Only accept single-button drags
    #[arg(long = "single-touch", action = ArgAction::SetTrue)]
    pub single_touch: bool,

    /// Order of photos inside a month
    #[arg(short = 'o', long = "order", value_enum, default_value = "asc")]
    pub order: OrderArg,

    /// Include hidden files (files starting with .)
    #[arg(long = "hidden", action = ArgAction::SetTrue)]
    pub show_hidden: bool,

    /// Scan subdirectories too
    #[arg(short = 'R', long = "recursive", action = ArgAction::SetTrue)]
    pub recursive: bool,

    /// Choice store location (defaults to the user data directory)
    #[arg(long = "store")]
    pub store: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long = "log-level", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Show the welcome screen even if it was already seen
    #[arg(long = "welcome", action = ArgAction::SetTrue)]
    pub show_welcome: bool,

    /// Forget every saved choice before starting (asks for confirmation)
    #[arg(long = "reset", action = ArgAction::SetTrue)]
    pub reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OrderArg {
    /// Oldest first
    #[default]
    Asc,
    /// Newest first
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Parsed `--month`, if given and valid
    pub fn get_month(&self) -> Option<MonthKey> {
        self.month.as_ref().and_then(|m| m.parse().ok())
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if !self.directory.exists() {
            return Err(format!(
                "Directory does not exist: {}",
                self.directory.display()
            ));
        }

        if !self.directory.is_dir() {
            return Err(format!(
                "Path is not a directory: {}",
                self.directory.display()
            ));
        }

        if let Some(ref month) = self.month {
            if let Err(e) = month.parse::<MonthKey>() {
                return Err(e.to_string());
            }
        }

        if let Some(threshold) = self.swipe_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(format!(
                    "Invalid threshold: {}. It must be a positive number",
                    threshold
                ));
            }
        }

        Ok(())
    }
}

/// Whether an answer to a yes/no prompt means yes
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Configuration derived from CLI arguments and saved preferences
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: PathBuf,
    pub month: Option<MonthKey>,
    pub dry_run: bool,
    pub order: SortOrder,
    pub show_hidden: bool,
    pub recursive: bool,
    pub store: Option<PathBuf>,
    pub show_welcome: bool,
    pub reset: bool,
    pub swiper: SwiperPreferences,
}

impl AppConfig {
    /// Command line flags win over saved preferences
    pub fn resolve(args: Args, preferences: &SwiperPreferences) -> Self {
        let swiper = SwiperPreferences {
            swipe_threshold: args
                .swipe_threshold
                .unwrap_or(preferences.swipe_threshold),
            loop_items: args.loop_items || preferences.loop_items,
            prerender_items_count: args.prerender.unwrap_or(preferences.prerender_items_count),
            disable_multi_touch: args.single_touch || preferences.disable_multi_touch,
        };

        AppConfig {
            month: args.get_month(),
            directory: args.directory,
            dry_run: args.dry_run,
            order: args.order.into(),
            show_hidden: args.show_hidden,
            recursive: args.recursive,
            store: args.store,
            show_welcome: args.show_welcome,
            reset: args.reset,
            swiper,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        AppConfig::resolve(args, &SwiperPreferences::default())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            directory: PathBuf::from("."),
            month: None,
            dry_run: false,
            order: SortOrder::Asc,
            show_hidden: false,
            recursive: false,
            store: None,
            show_welcome: false,
            reset: false,
            swiper: SwiperPreferences::default(),
        }
    }
}
