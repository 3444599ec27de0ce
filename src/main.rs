use photoswipe::cli::{is_confirmation, AppConfig, Args, LogLevel};
use photoswipe::config::UserConfig;
use photoswipe::library::{discover_photos, group_by_month, DiscoveryOptions, SortOrder};
use photoswipe::store::ChoiceStore;
use photoswipe::thumbnail::ThumbnailLoader;
use photoswipe::tui::{render_app, App, MonthEntry};
use photoswipe::Result;

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{
    io,
    time::{Duration, Instant},
};

/// Target frame time of the UI loop
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(args.log_file.clone(), args.log_level);

    // Load user configuration
    let mut user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    let config = AppConfig::resolve(args, &user_config.swiper);
    run_app_with_config(&config, &mut user_config)
}

/// Logs go to a file; the terminal belongs to the TUI
fn init_logging(log_file: Option<PathBuf>, level: LogLevel) {
    let Some(path) = log_file.or_else(|| {
        dirs::cache_dir().map(|dir| dir.join("photoswipe").join("photoswipe.log"))
    }) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(level))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => eprintln!("Warning: Failed to open log file {}: {}", path.display(), e),
    }
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig, user_config: &mut UserConfig) -> Result<()> {
    let options = DiscoveryOptions {
        show_hidden: config.show_hidden,
        recursive: config.recursive,
    };
    let photos = discover_photos(&config.directory, &options)?;

    if photos.is_empty() {
        println!(
            "No photos found in directory: {}",
            config.directory.display()
        );
        if !config.recursive {
            println!("(Try --recursive to include subdirectories)");
        }
        return Ok(());
    }
    tracing::info!(count = photos.len(), directory = %config.directory.display(), "photos discovered");

    let mut months: Vec<MonthEntry> = group_by_month(photos, config.order)
        .into_iter()
        .map(|(key, photos)| MonthEntry { key, photos })
        .collect();
    if config.order == SortOrder::Desc {
        months.reverse();
    }

    let mut store = match &config.store {
        Some(path) => ChoiceStore::load(path.clone())?,
        None => ChoiceStore::load_default()?,
    };

    if config.reset {
        print!("Forget all {} saved choices? [y/N] ", store.stats().total);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if is_confirmation(&answer) {
            store.reset();
            store.save()?;
            println!("Saved choices cleared");
        } else {
            println!("Reset cancelled");
        }
    }

    // Print dry-run notice
    if config.dry_run {
        println!("[DRY RUN] No photos will be moved to trash");
        println!("   Found {} months to review", months.len());
        println!("   Press Enter to continue...");
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
    }

    let mut app = App::new(months, store, config.swiper.clone(), config.dry_run)
        .with_hide_kept(user_config.hide_kept_months);
    if config.show_welcome || !user_config.welcome_shown {
        app = app.with_welcome();
    }
    if let Some(month) = config.month {
        if app.select_month(month) {
            app.open_selected_month();
        } else {
            tracing::warn!(%month, "no photos in requested month");
        }
    }

    let mut thumbnails = ThumbnailLoader::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(&mut terminal, &mut app, &mut thumbnails, user_config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    // Print summary after exit
    let stats = app.store().stats();
    if config.dry_run {
        println!("\n[DRY RUN] Complete");
    }
    println!("   Kept: {} photos", stats.keep);
    println!("   Marked to drop: {} photos", stats.drop);

    result
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    thumbnails: &mut ThumbnailLoader,
    user_config: &mut UserConfig,
) -> Result<()> {
    let mut last_frame = Instant::now();

    loop {
        let size = terminal.size()?;
        app.resize(Rect::new(0, 0, size.width, size.height));
        thumbnails.poll();

        terminal.draw(|frame| render_app(frame, app, thumbnails))?;

        // Drain every pending event so drags stay smooth
        if event::poll(FRAME)? {
            loop {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                    Event::Mouse(mouse) => app.handle_mouse(mouse),
                    Event::FocusLost => app.focus_lost(),
                    _ => {}
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        let welcome_dismissed = app.take_welcome_dismissed();
        if welcome_dismissed || app.hides_kept_months() != user_config.hide_kept_months {
            // Persist the welcome flag and the month filter
            user_config.welcome_shown |= welcome_dismissed;
            user_config.hide_kept_months = app.hides_kept_months();
            if let Err(e) = user_config.save() {
                tracing::warn!(error = %e, "failed to save user config");
            }
        }

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
