// TUI module for rendering the terminal interface
pub mod app;
pub mod card;
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use app::{App, MonthEntry, Overlay, Screen};
pub use card::render_card_stack;
pub use colors::*;
pub use helpers::{calculate_progress, format_file_size};
pub use input::{handle_key_event, KeyAction, PointerAction, PointerTracker};

use crate::store::{Choice, Stats};
use crate::thumbnail::ThumbnailLoader;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Header, content and footer areas shared by every screen
pub fn screen_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header with progress
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Renders the current screen and its overlay
pub fn render_app(frame: &mut Frame, app: &App, thumbnails: &mut ThumbnailLoader) {
    let [header, content, footer] = screen_layout(frame.area());

    match app.screen() {
        Screen::Months => {
            render_months_header(frame, header, app);
            render_months(frame, content, app);
            render_footer(frame, footer, MONTHS_CONTROLS);
        }
        Screen::Swipe => {
            render_swipe_header(frame, header, app);
            match app.swipe_session() {
                Some(swipe) if !swipe.engine().is_exhausted() => {
                    render_card_stack(frame, content, swipe.engine(), thumbnails)
                }
                _ => frame.render_widget(render_empty_state_widget(), content),
            }
            render_footer(frame, footer, SWIPE_CONTROLS);
        }
        Screen::Review => {
            render_review_header(frame, header, app);
            render_review(frame, content, app);
            render_footer(frame, footer, REVIEW_CONTROLS);
        }
    }

    match app.overlay() {
        Some(Overlay::Help) => render_help_overlay(frame),
        Some(Overlay::Welcome) => render_welcome_overlay(frame),
        None => {}
    }
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Title line, info line and a progress gauge
fn render_header(
    frame: &mut Frame,
    area: Rect,
    title: String,
    info: Vec<Span<'_>>,
    done: usize,
    total: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    let title_line = Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )]);

    let header = Paragraph::new(vec![title_line, Line::from(info)])
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, chunks[0]);

    let progress = calculate_progress(done, total);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!(
            "{}% ({}/{})",
            (progress * 100.0) as u16,
            done,
            total
        ));

    frame.render_widget(gauge, chunks[1]);
}

fn status_or<'a>(app: &'a App, info: Vec<Span<'a>>) -> Vec<Span<'a>> {
    match app.status() {
        Some(status) => vec![Span::styled(
            status,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::ITALIC),
        )],
        None => info,
    }
}

fn stats_spans(stats: &Stats) -> Vec<Span<'static>> {
    vec![
        Span::styled("✓ ", Style::default().fg(ACCENT_SECONDARY)),
        Span::styled(
            format!("{:<4}", stats.keep),
            Style::default().fg(ACCENT_SECONDARY),
        ),
        Span::styled("✗ ", Style::default().fg(ACCENT_PRIMARY)),
        Span::styled(
            format!("{:<4}", stats.drop),
            Style::default().fg(ACCENT_PRIMARY),
        ),
        Span::styled("○ ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled(
            format!("{}", stats.unknown),
            Style::default().fg(TEXT_SECONDARY),
        ),
    ]
}

fn render_months_header(frame: &mut Frame, area: Rect, app: &App) {
    let (done, total) = (0..app.months().len())
        .map(|index| app.month_stats(index))
        .fold((0, 0), |(done, total), stats| {
            (done + stats.keep + stats.drop, total + stats.total)
        });

    let shown = app.visible_months().len();
    let months = if shown < app.months().len() {
        format!("{} of {} months (kept hidden)", shown, app.months().len())
    } else {
        format!("{} months", shown)
    };
    let mut info = vec![Span::styled(months, Style::default().fg(TEXT_PRIMARY))];
    if app.is_dry_run() {
        info.push(Span::styled(
            "  [DRY RUN]",
            Style::default().fg(ACCENT_PRIMARY),
        ));
    }

    render_header(
        frame,
        area,
        " Photoswipe ".to_string(),
        status_or(app, info),
        done,
        total,
    );
}

fn render_months(frame: &mut Frame, area: Rect, app: &App) {
    let shown = app.visible_months();
    if shown.is_empty() {
        frame.render_widget(render_empty_state_widget(), area);
        return;
    }

    let visible = area.height.saturating_sub(2).max(1) as usize;
    let selected = shown
        .iter()
        .position(|&index| index == app.selected_month())
        .unwrap_or(0);
    let first = (selected + 1).saturating_sub(visible);

    let lines: Vec<Line> = shown
        .iter()
        .skip(first)
        .take(visible)
        .filter_map(|&index| app.months().get(index).map(|entry| (index, entry)))
        .map(|(index, entry)| {
            let stats = app.month_stats(index);
            let selected = index == app.selected_month();
            let marker = if selected { " ▶ " } else { "   " };
            let name_style = if selected {
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_PRIMARY)
            };
            let done = if stats.total > 0 && stats.unknown == 0 {
                Span::styled("  done", Style::default().fg(ACCENT_SECONDARY))
            } else {
                Span::raw("")
            };

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(ACCENT_HIGHLIGHT)),
                Span::styled(
                    format!("{:<10} {}", entry.key.month_name(), entry.key.year),
                    name_style,
                ),
                Span::styled(
                    format!("  {:>5} photos   ", entry.photos.len()),
                    Style::default().fg(TEXT_SECONDARY),
                ),
            ];
            spans.extend(stats_spans(&stats));
            spans.push(done);
            Line::from(spans)
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR))
            .title(" Months "),
    );
    frame.render_widget(list, area);
}

fn render_swipe_header(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(entry), Some(swipe)) = (app.open_month(), app.swipe_session()) else {
        return;
    };
    let engine = swipe.engine();
    let stats = app.store().month_stats(&entry.photos);
    let total = engine.items().len();

    let title = format!(
        " {} {} · Photo {}/{} ",
        entry.key.month_name(),
        entry.key.year,
        (engine.current_index() + 1).min(total),
        total
    );
    let info = match engine.current_item() {
        Some(photo) => vec![
            Span::styled(
                photo.name.clone(),
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "({} • {})",
                    format_file_size(photo.size),
                    photo.taken.format("%Y-%m-%d")
                ),
                Style::default().fg(TEXT_SECONDARY),
            ),
        ],
        None => vec![Span::styled(
            "All photos decided",
            Style::default().fg(TEXT_SECONDARY),
        )],
    };

    render_header(
        frame,
        area,
        title,
        status_or(app, info),
        stats.keep + stats.drop,
        stats.total,
    );
}

fn render_review_header(frame: &mut Frame, area: Rect, app: &App) {
    let (Some(entry), Some(review)) = (app.open_month(), app.review()) else {
        return;
    };
    let stats = review.session().stats();

    let mut info = stats_spans(&stats);
    if review.session().is_dry_run() {
        info.push(Span::styled(
            "   [DRY RUN] nothing will be deleted",
            Style::default().fg(ACCENT_PRIMARY),
        ));
    }

    render_header(
        frame,
        area,
        format!(" Review {} {} ", entry.key.month_name(), entry.key.year),
        info,
        stats.drop,
        stats.total,
    );
}

fn render_review(frame: &mut Frame, area: Rect, app: &App) {
    let Some(review) = app.review() else {
        return;
    };
    let session = review.session();

    let visible = area.height.saturating_sub(2).max(1) as usize;
    let first = (session.selected() + 1).saturating_sub(visible);

    let lines: Vec<Line> = session
        .entries()
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(index, entry)| {
            let selected = index == session.selected();
            let (mark, label, color) = match entry.choice {
                Choice::Keep => ("✓", "keep", ACCENT_SECONDARY),
                Choice::Drop => ("✗", "drop", ACCENT_PRIMARY),
            };
            let name_style = if selected {
                Style::default()
                    .fg(ACCENT_HIGHLIGHT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_PRIMARY)
            };
            Line::from(vec![
                Span::styled(
                    if selected { " ▶ " } else { "   " },
                    Style::default().fg(ACCENT_HIGHLIGHT),
                ),
                Span::styled(format!("{} {}  ", mark, label), Style::default().fg(color)),
                Span::styled(entry.photo.name.clone(), name_style),
                Span::styled(
                    format!("  {}", format_file_size(entry.photo.size)),
                    Style::default().fg(TEXT_SECONDARY),
                ),
            ])
        })
        .collect();

    let title = format!(" {} to trash ", session.to_drop().len());
    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR))
            .title(title),
    );
    frame.render_widget(list, area);
}

/// Creates an empty state widget
fn render_empty_state_widget() -> Paragraph<'static> {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "No Photos Here",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Every photo has a choice, or the directory has none.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center)
}

type Controls = &'static [(&'static str, &'static str)];

const MONTHS_CONTROLS: Controls = &[
    ("↑↓ ", "Select"),
    ("Enter ", "Open"),
    ("h ", "Hide kept"),
    ("? ", "Help"),
    ("q ", "Quit"),
];
const SWIPE_CONTROLS: Controls = &[
    ("← ", "Drop"),
    ("→ ", "Keep"),
    ("u ", "Undo"),
    ("Enter ", "Review"),
    ("? ", "Help"),
    ("q ", "Back"),
];
const REVIEW_CONTROLS: Controls = &[
    ("↑↓ ", "Select"),
    ("Space ", "Toggle"),
    ("Enter ", "Confirm"),
    ("q ", "Back"),
];

/// Renders the footer with styled controls
fn render_footer(frame: &mut Frame, area: Rect, controls: Controls) {
    let mut spans = Vec::new();
    for (index, (key, label)) in controls.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  │  "));
        }
        let key_color = match *label {
            "Drop" => ACCENT_PRIMARY,
            "Keep" => ACCENT_SECONDARY,
            "Undo" | "Confirm" => ACCENT_HIGHLIGHT,
            _ => TEXT_SECONDARY,
        };
        spans.push(Span::styled(
            *key,
            Style::default().fg(key_color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(*label, Style::default().fg(TEXT_SECONDARY)));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

fn key_line(keys: &'static str, color: ratatui::style::Color, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", keys), Style::default().fg(color)),
        Span::raw(text),
    ])
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let help_area = centered_rect(60, 80, area);

    // Clear background
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Keyboard & Mouse",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        key_line("→ or k", ACCENT_SECONDARY, "Keep photo"),
        key_line("← or d", ACCENT_PRIMARY, "Drop photo"),
        key_line("drag", TEXT_SECONDARY, "Swipe the card with the mouse"),
        key_line("u / Ctrl+Z", ACCENT_HIGHLIGHT, "Undo last swipe"),
        Line::from(""),
        key_line("↑↓ or i/j", TEXT_SECONDARY, "Select month or photo"),
        key_line("Space", TEXT_SECONDARY, "Toggle keep/drop in review"),
        key_line("Enter", TEXT_SECONDARY, "Open month, confirm review"),
        key_line("h", TEXT_SECONDARY, "Hide or show fully kept months"),
        Line::from(""),
        key_line("q or Esc", TEXT_SECONDARY, "Back / Quit"),
        key_line("?", TEXT_SECONDARY, "Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines).style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(85, 85, frame.area());

    // Clear background
    frame.render_widget(Clear, area);

    let bullet = || Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY));
    let bold = |text: &'static str| Span::styled(text, Style::default().add_modifier(Modifier::BOLD));

    let welcome_lines = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "Welcome to photoswipe!",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Go through your photos one month at a time. Swipe right to keep a"),
        Line::from("photo, left to drop it. When a month is done, review the photos"),
        Line::from("you dropped and confirm to move them to the trash."),
        Line::from(""),
        key_line("→ / drag →", ACCENT_SECONDARY, "  Keep"),
        key_line("← / drag ←", ACCENT_PRIMARY, "  Drop"),
        key_line("u", ACCENT_HIGHLIGHT, "  Undo last swipe"),
        key_line("?", TEXT_SECONDARY, "  Show help (access this anytime)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Safety Features:",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            bullet(),
            Span::raw("Nothing is deleted until you confirm a month's review"),
        ]),
        Line::from(vec![
            bullet(),
            Span::raw("Photos are moved to your system "),
            bold("trash"),
            Span::raw(" (not permanently deleted)"),
        ]),
        Line::from(vec![
            bullet(),
            Span::raw("Choices are saved as you go, so you can stop and resume"),
        ]),
        Line::from(vec![
            bullet(),
            Span::raw("Run with "),
            bold("--dry-run"),
            Span::raw(" to try it without deleting anything"),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to start...",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )]),
    ];

    let welcome_text = Paragraph::new(welcome_lines)
        .block(
            Block::default()
                .title(Span::styled(
                    " Welcome to photoswipe ",
                    Style::default()
                        .fg(ACCENT_HIGHLIGHT)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome_text, area);
}
