// Card stack rendering: engine transforms mapped to terminal cells
use super::colors::*;
use super::input::{UNITS_PER_COLUMN, UNITS_PER_ROW};
use crate::engine::{card_stack, CardRole, CardTransform, OverlayOpacity, SwipeEngine};
use crate::library::Photo;
use crate::thumbnail::{ThumbnailLoader, ThumbnailState};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

/// Opacity under which a card or badge is not drawn at all
const VISIBLE_OPACITY: f64 = 0.05;
/// Opacity from which a badge is drawn at full intensity
const STRONG_OPACITY: f64 = 0.5;

/// Resting footprint of the current card inside the content area
pub fn card_rect(area: Rect) -> Rect {
    let width = (area.width * 3 / 5).max(area.width.min(24));
    let height = area.height.saturating_sub(2).max(area.height.min(3));
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Cells available for the thumbnail inside a bordered card
pub fn thumbnail_size(card: Rect) -> (u16, u16) {
    (card.width.saturating_sub(2), card.height.saturating_sub(2))
}

/// `rect` moved by whole cells and clipped to `bounds`, with how many
/// columns and rows were cut off at the left and top
fn offset_rect(rect: Rect, dx: i32, dy: i32, bounds: Rect) -> Option<(Rect, u16, u16)> {
    let left = rect.x as i32 + dx;
    let top = rect.y as i32 + dy;
    let right = (left + rect.width as i32).min(bounds.right() as i32);
    let bottom = (top + rect.height as i32).min(bounds.bottom() as i32);
    let clipped_left = left.max(bounds.x as i32);
    let clipped_top = top.max(bounds.y as i32);

    if clipped_left >= right || clipped_top >= bottom {
        return None;
    }

    Some((
        Rect {
            x: clipped_left as u16,
            y: clipped_top as u16,
            width: (right - clipped_left) as u16,
            height: (bottom - clipped_top) as u16,
        },
        (clipped_left - left) as u16,
        (clipped_top - top) as u16,
    ))
}

/// `rect` shrunk around its center
fn scaled_rect(rect: Rect, scale: f64) -> Rect {
    let scale = scale.clamp(0.0, 1.0);
    let width = ((rect.width as f64 * scale).round() as u16).max(1);
    let height = ((rect.height as f64 * scale).round() as u16).max(1);
    Rect {
        x: rect.x + (rect.width - width) / 2,
        y: rect.y + (rect.height - height) / 2,
        width,
        height,
    }
}

/// Terminal cells cannot rotate, so the angle is shown as a slanted glyph
pub fn tilt_label(rotation: f64) -> Option<String> {
    if rotation.abs() < 1.0 {
        return None;
    }
    let glyph = if rotation < 0.0 { '╲' } else { '╱' };
    Some(format!(" {} {:+.0}° ", glyph, rotation))
}

fn badge_style(color: ratatui::style::Color, opacity: f64) -> Style {
    if opacity >= STRONG_OPACITY {
        Style::default()
            .fg(BG_DARK)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color).add_modifier(Modifier::DIM)
    }
}

fn thumbnail_lines(
    photo: &Photo,
    thumbnails: &mut ThumbnailLoader,
    size: (u16, u16),
) -> (Vec<Line<'static>>, Alignment) {
    match thumbnails.state(&photo.path, size.0, size.1) {
        ThumbnailState::Ready(lines) => (lines.as_ref().clone(), Alignment::Center),
        ThumbnailState::Loading => (
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Loading preview...",
                    Style::default()
                        .fg(TEXT_SECONDARY)
                        .add_modifier(Modifier::ITALIC),
                )),
            ],
            Alignment::Center,
        ),
        ThumbnailState::Error(e) => (
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "[!] No preview",
                    Style::default()
                        .fg(ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(e, Style::default().fg(TEXT_SECONDARY))),
            ],
            Alignment::Center,
        ),
    }
}

/// Renders the mounted cards back to front and queues their thumbnails
pub fn render_card_stack(
    frame: &mut Frame,
    area: Rect,
    engine: &SwipeEngine<Photo>,
    thumbnails: &mut ThumbnailLoader,
) {
    let card = card_rect(area);
    let size = thumbnail_size(card);
    let stack = card_stack(engine);

    thumbnails.prefetch(stack.iter().map(|slot| slot.item.path.as_path()), size.0, size.1);

    for slot in &stack {
        match slot.role {
            CardRole::Placeholder => {}
            CardRole::Next { opacity, scale } => {
                if opacity > VISIBLE_OPACITY {
                    render_next_card(frame, scaled_rect(card, scale), slot.item, opacity);
                }
            }
            CardRole::Current {
                transform,
                overlays,
            } => render_current_card(frame, area, card, slot.item, transform, overlays, thumbnails),
        }
    }
}

fn render_next_card(frame: &mut Frame, rect: Rect, photo: &Photo, opacity: f64) {
    let border = if opacity >= STRONG_OPACITY {
        BORDER_COLOR
    } else {
        BORDER_DIM
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", photo.name))
        .style(Style::default().fg(TEXT_SECONDARY).add_modifier(Modifier::DIM));

    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);
}

fn render_current_card(
    frame: &mut Frame,
    bounds: Rect,
    card: Rect,
    photo: &Photo,
    transform: CardTransform,
    overlays: Option<OverlayOpacity>,
    thumbnails: &mut ThumbnailLoader,
) {
    let dx = (transform.translate.x / UNITS_PER_COLUMN).round() as i32;
    let dy = (transform.translate.y / UNITS_PER_ROW).round() as i32;
    let Some((rect, cut_columns, cut_rows)) = offset_rect(card, dx, dy, bounds) else {
        return;
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .title(Span::styled(
            format!(" {} ", photo.name),
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(BG_DARK));
    if let Some(tilt) = tilt_label(transform.rotation) {
        block = block.title_bottom(Line::from(tilt).alignment(Alignment::Right));
    }

    let inner = block.inner(rect);
    frame.render_widget(Clear, rect);
    frame.render_widget(block, rect);

    let (lines, alignment) = thumbnail_lines(photo, thumbnails, thumbnail_size(card));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(alignment)
            .scroll((cut_rows, cut_columns)),
        inner,
    );

    if let Some(overlays) = overlays {
        render_badges(frame, inner, overlays);
    }
}

fn render_badges(frame: &mut Frame, inner: Rect, overlays: OverlayOpacity) {
    const KEEP: &str = " KEEP ";
    const DROP: &str = " DROP ";
    let badge_width = KEEP.len() as u16;
    if inner.height == 0 || inner.width < badge_width + 2 {
        return;
    }

    if overlays.right > VISIBLE_OPACITY {
        let rect = Rect::new(inner.x + 1, inner.y, badge_width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                KEEP,
                badge_style(ACCENT_SECONDARY, overlays.right),
            )),
            rect,
        );
    }
    if overlays.left > VISIBLE_OPACITY {
        let rect = Rect::new(inner.right() - badge_width - 1, inner.y, badge_width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(DROP, badge_style(ACCENT_PRIMARY, overlays.left))),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SwiperConfig;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    fn photo(name: &str) -> Photo {
        let path = PathBuf::from("/nonexistent/photoswipe").join(name);
        Photo {
            id: path.to_string_lossy().into_owned(),
            path,
            name: name.to_string(),
            size: 2048,
            taken: Utc::now(),
        }
    }

    fn engine() -> SwipeEngine<Photo> {
        SwipeEngine::new(
            vec![photo("first.jpg"), photo("second.jpg"), photo("third.jpg")],
            SwiperConfig::new(400.0, 300.0),
        )
    }

    fn draw(engine: &SwipeEngine<Photo>) -> String {
        let mut thumbnails = ThumbnailLoader::new().unwrap();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_card_stack(frame, frame.area(), engine, &mut thumbnails))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_card_rect_is_centered() {
        let card = card_rect(Rect::new(0, 0, 100, 20));
        assert_eq!(card, Rect::new(20, 1, 60, 18));

        let narrow = card_rect(Rect::new(0, 0, 10, 2));
        assert_eq!(narrow.width, 10);
        assert_eq!(narrow.height, 2);
    }

    #[test]
    fn test_offset_rect_clips_to_bounds() {
        let bounds = Rect::new(0, 0, 50, 20);
        let card = Rect::new(10, 2, 30, 10);

        let (rect, cut_columns, cut_rows) = offset_rect(card, -15, 0, bounds).unwrap();
        assert_eq!(rect, Rect::new(0, 2, 25, 10));
        assert_eq!((cut_columns, cut_rows), (5, 0));

        let (rect, _, _) = offset_rect(card, 30, 0, bounds).unwrap();
        assert_eq!(rect, Rect::new(40, 2, 10, 10));

        assert!(offset_rect(card, 60, 0, bounds).is_none());
    }

    #[test]
    fn test_scaled_rect() {
        let rect = Rect::new(0, 0, 40, 20);
        assert_eq!(scaled_rect(rect, 1.0), rect);
        assert_eq!(scaled_rect(rect, 0.5), Rect::new(10, 5, 20, 10));
    }

    #[test]
    fn test_tilt_label() {
        assert_eq!(tilt_label(0.4), None);
        assert_eq!(tilt_label(8.0).as_deref(), Some(" ╱ +8° "));
        assert_eq!(tilt_label(-12.2).as_deref(), Some(" ╲ -12° "));
    }

    #[test]
    fn test_render_resting_card() {
        let content = draw(&engine());
        assert!(content.contains("first.jpg"));
        assert!(content.contains("Loading preview"));
        // The next card is fully transparent at rest
        assert!(!content.contains("second.jpg"));
        assert!(!content.contains("KEEP"));
        assert!(!content.contains("DROP"));
    }

    #[test]
    fn test_render_drag_right_shows_keep_badge() {
        let mut engine = engine();
        assert!(engine.gesture_start(1));
        // Far enough for the dimmed next card to peek out on the left
        engine.gesture_move(128.0, 0.0);

        let content = draw(&engine);
        assert!(content.contains("KEEP"));
        assert!(!content.contains("DROP"));
        assert!(content.contains("second.jpg"));
        assert!(content.contains("+13°"));
    }

    #[test]
    fn test_render_drag_left_shows_drop_badge() {
        let mut engine = engine();
        assert!(engine.gesture_start(1));
        engine.gesture_move(-80.0, 0.0);

        let content = draw(&engine);
        assert!(content.contains("DROP"));
        assert!(!content.contains("KEEP"));
        assert!(content.contains("-10°"));
    }

    #[test]
    fn test_render_exhausted_engine_draws_nothing() {
        let mut engine = engine();
        for _ in 0..3 {
            engine.swipe_left();
            engine.tick(std::time::Duration::from_secs(1));
        }
        let content = draw(&engine);
        assert!(!content.contains(".jpg"));
    }
}
