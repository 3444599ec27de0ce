// Color palette shared by every screen
use ratatui::style::Color;

/// Drop actions and destructive confirmations
pub const ACCENT_PRIMARY: Color = Color::Rgb(235, 87, 87);
/// Keep actions and progress
pub const ACCENT_SECONDARY: Color = Color::Rgb(111, 207, 151);
/// Titles, selection and key hints
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(242, 201, 76);

pub const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 230);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 140, 150);

pub const BG_DARK: Color = Color::Rgb(24, 24, 32);
pub const BORDER_COLOR: Color = Color::Rgb(90, 90, 110);
/// Border of the card waiting behind the current one
pub const BORDER_DIM: Color = Color::Rgb(55, 55, 70);
