//! Which cards are mounted, in which order, and how each one is drawn

use super::{Position, SwipeEngine, SwipeItem};

/// Transform applied to the card on top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub translate: Position,
    /// Degrees, clockwise
    pub rotation: f64,
}

/// Overlay opacities for the card on top; `None` while overlays are
/// suppressed during an undo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOpacity {
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardRole {
    /// Receives gestures and follows the drag
    Current {
        transform: CardTransform,
        overlays: Option<OverlayOpacity>,
    },
    /// Previews under the current card
    Next { opacity: f64, scale: f64 },
    /// Mounted but invisible, ready to become current
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSlot<'a, T> {
    pub index: usize,
    pub item: &'a T,
    pub role: CardRole,
}

impl<T> CardSlot<'_, T> {
    pub fn is_current(&self) -> bool {
        matches!(self.role, CardRole::Current { .. })
    }
}

/// Mounted cards in paint order: the deepest placeholder first, the
/// current card last so it ends up on top.
pub fn card_stack<T: SwipeItem>(engine: &SwipeEngine<T>) -> Vec<CardSlot<'_, T>> {
    let current = engine.current_index();
    let items = engine.items();
    if current >= items.len() {
        return Vec::new();
    }

    let last = current
        .saturating_add(engine.config().prerender_items_count)
        .min(items.len() - 1);
    let values = engine.animated_values();

    (current..=last)
        .rev()
        .map(|index| {
            let role = match index - current {
                0 => CardRole::Current {
                    transform: CardTransform {
                        translate: engine.position(),
                        rotation: values.rotation(),
                    },
                    overlays: engine.overlays_visible().then(|| OverlayOpacity {
                        left: values.left_opacity(),
                        right: values.right_opacity(),
                    }),
                },
                1 => CardRole::Next {
                    opacity: values.next_opacity(),
                    scale: values.next_scale(),
                },
                _ => CardRole::Placeholder,
            };
            CardSlot {
                index,
                item: &items[index],
                role,
            }
        })
        .collect()
}
