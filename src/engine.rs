//! Card swiping engine
//!
//! The engine tracks which item of an ordered sequence is on top of the
//! stack, the decisions taken so far, and the live drag position of the
//! current card. Everything visual (rotation, overlay opacity, next card
//! preview) is derived from the live position.

pub mod animation;
pub mod controller;
pub mod interpolate;
pub mod stack;
pub mod swiper;

pub use animation::{Easing, Tween};
pub use controller::{SwipeCommand, SwipeController};
pub use interpolate::{interpolate, AnimatedValues};
pub use stack::{card_stack, CardRole, CardSlot, CardTransform, OverlayOpacity};
pub use swiper::{LoopDecisionPolicy, SwipeEngine, SwiperConfig};

use serde::{Deserialize, Serialize};

/// Anything that can be swiped. Only identity matters to the engine.
pub trait SwipeItem {
    fn id(&self) -> &str;
}

impl SwipeItem for String {
    fn id(&self) -> &str {
        self
    }
}

/// Discrete outcome of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Drop
    Left,
    /// Keep
    Right,
}

impl Direction {
    /// Sign of the horizontal axis this direction points to
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// A committed choice for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: String,
    pub direction: Direction,
}

impl Decision {
    pub fn new(id: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            direction,
        }
    }
}

/// Notification sent for every commit or undo.
///
/// `direction == None` retracts the previous decision for `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    pub id: String,
    pub direction: Option<Direction>,
}

impl From<Decision> for Swipe {
    fn from(decision: Decision) -> Self {
        Swipe {
            id: decision.id,
            direction: Some(decision.direction),
        }
    }
}

/// Offset of the current card from its resting place
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Position, t: f64) -> Position {
        Position {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}
