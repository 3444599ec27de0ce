//! Minimal tween driver for the live card position

use super::Position;
use std::time::Duration;

/// Timing curve applied to a tween's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Slow start and end
    EaseInOut,
    /// Fast start, settles gently (used for spring-back)
    EaseOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// A position animation from `from` to `to` over `duration`
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: Position,
    to: Position,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    pub fn new(from: Position, to: Position, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advances the tween and returns the new position
    pub fn advance(&mut self, dt: Duration) -> Position {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> Position {
        if self.duration.is_zero() {
            return self.to;
        }
        let progress = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(self.to, self.easing.apply(progress))
    }
}
