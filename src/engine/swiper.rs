use super::animation::{Easing, Tween};
use super::controller::{SwipeCommand, SwipeController};
use super::interpolate::AnimatedValues;
use super::{Decision, Direction, Position, Swipe, SwipeItem};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_SWIPE_THRESHOLD: f64 = 130.0;
pub const DEFAULT_PRERENDER_ITEMS_COUNT: usize = 2;

/// Off-screen target, in viewport widths
const SWIPE_OUT_FACTOR: f64 = 1.5;

const SWIPE_OUT_DURATION: Duration = Duration::from_millis(200);
const UNDO_DURATION: Duration = Duration::from_millis(200);
const SPRING_BACK_DURATION: Duration = Duration::from_millis(250);

/// What happens to the history when a looping swiper reaches an item that
/// already has a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopDecisionPolicy {
    /// Keep every historical entry, in commit order
    #[default]
    Append,
    /// Drop the earlier entry for the same id before recording the new one
    Replace,
}

/// Swiper configuration, fixed for the lifetime of an engine
#[derive(Debug, Clone)]
pub struct SwiperConfig {
    pub width: f64,
    pub height: f64,
    /// Horizontal distance a release must exceed to commit
    pub swipe_threshold: f64,
    /// Accept exactly one touch point when true
    pub disable_multi_touch: bool,
    /// Wrap back to the first item after the last one
    pub loop_items: bool,
    pub loop_policy: LoopDecisionPolicy,
    /// Upcoming items kept mounted behind the current one
    pub prerender_items_count: usize,
    pub initial_index: usize,
    pub initial_decisions: Vec<Decision>,
    pub swipe_out_duration: Duration,
    pub undo_duration: Duration,
    pub spring_back_duration: Duration,
}

impl SwiperConfig {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            disable_multi_touch: false,
            loop_items: false,
            loop_policy: LoopDecisionPolicy::default(),
            prerender_items_count: DEFAULT_PRERENDER_ITEMS_COUNT,
            initial_index: 0,
            initial_decisions: Vec::new(),
            swipe_out_duration: SWIPE_OUT_DURATION,
            undo_duration: UNDO_DURATION,
            spring_back_duration: SPRING_BACK_DURATION,
        }
    }

    /// Resume a previous session
    pub fn resume(mut self, initial_index: usize, initial_decisions: Vec<Decision>) -> Self {
        self.initial_index = initial_index;
        self.initial_decisions = initial_decisions;
        self
    }
}

/// What to do once the running animation settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
    Commit(Direction),
    UndoReturn,
    SpringBack,
}

#[derive(Debug, Clone)]
struct Animation {
    tween: Tween,
    settle: Settle,
}

type IndexCallback = Box<dyn FnMut(usize)>;
type SwipeCallback = Box<dyn FnMut(&Swipe)>;

/// Gesture-driven swiper over an ordered list of items.
///
/// All transitions happen on the caller's thread: pointer events call the
/// `gesture_*` methods, the host's frame loop calls [`tick`](Self::tick),
/// and commits only ever happen inside `tick` once the off-screen animation
/// has settled.
pub struct SwipeEngine<T: SwipeItem> {
    items: Vec<T>,
    config: SwiperConfig,
    current_index: usize,
    decisions: Vec<Decision>,
    position: Position,
    values: AnimatedValues,
    overlays_visible: bool,
    dragging: bool,
    animation: Option<Animation>,
    undo_queued: bool,
    commands_tx: mpsc::UnboundedSender<SwipeCommand>,
    commands_rx: mpsc::UnboundedReceiver<SwipeCommand>,
    on_index_change: Option<IndexCallback>,
    on_swipe: Option<SwipeCallback>,
}

impl<T: SwipeItem> SwipeEngine<T> {
    pub fn new(items: Vec<T>, mut config: SwiperConfig) -> Self {
        let current_index = if config.initial_index > items.len() {
            tracing::warn!(
                initial_index = config.initial_index,
                len = items.len(),
                "initial index past the end, clamping"
            );
            items.len()
        } else {
            config.initial_index
        };

        let decisions = std::mem::take(&mut config.initial_decisions);
        for decision in &decisions {
            if !items.iter().any(|item| item.id() == decision.id) {
                tracing::warn!(id = %decision.id, "initial decision for unknown item");
            }
        }

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let values = AnimatedValues::compute(0.0, config.width);

        Self {
            items,
            config,
            current_index,
            decisions,
            position: Position::ORIGIN,
            values,
            overlays_visible: true,
            dragging: false,
            animation: None,
            undo_queued: false,
            commands_tx,
            commands_rx,
            on_index_change: None,
            on_swipe: None,
        }
    }

    /// Called with the new index whenever `current_index` changes
    pub fn on_index_change(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_index_change = Some(Box::new(callback));
        self
    }

    /// Called for every commit and every undo
    pub fn on_swipe(mut self, callback: impl FnMut(&Swipe) + 'static) -> Self {
        self.on_swipe = Some(Box::new(callback));
        self
    }

    /// Handle for parents that swipe without owning gesture state
    pub fn controller(&self) -> SwipeController {
        SwipeController::new(self.commands_tx.clone())
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn config(&self) -> &SwiperConfig {
        &self.config
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> Option<&T> {
        self.items.get(self.current_index)
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn animated_values(&self) -> &AnimatedValues {
        &self.values
    }

    pub fn overlays_visible(&self) -> bool {
        self.overlays_visible
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// True when every item has been swiped and looping is off
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.items.len()
    }

    /// Viewport changed size
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        self.values = AnimatedValues::compute(self.position.x, width);
    }

    /// Replaces the item sequence, keeping the current item on top when it
    /// is still present. Decisions are matched by id, never by position.
    pub fn set_items(&mut self, items: Vec<T>) {
        let anchor = self.current_item().map(|item| item.id().to_string());
        self.items = items;

        let index = anchor
            .and_then(|id| self.items.iter().position(|item| item.id() == id))
            .unwrap_or_else(|| self.current_index.min(self.items.len()));

        let orphaned = self
            .decisions
            .iter()
            .filter(|decision| !self.items.iter().any(|item| item.id() == decision.id))
            .count();
        if orphaned > 0 {
            tracing::debug!(orphaned, "decisions reference items no longer present");
        }

        self.set_current_index(index);
    }

    /// Whether a touch sequence with `touches` points may start a drag
    pub fn accepts_touches(&self, touches: usize) -> bool {
        match touches {
            0 => false,
            1 => true,
            _ => !self.config.disable_multi_touch,
        }
    }

    /// Starts dragging the current card. Returns false when the gesture is
    /// not granted.
    pub fn gesture_start(&mut self, touches: usize) -> bool {
        if !self.accepts_touches(touches) || self.is_exhausted() {
            return false;
        }

        match self.animation.as_ref().map(|animation| animation.settle) {
            // The card is already leaving the screen
            Some(Settle::Commit(_)) => return false,
            Some(Settle::UndoReturn) => {
                self.animation = None;
                self.overlays_visible = true;
            }
            Some(Settle::SpringBack) => self.animation = None,
            None => {}
        }

        self.dragging = true;
        true
    }

    /// Follows the pointer while a drag is active
    pub fn gesture_move(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        self.set_position(Position::new(dx, dy));
    }

    /// Ends the drag: commits past the threshold, springs back otherwise
    pub fn gesture_release(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;

        let dx = self.position.x;
        if dx > self.config.swipe_threshold {
            self.start_swipe_out(Direction::Right);
        } else if dx < -self.config.swipe_threshold {
            self.start_swipe_out(Direction::Left);
        } else {
            self.spring_back();
        }
    }

    /// The pointer was lost (e.g. left the window)
    pub fn gesture_cancel(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.spring_back();
    }

    pub fn swipe_left(&mut self) {
        self.swipe(Direction::Left);
    }

    pub fn swipe_right(&mut self) {
        self.swipe(Direction::Right);
    }

    /// Programmatic swipe, equivalent to a release past the threshold
    pub fn swipe(&mut self, direction: Direction) {
        if self.is_exhausted() {
            tracing::trace!(?direction, "nothing left to swipe");
            return;
        }
        self.dragging = false;
        self.start_swipe_out(direction);
    }

    /// Undoes the most recent decision.
    ///
    /// No-op at index 0. Requested while a commit animation is in flight,
    /// the undo runs right after that commit lands and restores the item it
    /// committed, even when the commit wrapped back to the first item.
    pub fn swipe_back(&mut self) {
        if matches!(
            self.animation.as_ref().map(|animation| animation.settle),
            Some(Settle::Commit(_))
        ) {
            tracing::debug!("undo queued behind pending commit");
            self.undo_queued = true;
            return;
        }

        if self.current_index == 0 {
            tracing::trace!("nothing to undo");
            return;
        }

        self.undo(self.current_index - 1);
    }

    /// Advances the running animation by `elapsed`, after applying any
    /// commands queued through a [`SwipeController`]
    pub fn tick(&mut self, elapsed: Duration) {
        while let Ok(command) = self.commands_rx.try_recv() {
            self.apply(command);
        }

        let Some(animation) = self.animation.as_mut() else {
            return;
        };
        let position = animation.tween.advance(elapsed);
        let finished = animation.tween.is_finished();
        self.set_position(position);

        if finished {
            if let Some(animation) = self.animation.take() {
                self.settle(animation.settle);
            }
        }
    }

    fn apply(&mut self, command: SwipeCommand) {
        match command {
            SwipeCommand::SwipeLeft => self.swipe_left(),
            SwipeCommand::SwipeRight => self.swipe_right(),
            SwipeCommand::SwipeBack => self.swipe_back(),
        }
    }

    fn off_screen(&self, direction: Direction) -> Position {
        Position::new(direction.sign() * SWIPE_OUT_FACTOR * self.config.width, 0.0)
    }

    fn start_swipe_out(&mut self, direction: Direction) {
        if let Some(Animation {
            settle: Settle::UndoReturn,
            ..
        }) = self.animation
        {
            self.overlays_visible = true;
        }

        tracing::debug!(index = self.current_index, ?direction, "swiping out");
        let tween = Tween::new(
            self.position,
            self.off_screen(direction),
            self.config.swipe_out_duration,
            Easing::EaseInOut,
        );
        self.animation = Some(Animation {
            tween,
            settle: Settle::Commit(direction),
        });
    }

    fn spring_back(&mut self) {
        if self.position == Position::ORIGIN {
            return;
        }
        let tween = Tween::new(
            self.position,
            Position::ORIGIN,
            self.config.spring_back_duration,
            Easing::EaseOut,
        );
        self.animation = Some(Animation {
            tween,
            settle: Settle::SpringBack,
        });
    }

    fn settle(&mut self, settle: Settle) {
        match settle {
            Settle::Commit(direction) => {
                let committed = self.commit(direction);
                if std::mem::take(&mut self.undo_queued) {
                    match committed {
                        Some(index) => self.undo(index),
                        None => tracing::debug!("queued undo dropped, nothing was committed"),
                    }
                }
            }
            Settle::UndoReturn => {
                self.overlays_visible = true;
                self.set_position(Position::ORIGIN);
            }
            Settle::SpringBack => self.set_position(Position::ORIGIN),
        }
    }

    /// Records the current item's decision and returns its index
    fn commit(&mut self, direction: Direction) -> Option<usize> {
        let committed = self.current_index;
        let Some(item) = self.items.get(committed) else {
            tracing::trace!(index = committed, "commit past the end absorbed");
            self.set_position(Position::ORIGIN);
            return None;
        };
        let id = item.id().to_string();

        if self.config.loop_policy == LoopDecisionPolicy::Replace {
            self.decisions.retain(|decision| decision.id != id);
        }
        let decision = Decision::new(id, direction);
        self.decisions.push(decision.clone());
        tracing::debug!(id = %decision.id, ?direction, "decision committed");
        self.emit_swipe(decision.into());

        let next = if self.current_index + 1 < self.items.len() {
            self.current_index + 1
        } else if self.config.loop_items {
            0
        } else {
            self.items.len()
        };
        self.set_current_index(next);
        self.set_position(Position::ORIGIN);
        Some(committed)
    }

    /// Brings the item at `restore` back and retracts its latest decision
    fn undo(&mut self, restore: usize) {
        self.dragging = false;
        let Some(item) = self.items.get(restore) else {
            tracing::warn!(index = restore, "undo target out of range");
            return;
        };
        let id = item.id().to_string();

        let direction = match self.decisions.iter().rposition(|decision| decision.id == id) {
            Some(pos) => self.decisions.remove(pos).direction,
            None => {
                tracing::warn!(%id, "no decision recorded for restored item");
                self.decisions
                    .last()
                    .map_or(Direction::Right, |decision| decision.direction)
            }
        };

        tracing::debug!(%id, ?direction, "decision undone");
        self.overlays_visible = false;
        self.emit_swipe(Swipe {
            id,
            direction: None,
        });
        self.set_current_index(restore);

        // Snap to where the card left, then bring it back
        let snapped = self.off_screen(direction);
        self.set_position(snapped);
        self.animation = Some(Animation {
            tween: Tween::new(
                snapped,
                Position::ORIGIN,
                self.config.undo_duration,
                Easing::EaseInOut,
            ),
            settle: Settle::UndoReturn,
        });
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
        self.values = AnimatedValues::compute(position.x, self.config.width);
    }

    fn set_current_index(&mut self, index: usize) {
        if index == self.current_index {
            return;
        }
        self.current_index = index;
        if let Some(callback) = self.on_index_change.as_mut() {
            callback(index);
        }
    }

    fn emit_swipe(&mut self, swipe: Swipe) {
        if let Some(callback) = self.on_swipe.as_mut() {
            callback(&swipe);
        }
    }
}

impl<T: SwipeItem> fmt::Debug for SwipeEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwipeEngine")
            .field("len", &self.items.len())
            .field("current_index", &self.current_index)
            .field("decisions", &self.decisions)
            .field("position", &self.position)
            .field("overlays_visible", &self.overlays_visible)
            .field("dragging", &self.dragging)
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}
