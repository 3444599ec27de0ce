// Application state: screens, the open swiper and the review of a finished month
use super::card::card_rect;
use super::input::{
    handle_key_event, KeyAction, PointerAction, PointerTracker, UNITS_PER_COLUMN, UNITS_PER_ROW,
};
use super::screen_layout;
use crate::config::SwiperPreferences;
use crate::engine::{SwipeController, SwipeEngine, SwiperConfig};
use crate::library::{MonthKey, Photo};
use crate::review::{CommitReport, ReviewSession};
use crate::store::{ChoiceStore, Stats};
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Month buckets with their progress
    Months,
    /// Card stack of the open month
    Swipe,
    /// Decided photos of a finished month
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Welcome,
}

#[derive(Debug, Clone)]
pub struct MonthEntry {
    pub key: MonthKey,
    pub photos: Vec<Photo>,
}

/// Swiper over the photos of one month
pub struct SwipeSession {
    month: usize,
    engine: SwipeEngine<Photo>,
    controller: SwipeController,
}

impl SwipeSession {
    pub fn engine(&self) -> &SwipeEngine<Photo> {
        &self.engine
    }
}

pub struct ReviewState {
    month: usize,
    session: ReviewSession,
}

impl ReviewState {
    pub fn session(&self) -> &ReviewSession {
        &self.session
    }
}

pub struct App {
    months: Vec<MonthEntry>,
    selected_month: usize,
    hide_kept: bool,
    store: Rc<RefCell<ChoiceStore>>,
    preferences: SwiperPreferences,
    dry_run: bool,
    screen: Screen,
    overlay: Option<Overlay>,
    swipe: Option<SwipeSession>,
    review: Option<ReviewState>,
    pointer: PointerTracker,
    card_area: Rect,
    status: Option<String>,
    welcome_dismissed: bool,
    should_quit: bool,
}

impl App {
    pub fn new(
        months: Vec<MonthEntry>,
        store: ChoiceStore,
        preferences: SwiperPreferences,
        dry_run: bool,
    ) -> Self {
        Self {
            months,
            selected_month: 0,
            hide_kept: false,
            store: Rc::new(RefCell::new(store)),
            preferences,
            dry_run,
            screen: Screen::Months,
            overlay: None,
            swipe: None,
            review: None,
            pointer: PointerTracker::default(),
            card_area: card_rect(screen_layout(Rect::new(0, 0, 80, 24))[1]),
            status: None,
            welcome_dismissed: false,
            should_quit: false,
        }
    }

    /// Shows the welcome dialog on top of the first screen
    pub fn with_welcome(mut self) -> Self {
        self.overlay = Some(Overlay::Welcome);
        self
    }

    /// Leaves months whose photos are all kept out of the month list
    pub fn with_hide_kept(mut self, hide: bool) -> Self {
        self.hide_kept = hide;
        self.fix_selection();
        self
    }

    pub fn hides_kept_months(&self) -> bool {
        self.hide_kept
    }

    /// Indices of the months listed on the month screen
    pub fn visible_months(&self) -> Vec<usize> {
        let store = self.store.borrow();
        self.months
            .iter()
            .enumerate()
            .filter(|(_, entry)| !self.hide_kept || !store.month_is_kept(&entry.photos))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    pub fn months(&self) -> &[MonthEntry] {
        &self.months
    }

    pub fn selected_month(&self) -> usize {
        self.selected_month
    }

    pub fn month_stats(&self, index: usize) -> Stats {
        self.months
            .get(index)
            .map(|entry| self.store.borrow().month_stats(&entry.photos))
            .unwrap_or_default()
    }

    /// Month shown by the swipe or review screen
    pub fn open_month(&self) -> Option<&MonthEntry> {
        let index = match self.screen {
            Screen::Swipe => self.swipe.as_ref()?.month,
            Screen::Review => self.review.as_ref()?.month,
            Screen::Months => return None,
        };
        self.months.get(index)
    }

    pub fn swipe_session(&self) -> Option<&SwipeSession> {
        self.swipe.as_ref()
    }

    pub fn review(&self) -> Option<&ReviewState> {
        self.review.as_ref()
    }

    pub fn store(&self) -> Ref<'_, ChoiceStore> {
        self.store.borrow()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn card_area(&self) -> Rect {
        self.card_area
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// True once after the welcome dialog was closed, so it can be persisted
    pub fn take_welcome_dismissed(&mut self) -> bool {
        std::mem::take(&mut self.welcome_dismissed)
    }

    /// Follows the terminal size; the engine works in units scaled from cells
    pub fn resize(&mut self, area: Rect) {
        let card_area = card_rect(screen_layout(area)[1]);
        if card_area == self.card_area {
            return;
        }
        self.card_area = card_area;

        // Drag offsets are measured against the old card position
        if self.pointer.is_active() {
            self.focus_lost();
        }
        if let Some(swipe) = self.swipe.as_mut() {
            let (width, height) = engine_size(self.card_area);
            swipe.engine.resize(width, height);
        }
    }

    pub fn select_month(&mut self, key: MonthKey) -> bool {
        match self.months.iter().position(|entry| entry.key == key) {
            Some(index) => {
                self.selected_month = index;
                true
            }
            None => false,
        }
    }

    /// Opens the selected month: the swiper, or its review when every photo
    /// already has a choice
    pub fn open_selected_month(&mut self) {
        let Some(entry) = self.months.get(self.selected_month) else {
            return;
        };
        if entry.photos.is_empty() {
            self.status = Some(format!("{} has no photos left", entry.key));
            return;
        }

        let complete = self.store.borrow().month_is_complete(&entry.photos);
        if complete {
            self.start_review(self.selected_month);
        } else {
            self.start_swipe(self.selected_month);
        }
    }

    fn start_swipe(&mut self, month: usize) {
        let Some(entry) = self.months.get(month) else {
            return;
        };
        let photos = entry.photos.clone();

        // Resume after the photos decided in an earlier session
        let (resume_index, decisions) = {
            let store = self.store.borrow();
            let resume_index = photos
                .iter()
                .position(|photo| store.choice(&photo.id).is_none())
                .unwrap_or(photos.len());
            (resume_index, store.initial_decisions(&photos[..resume_index]))
        };

        let (width, height) = engine_size(self.card_area);
        let mut config = SwiperConfig::new(width, height);
        config.swipe_threshold = self.preferences.swipe_threshold;
        config.loop_items = self.preferences.loop_items;
        config.prerender_items_count = self.preferences.prerender_items_count;
        config.disable_multi_touch = self.preferences.disable_multi_touch;
        let config = config.resume(resume_index, decisions);

        let store = Rc::clone(&self.store);
        let engine = SwipeEngine::new(photos, config)
            .on_swipe(move |swipe| {
                let mut store = store.borrow_mut();
                store.apply_swipe(swipe);
                if let Err(e) = store.save() {
                    tracing::warn!(error = %e, "failed to save choices");
                }
            })
            .on_index_change(|index| tracing::debug!(index, "current photo changed"));
        let controller = engine.controller();

        tracing::info!(month = %entry.key, resume_index, "swiping month");
        self.swipe = Some(SwipeSession {
            month,
            engine,
            controller,
        });
        self.pointer.reset();
        self.status = None;
        self.screen = Screen::Swipe;
    }

    fn start_review(&mut self, month: usize) {
        let Some(entry) = self.months.get(month) else {
            return;
        };
        let mut session = ReviewSession::new(&entry.photos, &self.store.borrow());
        session.set_dry_run(self.dry_run);

        tracing::info!(month = %entry.key, entries = session.entries().len(), "reviewing month");
        self.review = Some(ReviewState { month, session });
        self.swipe = None;
        self.pointer.reset();
        self.screen = Screen::Review;
    }

    fn back_to_months(&mut self) {
        self.swipe = None;
        self.review = None;
        self.pointer.reset();
        self.screen = Screen::Months;
        self.fix_selection();
    }

    /// Moves the selection off a month the filter hides
    fn fix_selection(&mut self) {
        let visible = self.visible_months();
        if visible.is_empty() || visible.contains(&self.selected_month) {
            return;
        }
        self.selected_month = visible
            .iter()
            .copied()
            .find(|&index| index > self.selected_month)
            .or_else(|| visible.last().copied())
            .unwrap_or(0);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.overlay {
            Some(Overlay::Welcome) => {
                self.overlay = None;
                self.welcome_dismissed = true;
                return;
            }
            // Any key closes help
            Some(Overlay::Help) => {
                self.overlay = None;
                return;
            }
            None => {}
        }

        let action = handle_key_event(key);
        if action == KeyAction::Help {
            self.overlay = Some(Overlay::Help);
            return;
        }

        match self.screen {
            Screen::Months => self.handle_months_key(action),
            Screen::Swipe => self.handle_swipe_key(action),
            Screen::Review => self.handle_review_key(action),
        }
    }

    fn handle_months_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Up => {
                let visible = self.visible_months();
                if let Some(&previous) = visible.iter().rev().find(|&&i| i < self.selected_month) {
                    self.selected_month = previous;
                }
            }
            KeyAction::Down => {
                let visible = self.visible_months();
                if let Some(&next) = visible.iter().find(|&&i| i > self.selected_month) {
                    self.selected_month = next;
                }
            }
            KeyAction::Confirm | KeyAction::Keep => {
                if self.visible_months().contains(&self.selected_month) {
                    self.open_selected_month();
                }
            }
            KeyAction::Filter => {
                self.hide_kept = !self.hide_kept;
                self.fix_selection();
                tracing::debug!(hide_kept = self.hide_kept, "month filter changed");
                self.status = Some(if self.hide_kept {
                    "Hiding months where every photo is kept".to_string()
                } else {
                    "Showing every month".to_string()
                });
            }
            _ => {}
        }
    }

    fn handle_swipe_key(&mut self, action: KeyAction) {
        let Some(swipe) = self.swipe.as_ref() else {
            self.back_to_months();
            return;
        };
        match action {
            KeyAction::Keep => swipe.controller.swipe_right(),
            KeyAction::Drop => swipe.controller.swipe_left(),
            KeyAction::Undo => swipe.controller.swipe_back(),
            KeyAction::Quit => self.back_to_months(),
            // Looping swipers never run out, so the review is opened by hand
            KeyAction::Confirm => {
                let month = swipe.month;
                let complete = self
                    .months
                    .get(month)
                    .is_some_and(|entry| self.store.borrow().month_is_complete(&entry.photos));
                if complete {
                    self.start_review(month);
                } else {
                    self.status = Some("Some photos still need a choice".to_string());
                }
            }
            _ => {}
        }
    }

    fn handle_review_key(&mut self, action: KeyAction) {
        let Some(review) = self.review.as_mut() else {
            self.back_to_months();
            return;
        };
        match action {
            KeyAction::Up => review.session.select_previous(),
            KeyAction::Down => review.session.select_next(),
            KeyAction::Toggle => {
                review.session.toggle_selected();
            }
            KeyAction::Confirm => self.commit_review(),
            KeyAction::Quit => self.back_to_months(),
            _ => {}
        }
    }

    fn commit_review(&mut self) {
        let Some(review) = self.review.take() else {
            return;
        };

        let result = review.session.commit(&mut self.store.borrow_mut());
        match result {
            Ok(report) => {
                self.status = Some(commit_message(&report));
                if !report.dry_run {
                    if let Some(entry) = self.months.get_mut(review.month) {
                        entry
                            .photos
                            .retain(|photo| !report.deleted.contains(&photo.id));
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "review commit failed");
                self.status = Some(format!("Failed to save choices: {}", e));
            }
        }
        self.back_to_months();
    }

    /// Drives the current card from mouse press, drag and release
    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if self.overlay.is_some() || self.screen != Screen::Swipe {
            return;
        }
        let Some(swipe) = self.swipe.as_mut() else {
            return;
        };

        match self.pointer.handle(event, self.card_area) {
            PointerAction::Start { touches } => {
                if !swipe.engine.gesture_start(touches) {
                    self.pointer.reset();
                }
            }
            PointerAction::Move { dx, dy } => swipe.engine.gesture_move(dx, dy),
            PointerAction::Release => swipe.engine.gesture_release(),
            PointerAction::Cancel => swipe.engine.gesture_cancel(),
            PointerAction::None => {}
        }
    }

    /// The terminal lost focus in the middle of a drag
    pub fn focus_lost(&mut self) {
        if let PointerAction::Cancel = self.pointer.cancel() {
            if let Some(swipe) = self.swipe.as_mut() {
                swipe.engine.gesture_cancel();
            }
        }
    }

    /// Advances animations; a month whose last photo was swiped moves on to
    /// its review
    pub fn tick(&mut self, elapsed: Duration) {
        let Some(swipe) = self.swipe.as_mut() else {
            return;
        };
        swipe.engine.tick(elapsed);

        if swipe.engine.is_exhausted() && !swipe.engine.is_animating() {
            let month = swipe.month;
            self.start_review(month);
        }
    }
}

fn engine_size(card: Rect) -> (f64, f64) {
    (
        card.width as f64 * UNITS_PER_COLUMN,
        card.height as f64 * UNITS_PER_ROW,
    )
}

fn commit_message(report: &CommitReport) -> String {
    let mut message = if report.dry_run {
        format!("[DRY RUN] Would have trashed {} photos", report.deleted.len())
    } else {
        format!("Moved {} photos to trash", report.deleted.len())
    };
    if !report.failed.is_empty() {
        message.push_str(&format!(", {} failed", report.failed.len()));
    }
    message
}
