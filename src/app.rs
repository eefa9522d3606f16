// SPDX-License-Identifier: MIT
//
// Application state — the review browser.
//
// Two screens. The list screen shows reviews with a cycling status
// filter; Enter opens the detail screen, a scrollable row stream of
// diffs, thread markers, and comment blocks built by the view
// composer. All state transitions happen here; `paint` only windows
// the current state into the frame.
//
// Store errors never stop the loop: they land in the status line (or
// as inline rows, for per-file failures) and the viewer keeps running.

use std::collections::HashSet;

use rv_review::anchor::DriftResult;
use rv_review::store::{ReviewDetail, ReviewStatus, ReviewStore, ReviewSummary, ThreadRecord};
use rv_review::viewport::{Move, Viewport};
use rv_term::event_loop::{Action, App};
use rv_term::grid::CellGrid;
use rv_term::input::{Event, KeyCode, KeyEvent, Modifiers, MouseEventKind};
use rv_term::terminal::Size;

use crate::theme::Theme;
use crate::view::{self, Row};

/// Rows scrolled per mouse wheel notch.
const WHEEL_STEP: usize = 3;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Status filter for the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Open,
    Closed,
}

impl Filter {
    /// Next filter in the All → Open → Closed cycle.
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::All => Self::Open,
            Self::Open => Self::Closed,
            Self::Closed => Self::All,
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parse a config value; unknown names mean no filtering.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "open" => Self::Open,
            "closed" => Self::Closed,
            _ => Self::All,
        }
    }

    const fn matches(self, status: ReviewStatus) -> bool {
        match self {
            Self::All => true,
            Self::Open => matches!(status, ReviewStatus::Open),
            Self::Closed => matches!(status, ReviewStatus::Closed),
        }
    }
}

// ─── Screens ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    List,
    Detail,
}

/// State of an open review detail screen.
struct Detail {
    review: ReviewDetail,
    threads: Vec<ThreadRecord>,
    rows: Vec<Row>,
    vp: Viewport,
    expanded: HashSet<String>,
}

// ─── Viewer ──────────────────────────────────────────────────────────────────

/// The application: holds the store, both screens, and the theme.
pub struct Viewer<S: ReviewStore> {
    store: S,
    theme: Theme,
    drift: fn(&str, i64, &str, &str) -> DriftResult,

    screen: Screen,
    reviews: Vec<ReviewSummary>,
    filtered: Vec<ReviewSummary>,
    filter: Filter,
    list_vp: Viewport,
    detail: Option<Detail>,

    /// Expand comment blocks when a review opens (config preference).
    expand_on_open: bool,

    /// Status-line notice. Cleared on the next keypress.
    message: Option<String>,
    message_is_error: bool,
}

impl<S: ReviewStore> Viewer<S> {
    /// Create a viewer and load the review list.
    ///
    /// A failing list query is not fatal: the list starts empty and the
    /// error shows in the status line.
    pub fn new(
        store: S,
        theme: Theme,
        filter: Filter,
        expand_on_open: bool,
        drift: fn(&str, i64, &str, &str) -> DriftResult,
    ) -> Self {
        let mut viewer = Self {
            store,
            theme,
            drift,
            screen: Screen::List,
            reviews: Vec::new(),
            filtered: Vec::new(),
            filter,
            list_vp: Viewport::new(1, 0),
            detail: None,
            expand_on_open,
            message: None,
            message_is_error: false,
        };
        viewer.reload_reviews();
        viewer
    }

    fn reload_reviews(&mut self) {
        match self.store.list_reviews() {
            Ok(reviews) => self.reviews = reviews,
            Err(err) => {
                self.reviews = Vec::new();
                self.set_error(err.to_string());
            }
        }
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        self.filtered = self
            .reviews
            .iter()
            .filter(|r| self.filter.matches(r.status))
            .cloned()
            .collect();
        self.list_vp.set_content_len(self.filtered.len());
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = false;
    }

    fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_is_error = true;
    }

    // ── Detail screen lifecycle ─────────────────────────────────────────

    /// Open a review by ID. Unknown IDs stay on the list screen with a
    /// status-line notice.
    pub fn open_review(&mut self, review_id: &str) {
        let review = match self.store.get_review(review_id) {
            Ok(review) => review,
            Err(err) => {
                self.set_error(err.to_string());
                return;
            }
        };
        let threads = match self.store.list_threads(review_id) {
            Ok(threads) => threads,
            Err(err) => {
                self.set_error(err.to_string());
                return;
            }
        };

        let expanded: HashSet<String> = if self.expand_on_open {
            threads.iter().map(|t| t.thread_id.clone()).collect()
        } else {
            HashSet::new()
        };

        let rows = view::build_review_rows(&self.store, &review, &threads, &expanded, self.drift);
        tracing::debug!(review_id, rows = rows.len(), threads = threads.len(), "opened review");
        let height = self.detail.as_ref().map_or(1, |d| d.vp.height());
        let vp = Viewport::new(height.max(1), rows.len());
        self.detail = Some(Detail {
            review,
            threads,
            rows,
            vp,
            expanded,
        });
        self.screen = Screen::Detail;
    }

    /// Open the review containing `thread_id` and put the selection on
    /// its thread header, expanded.
    pub fn focus_thread(&mut self, thread_id: &str) {
        let thread = match self.store.get_thread(thread_id) {
            Ok(thread) => thread,
            Err(err) => {
                self.set_error(err.to_string());
                return;
            }
        };

        // The store keys threads by ID globally; find the review that
        // lists this one.
        let review_id = self
            .reviews
            .iter()
            .map(|r| r.review_id.clone())
            .find(|rid| {
                self.store
                    .list_threads(rid)
                    .is_ok_and(|ts| ts.iter().any(|t| t.thread_id == thread.thread_id))
            });
        let Some(review_id) = review_id else {
            self.set_error(format!("no review lists thread {thread_id}"));
            return;
        };

        self.open_review(&review_id);
        if self.screen != Screen::Detail {
            return;
        }
        if let Some(detail) = &mut self.detail {
            detail.expanded.insert(thread_id.to_string());
        }
        self.rebuild_rows();
        if let Some(detail) = &mut self.detail {
            if let Some(idx) = detail
                .rows
                .iter()
                .position(|r| r.thread_id() == Some(thread_id))
            {
                detail.vp.select(idx);
            }
        }
    }

    /// Rebuild the detail row stream after an expand/collapse, keeping
    /// the selection pinned to the row it was on where possible.
    fn rebuild_rows(&mut self) {
        let Some(detail) = &mut self.detail else {
            return;
        };
        let selected_thread = detail
            .rows
            .get(detail.vp.selected())
            .and_then(|r| r.thread_id().map(String::from));

        detail.rows = view::build_review_rows(
            &self.store,
            &detail.review,
            &detail.threads,
            &detail.expanded,
            self.drift,
        );
        detail.vp.set_content_len(detail.rows.len());

        if let Some(tid) = selected_thread {
            if let Some(idx) = detail
                .rows
                .iter()
                .position(|r| r.thread_id() == Some(tid.as_str()))
            {
                detail.vp.select(idx);
            }
        }
    }

    // ── Key handling ────────────────────────────────────────────────────

    fn handle_list_key(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Escape => return Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => self.list_vp.apply(Move::Down),
            KeyCode::Char('k') | KeyCode::Up => self.list_vp.apply(Move::Up),
            KeyCode::PageDown => self.list_vp.apply(Move::PageDown),
            KeyCode::PageUp => self.list_vp.apply(Move::PageUp),
            KeyCode::Char('g') | KeyCode::Home => self.list_vp.apply(Move::Top),
            KeyCode::Char('G') | KeyCode::End => self.list_vp.apply(Move::Bottom),
            KeyCode::Char('f') => {
                self.filter = self.filter.cycle();
                self.apply_filter();
            }
            KeyCode::Char('r') => {
                self.reload_reviews();
                if self.message.is_none() {
                    self.set_message(format!("{} reviews", self.filtered.len()));
                }
            }
            KeyCode::Enter => {
                if let Some(review) = self.filtered.get(self.list_vp.selected()) {
                    let id = review.review_id.clone();
                    self.open_review(&id);
                }
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_detail_key(&mut self, key: &KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Escape => {
                self.screen = Screen::List;
                return Action::Continue;
            }
            KeyCode::Char('j') | KeyCode::Down => self.detail_move(Move::Down),
            KeyCode::Char('k') | KeyCode::Up => self.detail_move(Move::Up),
            KeyCode::PageDown => self.detail_move(Move::PageDown),
            KeyCode::PageUp => self.detail_move(Move::PageUp),
            KeyCode::Char('g') | KeyCode::Home => self.detail_move(Move::Top),
            KeyCode::Char('G') | KeyCode::End => self.detail_move(Move::Bottom),
            KeyCode::Char('n') => self.jump_thread(true),
            KeyCode::Char('p') => self.jump_thread(false),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_expand(),
            _ => {}
        }
        Action::Continue
    }

    fn detail_move(&mut self, mv: Move) {
        if let Some(detail) = &mut self.detail {
            detail.vp.apply(mv);
        }
    }

    /// Move the selection to the next/previous thread header.
    fn jump_thread(&mut self, forward: bool) {
        let Some(detail) = &mut self.detail else {
            return;
        };
        let current = detail.vp.selected();
        let found = if forward {
            detail
                .rows
                .iter()
                .enumerate()
                .skip(current + 1)
                .find(|(_, r)| r.thread_id().is_some())
                .map(|(i, _)| i)
        } else {
            detail.rows[..current]
                .iter()
                .enumerate()
                .rev()
                .find(|(_, r)| r.thread_id().is_some())
                .map(|(i, _)| i)
        };
        if let Some(idx) = found {
            detail.vp.select(idx);
        }
    }

    /// Expand or collapse the thread under the selection.
    fn toggle_expand(&mut self) {
        let Some(detail) = &mut self.detail else {
            return;
        };
        let Some(tid) = detail
            .rows
            .get(detail.vp.selected())
            .and_then(|r| r.thread_id().map(String::from))
        else {
            return;
        };
        if !detail.expanded.remove(&tid) {
            detail.expanded.insert(tid);
        }
        self.rebuild_rows();
    }

    fn handle_mouse(&mut self, kind: MouseEventKind, y: u16) {
        let mv = match kind {
            MouseEventKind::ScrollUp => Some((Move::Up, WHEEL_STEP)),
            MouseEventKind::ScrollDown => Some((Move::Down, WHEEL_STEP)),
            MouseEventKind::Press(_) => {
                // Content rows start under the header bar.
                if y >= 1 {
                    let row = usize::from(y - 1);
                    match self.screen {
                        Screen::List => {
                            let idx = self.list_vp.offset() + row;
                            self.list_vp.select(idx);
                        }
                        Screen::Detail => {
                            if let Some(detail) = &mut self.detail {
                                let idx = detail.vp.offset() + row;
                                detail.vp.select(idx);
                            }
                        }
                    }
                }
                None
            }
            MouseEventKind::Release(_) => None,
        };

        if let Some((mv, count)) = mv {
            for _ in 0..count {
                match self.screen {
                    Screen::List => self.list_vp.apply(mv),
                    Screen::Detail => self.detail_move(mv),
                }
            }
        }
    }

    // ── Status line ─────────────────────────────────────────────────────

    fn status_text(&self) -> String {
        if let Some(msg) = &self.message {
            return msg.clone();
        }
        match self.screen {
            Screen::List => format!(
                "{} reviews · filter: {} · j/k move · enter open · f filter · q quit",
                self.filtered.len(),
                self.filter.label(),
            ),
            Screen::Detail => self.detail.as_ref().map_or_else(String::new, |d| {
                format!(
                    "{} @ {} · {} threads ({} open) · n/p thread · enter expand · q back",
                    d.review.review_id,
                    d.review.current_commit,
                    d.review.thread_count,
                    d.review.open_thread_count,
                )
            }),
        }
    }

    // ── Test hooks ──────────────────────────────────────────────────────

    #[cfg(test)]
    fn detail_ref(&self) -> &Detail {
        self.detail.as_ref().unwrap()
    }
}

// ─── App impl ────────────────────────────────────────────────────────────────

impl<S: ReviewStore> App for Viewer<S> {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => {
                self.message = None;
                self.message_is_error = false;

                if key.modifiers.contains(Modifiers::CTRL) && key.code == KeyCode::Char('c') {
                    return Action::Quit;
                }

                match self.screen {
                    Screen::List => self.handle_list_key(key),
                    Screen::Detail => self.handle_detail_key(key),
                }
            }
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse.kind, mouse.y);
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, _size: Size) {
        // Viewport heights are derived from the frame in paint; the
        // event loop already forced a full redraw.
    }

    fn paint(&mut self, frame: &mut CellGrid) {
        let h = frame.height();
        frame.clear_with_bg(self.theme.base.bg);

        // Header + status take one row each; the body gets the rest.
        let body_height = usize::from(h.saturating_sub(2)).max(1);
        self.list_vp.set_height(body_height);
        if let Some(detail) = &mut self.detail {
            detail.vp.set_height(body_height);
        }

        match self.screen {
            Screen::List => {
                view::render_header(frame, &self.theme, "revu — reviews");
                view::render_list(frame, &self.theme, &self.filtered, &self.list_vp);
            }
            Screen::Detail => {
                if let Some(detail) = &self.detail {
                    let title = format!("revu — {}", detail.review.title);
                    view::render_header(frame, &self.theme, &title);
                    view::render_rows(frame, &self.theme, &detail.rows, &detail.vp);
                } else {
                    view::render_header(frame, &self.theme, "revu");
                }
            }
        }

        view::render_status(frame, &self.theme, &self.status_text(), self.message_is_error);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
