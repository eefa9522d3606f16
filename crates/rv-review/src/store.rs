// SPDX-License-Identifier: MIT
//
// Review store interface — read-only queries against a review backend.
//
// The viewer never touches storage directly. Everything it shows comes
// through this trait: review summaries for the list screen, thread and
// comment records for the detail screen, plus the diff text and raw
// file content the anchoring engine works on. The binary ships an
// in-memory implementation; a real backend would wrap a database.

use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A failed store query.
///
/// `NotFound` is a normal outcome (deep links can name stale IDs) and
/// falls back to the list view. `Backend` is surfaced inline in the
/// affected pane; the render loop keeps running either way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind ("review", "thread", ...).
        kind: &'static str,
        /// The ID that missed.
        id: String,
    },
    /// The backend failed to answer the query.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Review lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Open,
    Closed,
}

impl ReviewStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Thread lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    Open,
    Resolved,
}

impl ThreadStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

/// Summary of a review for the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub review_id: String,
    pub title: String,
    pub author: String,
    pub status: ReviewStatus,
    pub thread_count: usize,
    pub open_thread_count: usize,
}

/// Full details of a review for the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDetail {
    pub review_id: String,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub status: ReviewStatus,
    /// Commit the review was opened against.
    pub initial_commit: String,
    /// Commit of the diff currently shown. Threads anchored at older
    /// commits go through the drift function to land here.
    pub current_commit: String,
    pub thread_count: usize,
    pub open_thread_count: usize,
}

/// A comment thread anchored to a line selection.
///
/// `selection_start`/`selection_end` are line numbers in the coordinate
/// space of `commit_hash` — not necessarily the commit whose diff is on
/// screen. The anchoring engine owns the translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRecord {
    pub thread_id: String,
    pub file_path: String,
    pub selection_start: i64,
    pub selection_end: Option<i64>,
    pub commit_hash: String,
    pub status: ThreadStatus,
    pub comment_count: usize,
}

impl ThreadRecord {
    /// End of the selection, falling back to the start for single-line
    /// selections.
    #[inline]
    #[must_use]
    pub fn selection_last(&self) -> i64 {
        self.selection_end.unwrap_or(self.selection_start)
    }
}

/// A single comment in a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: String,
    pub author: String,
    pub body: String,
    pub created_at: String,
}

// ─── Store Trait ─────────────────────────────────────────────────────────────

/// Read-only review backend.
///
/// All methods return owned records; the store is free to query lazily
/// or serve from memory. Errors are typed — `NotFound` for stale IDs,
/// `Backend` for everything else.
pub trait ReviewStore {
    /// All reviews, newest first.
    fn list_reviews(&self) -> Result<Vec<ReviewSummary>, StoreError>;

    /// Full details for one review.
    fn get_review(&self, review_id: &str) -> Result<ReviewDetail, StoreError>;

    /// All threads in a review, in file/selection order.
    fn list_threads(&self, review_id: &str) -> Result<Vec<ThreadRecord>, StoreError>;

    /// One thread by ID.
    fn get_thread(&self, thread_id: &str) -> Result<ThreadRecord, StoreError>;

    /// All comments in a thread, oldest first.
    fn list_comments(&self, thread_id: &str) -> Result<Vec<Comment>, StoreError>;

    /// Files touched by a review, in display order.
    fn list_files(&self, review_id: &str) -> Result<Vec<String>, StoreError>;

    /// Unified diff text for one file at the review's current commit.
    fn get_diff(&self, review_id: &str, file_path: &str) -> Result<String, StoreError>;

    /// Raw file content at the current commit, one entry per line.
    /// Used by orphaned-context sections.
    fn get_file_lines(&self, review_id: &str, file_path: &str)
    -> Result<Vec<String>, StoreError>;
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_formats_kind_and_id() {
        let err = StoreError::not_found("thread", "t-42");
        assert_eq!(err.to_string(), "thread not found: t-42");
    }

    #[test]
    fn backend_error_formats_message() {
        let err = StoreError::Backend("connection refused".into());
        assert_eq!(err.to_string(), "backend error: connection refused");
    }

    #[test]
    fn status_labels() {
        assert_eq!(ReviewStatus::Open.label(), "open");
        assert_eq!(ReviewStatus::Closed.label(), "closed");
        assert_eq!(ThreadStatus::Open.label(), "open");
        assert_eq!(ThreadStatus::Resolved.label(), "resolved");
    }

    #[test]
    fn selection_last_falls_back_to_start() {
        let mut thread = ThreadRecord {
            thread_id: "t-1".into(),
            file_path: "src/lib.rs".into(),
            selection_start: 10,
            selection_end: None,
            commit_hash: "abc".into(),
            status: ThreadStatus::Open,
            comment_count: 1,
        };
        assert_eq!(thread.selection_last(), 10);
        thread.selection_end = Some(14);
        assert_eq!(thread.selection_last(), 14);
    }
}
