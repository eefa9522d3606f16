// SPDX-License-Identifier: MIT
//
// View composer — turns app state into one CellGrid per frame.
//
// Two screens: the review list and the review detail. The detail
// screen is a flat stream of display rows built once per state change
// (not per frame): file headers, hunk headers, diff lines with gutter
// numbers and thread markers, expandable comment blocks, and
// orphaned-thread context sections. The viewport then windows that
// stream; painting is a straight loop over the visible slice.
//
// Store and parse failures never abort composition — they become rows
// in the affected pane and everything else still renders.

use std::collections::HashSet;

use rv_review::anchor::{anchor_threads, context_ranges, DriftResult};
use rv_review::parse::{self, LineKind};
use rv_review::store::{ReviewDetail, ReviewStore, ReviewSummary, ThreadRecord, ThreadStatus};
use rv_review::viewport::Viewport;
use rv_term::grid::CellGrid;

use crate::theme::Theme;

/// Marker glyph for an open thread.
const MARKER_OPEN: char = '●';
/// Marker glyph for a resolved thread.
const MARKER_RESOLVED: char = '○';

// ─── Display rows ────────────────────────────────────────────────────────────

/// One renderable row of the review detail stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// File banner: path plus added/removed counts.
    FileHeader {
        path: String,
        added: usize,
        removed: usize,
    },
    /// A file whose diff could not be parsed or fetched.
    Unavailable { path: String, reason: String },
    /// `@@ ... @@` row.
    HunkHeader { text: String },
    /// One diff line with gutter numbers and an optional thread marker.
    DiffLine {
        kind: LineKind,
        old_line: Option<u32>,
        new_line: Option<u32>,
        content: String,
        marker: Option<ThreadStatus>,
    },
    /// Collapsible header of a comment thread.
    ThreadHeader {
        thread_id: String,
        status: ThreadStatus,
        comment_count: usize,
        expanded: bool,
    },
    /// Author + timestamp line of one comment.
    CommentAuthor { author: String, created_at: String },
    /// One line of comment body text.
    CommentBody { text: String },
    /// Banner for an orphaned thread's context section.
    OrphanHeader {
        thread_id: String,
        status: ThreadStatus,
    },
    /// Raw file line inside an orphaned context section.
    ContextLine {
        line_no: i64,
        content: String,
        marker: Option<ThreadStatus>,
    },
    /// `··· N lines ···` separator between discontinuous context ranges.
    Gap { skipped: i64 },
    /// Spacer.
    Blank,
}

impl Row {
    /// The thread this row heads, if it is a thread or orphan header.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::ThreadHeader { thread_id, .. } | Self::OrphanHeader { thread_id, .. } => {
                Some(thread_id)
            }
            _ => None,
        }
    }
}

// ─── Row stream construction ─────────────────────────────────────────────────

/// Build the full detail-screen row stream for one review.
///
/// `expanded` names the threads whose comment blocks are open. The
/// drift function translates selections recorded at older commits into
/// the current commit's coordinates.
pub fn build_review_rows(
    store: &dyn ReviewStore,
    detail: &ReviewDetail,
    threads: &[ThreadRecord],
    expanded: &HashSet<String>,
    drift: impl Fn(&str, i64, &str, &str) -> DriftResult + Copy,
) -> Vec<Row> {
    let mut rows = Vec::new();

    let files = match store.list_files(&detail.review_id) {
        Ok(files) => files,
        Err(err) => {
            rows.push(Row::Unavailable {
                path: detail.review_id.clone(),
                reason: err.to_string(),
            });
            return rows;
        }
    };

    for (i, file) in files.iter().enumerate() {
        if i > 0 {
            rows.push(Row::Blank);
        }
        let file_threads: Vec<ThreadRecord> = threads
            .iter()
            .filter(|t| t.file_path == *file)
            .cloned()
            .collect();
        build_file_rows(&mut rows, store, detail, file, &file_threads, expanded, drift);
    }

    rows
}

/// Append the rows for one file: banner, hunk stream with anchored
/// threads, then orphaned-context sections.
fn build_file_rows(
    rows: &mut Vec<Row>,
    store: &dyn ReviewStore,
    detail: &ReviewDetail,
    file: &str,
    threads: &[ThreadRecord],
    expanded: &HashSet<String>,
    drift: impl Fn(&str, i64, &str, &str) -> DriftResult,
) {
    let diff_text = match store.get_diff(&detail.review_id, file) {
        Ok(text) => text,
        Err(err) => {
            rows.push(Row::Unavailable {
                path: file.to_string(),
                reason: err.to_string(),
            });
            return;
        }
    };

    let diff = match parse::parse(&diff_text) {
        Ok(diff) => diff,
        Err(err) => {
            rows.push(Row::Unavailable {
                path: file.to_string(),
                reason: err.to_string(),
            });
            return;
        }
    };

    let (added, removed) = diff.change_counts();
    rows.push(Row::FileHeader {
        path: file.to_string(),
        added,
        removed,
    });

    let outcome = anchor_threads(&diff, threads, &detail.current_commit, &drift);

    // Walk the display stream (header row + line rows per hunk),
    // mirroring the index space the anchoring engine resolved into.
    let mut display_idx = 0usize;
    for hunk in &diff.hunks {
        rows.push(Row::HunkHeader {
            text: hunk.header.clone(),
        });
        push_comment_blocks(rows, store, &outcome.anchored, display_idx, expanded);
        display_idx += 1;

        for line in &hunk.lines {
            let marker = outcome
                .anchored
                .iter()
                .find(|a| a.display_line <= display_idx && display_idx < a.display_line + a.line_count)
                .map(|a| a.status);
            rows.push(Row::DiffLine {
                kind: line.kind,
                old_line: line.old_line,
                new_line: line.new_line,
                content: line.content.clone(),
                marker,
            });
            push_comment_blocks(rows, store, &outcome.anchored, display_idx, expanded);
            display_idx += 1;
        }
    }

    if outcome.orphaned.is_empty() {
        return;
    }

    let file_lines = store
        .get_file_lines(&detail.review_id, file)
        .unwrap_or_default();
    let exclude = parse::exclusion_ranges(&diff.hunks);

    for orphan in &outcome.orphaned {
        rows.push(Row::Blank);
        build_orphan_section(rows, store, orphan, &file_lines, &exclude, expanded);
    }
}

/// Append the expanded/collapsed comment blocks of every anchored
/// thread attached after display index `idx`.
fn push_comment_blocks(
    rows: &mut Vec<Row>,
    store: &dyn ReviewStore,
    anchored: &[rv_review::anchor::AnchoredThread],
    idx: usize,
    expanded: &HashSet<String>,
) {
    for thread in anchored.iter().filter(|a| a.comment_after_line == idx) {
        let is_expanded = expanded.contains(&thread.thread_id);
        rows.push(Row::ThreadHeader {
            thread_id: thread.thread_id.clone(),
            status: thread.status,
            comment_count: thread.comment_count,
            expanded: is_expanded,
        });
        if is_expanded {
            push_comments(rows, store, &thread.thread_id);
        }
    }
}

/// Append author/body rows for every comment in a thread.
fn push_comments(rows: &mut Vec<Row>, store: &dyn ReviewStore, thread_id: &str) {
    match store.list_comments(thread_id) {
        Ok(comments) => {
            for comment in comments {
                rows.push(Row::CommentAuthor {
                    author: comment.author,
                    created_at: comment.created_at,
                });
                for line in comment.body.lines() {
                    rows.push(Row::CommentBody {
                        text: line.to_string(),
                    });
                }
            }
        }
        Err(err) => rows.push(Row::CommentBody {
            text: err.to_string(),
        }),
    }
}

/// Append an orphaned thread's context section: banner, raw file lines
/// around the selection (clipped against hunk territory, with gap
/// separators where the clipping split the range), then the comments.
fn build_orphan_section(
    rows: &mut Vec<Row>,
    store: &dyn ReviewStore,
    orphan: &ThreadRecord,
    file_lines: &[String],
    exclude: &[(i64, i64)],
    expanded: &HashSet<String>,
) {
    rows.push(Row::OrphanHeader {
        thread_id: orphan.thread_id.clone(),
        status: orphan.status,
    });

    let ranges = context_ranges(std::slice::from_ref(orphan), file_lines.len(), exclude);
    let mut prev_end: Option<i64> = None;

    for range in &ranges {
        if let Some(end) = prev_end {
            rows.push(Row::Gap {
                skipped: range.start - end - 1,
            });
        }
        for line_no in range.start..=range.end {
            #[allow(clippy::cast_sign_loss)] // range.start >= 1 by construction.
            let content = file_lines
                .get(line_no as usize - 1)
                .cloned()
                .unwrap_or_default();
            let marker = (orphan.selection_start <= line_no
                && line_no <= orphan.selection_last())
            .then_some(orphan.status);
            rows.push(Row::ContextLine {
                line_no,
                content,
                marker,
            });
        }
        prev_end = Some(range.end);
    }

    let is_expanded = expanded.contains(&orphan.thread_id);
    rows.push(Row::ThreadHeader {
        thread_id: orphan.thread_id.clone(),
        status: orphan.status,
        comment_count: orphan.comment_count,
        expanded: is_expanded,
    });
    if is_expanded {
        push_comments(rows, store, &orphan.thread_id);
    }
}

// ─── Painting ────────────────────────────────────────────────────────────────

/// Paint the top header bar.
pub fn render_header(frame: &mut CellGrid, theme: &Theme, text: &str) {
    let w = frame.width();
    frame.fill_row(0, theme.header);
    frame.put_str(1, 0, text, theme.header, w.saturating_sub(2));
}

/// Paint the bottom status line.
pub fn render_status(frame: &mut CellGrid, theme: &Theme, text: &str, is_error: bool) {
    let h = frame.height();
    if h == 0 {
        return;
    }
    let y = h - 1;
    let w = frame.width();
    let style = if is_error { theme.error } else { theme.status };
    frame.fill_row(y, theme.status);
    frame.put_str(1, y, text, style, w.saturating_sub(2));
}

/// Paint the review list between the header and status rows.
pub fn render_list(
    frame: &mut CellGrid,
    theme: &Theme,
    reviews: &[ReviewSummary],
    vp: &Viewport,
) {
    let w = frame.width();
    for (screen_row, idx) in vp.visible_range().enumerate() {
        #[allow(clippy::cast_possible_truncation)] // Bounded by the frame height.
        let y = 1 + screen_row as u16;
        let review = &reviews[idx];
        let selected = idx == vp.selected();

        let style = if selected {
            theme.list_selected
        } else if review.status == rv_review::store::ReviewStatus::Closed {
            theme.list_closed
        } else {
            theme.list_row
        };

        frame.fill_row(y, style);
        let line = format!(
            "{:<6} {:<7} {:>2} threads ({} open)  {} — {}",
            review.review_id,
            review.status.label(),
            review.thread_count,
            review.open_thread_count,
            review.title,
            review.author,
        );
        frame.put_str(1, y, &line, style, w.saturating_sub(2));
    }
}

/// Paint the visible window of the detail row stream.
pub fn render_rows(frame: &mut CellGrid, theme: &Theme, rows: &[Row], vp: &Viewport) {
    let w = frame.width();
    for (screen_row, idx) in vp.visible_range().enumerate() {
        #[allow(clippy::cast_possible_truncation)] // Bounded by the frame height.
        let y = 1 + screen_row as u16;
        render_row(frame, theme, &rows[idx], y, w, idx == vp.selected());
    }
}

#[allow(clippy::too_many_lines)]
fn render_row(frame: &mut CellGrid, theme: &Theme, row: &Row, y: u16, w: u16, selected: bool) {
    match row {
        Row::FileHeader {
            path,
            added,
            removed,
        } => {
            frame.fill_row(y, theme.file_header);
            let text = format!("{path}  +{added} -{removed}");
            frame.put_str(1, y, &text, theme.file_header, w.saturating_sub(2));
        }
        Row::Unavailable { path, reason } => {
            frame.fill_row(y, theme.base);
            let text = format!("{path}: diff unavailable ({reason})");
            frame.put_str(1, y, &text, theme.error, w.saturating_sub(2));
        }
        Row::HunkHeader { text } => {
            let style = if selected {
                theme.diff_selected
            } else {
                theme.hunk_header
            };
            frame.fill_row(y, style);
            frame.put_str(1, y, text, style, w.saturating_sub(2));
        }
        Row::DiffLine {
            kind,
            old_line,
            new_line,
            content,
            marker,
        } => {
            let line_style = match kind {
                LineKind::Added => theme.added,
                LineKind::Removed => theme.removed,
                LineKind::Context => theme.context,
            };
            let bg = if selected {
                theme.diff_selected
            } else {
                line_style
            };
            frame.fill_row(y, bg);

            let gutter = format!(
                "{:>4} {:>4} ",
                old_line.map_or(String::new(), |n| n.to_string()),
                new_line.map_or(String::new(), |n| n.to_string()),
            );
            let gutter_style = if selected { theme.diff_selected } else { theme.gutter };
            let mut x = frame.put_str(0, y, &gutter, gutter_style, w);

            x += put_marker(frame, theme, *marker, x, y, selected);

            let sigil = match kind {
                LineKind::Added => '+',
                LineKind::Removed => '-',
                LineKind::Context => ' ',
            };
            if frame.put_char(x, y, sigil, bg) {
                x += 1;
            }
            frame.put_str(x, y, content, bg, w.saturating_sub(x));
        }
        Row::ThreadHeader {
            thread_id,
            status,
            comment_count,
            expanded,
        } => {
            let style = if selected {
                theme.diff_selected
            } else {
                theme.comment_header
            };
            frame.fill_row(y, style);
            let arrow = if *expanded { '▾' } else { '▸' };
            let noun = if *comment_count == 1 { "comment" } else { "comments" };
            let text = format!(
                "  {arrow} {thread_id} [{}] {comment_count} {noun}",
                status.label()
            );
            frame.put_str(0, y, &text, style, w);
        }
        Row::CommentAuthor { author, created_at } => {
            frame.fill_row(y, theme.comment_body);
            let text = format!("    {author} · {created_at}");
            frame.put_str(
                0,
                y,
                &text,
                theme.comment_header.with_attrs(rv_term::cell::Attr::empty()),
                w,
            );
        }
        Row::CommentBody { text } => {
            frame.fill_row(y, theme.comment_body);
            frame.put_str(6, y, text, theme.comment_body, w.saturating_sub(6));
        }
        Row::OrphanHeader { thread_id, status } => {
            frame.fill_row(y, theme.base);
            let text = format!("~ {thread_id} [{}] no longer matches the diff", status.label());
            frame.put_str(1, y, &text, theme.orphan_header, w.saturating_sub(2));
        }
        Row::ContextLine {
            line_no,
            content,
            marker,
        } => {
            let bg = if selected { theme.diff_selected } else { theme.context };
            frame.fill_row(y, bg);
            let gutter = format!("     {line_no:>4} ");
            let gutter_style = if selected { theme.diff_selected } else { theme.gutter };
            let mut x = frame.put_str(0, y, &gutter, gutter_style, w);
            x += put_marker(frame, theme, *marker, x, y, selected);
            x += 1; // no sigil column for raw file lines
            frame.put_str(x, y, content, bg, w.saturating_sub(x));
        }
        Row::Gap { skipped } => {
            frame.fill_row(y, theme.base);
            let text = format!("··· {skipped} lines ···");
            frame.put_str(11, y, &text, theme.orphan_gap, w.saturating_sub(11));
        }
        Row::Blank => {
            frame.fill_row(y, theme.base);
        }
    }
}

/// Paint the one-column thread marker. Returns the columns consumed.
fn put_marker(
    frame: &mut CellGrid,
    theme: &Theme,
    marker: Option<ThreadStatus>,
    x: u16,
    y: u16,
    selected: bool,
) -> u16 {
    let (ch, style) = match marker {
        Some(ThreadStatus::Open) => (MARKER_OPEN, theme.thread_open),
        Some(ThreadStatus::Resolved) => (MARKER_RESOLVED, theme.thread_resolved),
        None => {
            return 1;
        }
    };
    let style = if selected {
        rv_term::cell::Style::new(style.fg, theme.diff_selected.bg).with_attrs(style.attrs)
    } else {
        style
    };
    frame.put_char(x, y, ch, style);
    1
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{demo_drift, DemoStore};
    use pretty_assertions::assert_eq;
    use rv_review::store::StoreError;

    fn rows_for(review_id: &str, expanded: &HashSet<String>) -> Vec<Row> {
        let store = DemoStore::new();
        let detail = store.get_review(review_id).unwrap();
        let threads = store.list_threads(review_id).unwrap();
        build_review_rows(&store, &detail, &threads, expanded, demo_drift)
    }

    fn grid_text(frame: &CellGrid, y: u16) -> String {
        frame
            .row(y)
            .unwrap()
            .iter()
            .filter_map(|c| c.character())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    // ── Row stream construction ─────────────────────────────────────────

    #[test]
    fn stream_has_file_and_hunk_headers() {
        let rows = rows_for("r-1", &HashSet::new());
        let files: Vec<&str> = rows
            .iter()
            .filter_map(|r| match r {
                Row::FileHeader { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(files, vec!["src/parser.rs", "src/render.rs"]);
        assert!(rows.iter().any(|r| matches!(r, Row::HunkHeader { .. })));
    }

    #[test]
    fn anchored_thread_marks_its_selection_rows() {
        // t-101 selects new lines 40-41 — the two added lines.
        let rows = rows_for("r-1", &HashSet::new());
        let marked: Vec<&Row> = rows
            .iter()
            .filter(|r| matches!(r, Row::DiffLine { marker: Some(_), .. }))
            .collect();
        assert!(marked.len() >= 2);
        for row in &marked[..2] {
            let Row::DiffLine { kind, new_line, .. } = row else {
                unreachable!()
            };
            assert_eq!(*kind, LineKind::Added);
            assert!(matches!(new_line, Some(40 | 41)));
        }
    }

    #[test]
    fn thread_header_follows_selection_end() {
        let rows = rows_for("r-1", &HashSet::new());
        // The t-101 header comes right after the new_line=41 row.
        let pos_41 = rows
            .iter()
            .position(|r| matches!(r, Row::DiffLine { new_line: Some(41), .. }))
            .unwrap();
        assert!(matches!(
            &rows[pos_41 + 1],
            Row::ThreadHeader { thread_id, expanded: false, .. } if thread_id == "t-101"
        ));
    }

    #[test]
    fn collapsed_threads_show_no_comments() {
        let rows = rows_for("r-1", &HashSet::new());
        assert!(!rows.iter().any(|r| matches!(r, Row::CommentAuthor { .. })));
    }

    #[test]
    fn expanding_a_thread_inlines_its_comments() {
        let expanded = HashSet::from(["t-101".to_string()]);
        let rows = rows_for("r-1", &expanded);
        let authors: Vec<&str> = rows
            .iter()
            .filter_map(|r| match r {
                Row::CommentAuthor { author, .. } => Some(author.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(authors, vec!["jonas", "mira"]);
        assert!(rows.iter().any(|r| matches!(r, Row::CommentBody { .. })));
    }

    #[test]
    fn orphaned_thread_gets_a_context_section() {
        // t-102 selects line 15 of src/parser.rs, untouched by the diff.
        let rows = rows_for("r-1", &HashSet::new());
        assert!(rows.iter().any(
            |r| matches!(r, Row::OrphanHeader { thread_id, .. } if thread_id == "t-102")
        ));

        let context: Vec<i64> = rows
            .iter()
            .filter_map(|r| match r {
                Row::ContextLine { line_no, .. } => Some(*line_no),
                _ => None,
            })
            .collect();
        // Selection 15 ± 5 context lines.
        assert_eq!(context, (10..=20).collect::<Vec<i64>>());
    }

    #[test]
    fn orphan_selection_line_is_marked() {
        let rows = rows_for("r-1", &HashSet::new());
        let marked: Vec<i64> = rows
            .iter()
            .filter_map(|r| match r {
                Row::ContextLine {
                    line_no,
                    marker: Some(_),
                    ..
                } => Some(*line_no),
                _ => None,
            })
            .collect();
        assert_eq!(marked, vec![15]);
    }

    #[test]
    fn drifted_thread_marks_the_adjusted_line() {
        // t-103 anchored at old line 72 drifts to new line 74.
        let rows = rows_for("r-1", &HashSet::new());
        assert!(rows.iter().any(|r| matches!(
            r,
            Row::DiffLine {
                new_line: Some(74),
                marker: Some(ThreadStatus::Resolved),
                ..
            }
        )));
    }

    #[test]
    fn store_failure_degrades_to_an_unavailable_row() {
        struct FailingStore(DemoStore);
        impl ReviewStore for FailingStore {
            fn list_reviews(&self) -> Result<Vec<ReviewSummary>, StoreError> {
                self.0.list_reviews()
            }
            fn get_review(&self, id: &str) -> Result<ReviewDetail, StoreError> {
                self.0.get_review(id)
            }
            fn list_threads(&self, id: &str) -> Result<Vec<ThreadRecord>, StoreError> {
                self.0.list_threads(id)
            }
            fn get_thread(&self, id: &str) -> Result<ThreadRecord, StoreError> {
                self.0.get_thread(id)
            }
            fn list_comments(
                &self,
                id: &str,
            ) -> Result<Vec<rv_review::store::Comment>, StoreError> {
                self.0.list_comments(id)
            }
            fn list_files(&self, id: &str) -> Result<Vec<String>, StoreError> {
                self.0.list_files(id)
            }
            fn get_diff(&self, _: &str, file: &str) -> Result<String, StoreError> {
                if file == "src/parser.rs" {
                    Err(StoreError::Backend("disk on fire".into()))
                } else {
                    self.0.get_diff("r-1", file)
                }
            }
            fn get_file_lines(&self, id: &str, file: &str) -> Result<Vec<String>, StoreError> {
                self.0.get_file_lines(id, file)
            }
        }

        let store = FailingStore(DemoStore::new());
        let detail = store.get_review("r-1").unwrap();
        let threads = store.list_threads("r-1").unwrap();
        let rows = build_review_rows(&store, &detail, &threads, &HashSet::new(), demo_drift);

        // The failing file degrades; the other file still renders.
        assert!(rows.iter().any(|r| matches!(
            r,
            Row::Unavailable { path, reason }
                if path == "src/parser.rs" && reason.contains("disk on fire")
        )));
        assert!(rows
            .iter()
            .any(|r| matches!(r, Row::FileHeader { path, .. } if path == "src/render.rs")));
    }

    // ── Painting ────────────────────────────────────────────────────────

    #[test]
    fn header_and_status_paint_full_rows() {
        let theme = Theme::dark();
        let mut frame = CellGrid::new(40, 6);
        render_header(&mut frame, &theme, "revu");
        render_status(&mut frame, &theme, "q quit", false);

        assert!(grid_text(&frame, 0).contains("revu"));
        assert!(grid_text(&frame, 5).contains("q quit"));
        // The whole header row carries the panel background.
        assert!(frame
            .row(0)
            .unwrap()
            .iter()
            .all(|c| c.bg == theme.header.bg));
    }

    #[test]
    fn list_renders_selection_bar() {
        let store = DemoStore::new();
        let theme = Theme::dark();
        let reviews = store.list_reviews().unwrap();
        let vp = Viewport::new(4, reviews.len());

        let mut frame = CellGrid::new(70, 6);
        render_list(&mut frame, &theme, &reviews, &vp);

        assert!(grid_text(&frame, 1).contains("r-1"));
        assert!(grid_text(&frame, 2).contains("r-2"));
        assert_eq!(frame.get(0, 1).unwrap().bg, theme.list_selected.bg);
        assert_ne!(frame.get(0, 2).unwrap().bg, theme.list_selected.bg);
    }

    #[test]
    fn diff_rows_paint_gutter_and_sigil() {
        let theme = Theme::dark();
        let rows = vec![Row::DiffLine {
            kind: LineKind::Added,
            old_line: None,
            new_line: Some(40),
            content: "let x = 1;".into(),
            marker: None,
        }];
        let vp = Viewport::new(3, rows.len());

        let mut frame = CellGrid::new(40, 5);
        render_rows(&mut frame, &theme, &rows, &vp);

        let text = grid_text(&frame, 1);
        assert!(text.contains("40"));
        assert!(text.contains("+let x = 1;"));
    }

    #[test]
    fn gap_row_names_the_skipped_count() {
        let theme = Theme::dark();
        let rows = vec![Row::Gap { skipped: 7 }];
        let vp = Viewport::new(2, 1);

        let mut frame = CellGrid::new(40, 4);
        render_rows(&mut frame, &theme, &rows, &vp);
        assert!(grid_text(&frame, 1).contains("··· 7 lines ···"));
    }

    #[test]
    fn long_content_truncates_at_frame_edge() {
        let theme = Theme::dark();
        let rows = vec![Row::DiffLine {
            kind: LineKind::Context,
            old_line: Some(1),
            new_line: Some(1),
            content: "x".repeat(200),
            marker: None,
        }];
        let vp = Viewport::new(2, 1);

        let mut frame = CellGrid::new(20, 4);
        render_rows(&mut frame, &theme, &rows, &vp);
        // Last column is painted, nothing wrapped to the next row.
        assert_eq!(frame.get(19, 1).unwrap().character(), Some('x'));
        assert_eq!(grid_text(&frame, 2), "");
    }
}
