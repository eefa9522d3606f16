// SPDX-License-Identifier: MIT
//
// Drift / thread-anchoring engine.
//
// Maps comment threads, anchored to line numbers in a historical commit,
// onto display positions in the current commit's diff — or declares them
// orphaned.
//
// The one rule everything here obeys: matching consults new_line ONLY.
// A thread's selection lives in its own commit's coordinate space; once
// translated to the current commit (identity when the commits match,
// the external drift function otherwise), it can only mean a position
// in the NEW side of the diff. old_line values from unrelated removals
// can numerically collide with that position, and matching against them
// attaches comments to the wrong code. Hunks are ordered and
// non-overlapping, so at most one new_line match exists — first match
// wins, and there is no ambiguity case to handle.
//
// Threads that match nothing are orphaned. They render in separate
// context sections showing raw file lines around the selection; the
// exclusion ranges that keep those sections from duplicating hunk
// content must cover BOTH old- and new-side numbering, because raw
// file content can coincide with either.

use std::collections::HashMap;

use crate::parse::FileDiff;
use crate::store::{ThreadRecord, ThreadStatus};

/// Raw file lines shown above and below an orphaned selection.
pub const CONTEXT_LINES: i64 = 5;

// ─── Drift ───────────────────────────────────────────────────────────────────

/// Answer from the external drift function.
///
/// Produced outside this crate (the drift computation needs VCS access),
/// consumed here, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftResult {
    /// The line in the target commit corresponding to the input line,
    /// or `None` if the line no longer exists.
    pub current_line: Option<i64>,
    /// Whether the line moved between the two commits.
    pub drifted: bool,
}

impl DriftResult {
    /// A line that exists unchanged at the same number.
    #[must_use]
    pub const fn same(line: i64) -> Self {
        Self {
            current_line: Some(line),
            drifted: false,
        }
    }

    /// A line that no longer exists in the target commit.
    #[must_use]
    pub const fn gone() -> Self {
        Self {
            current_line: None,
            drifted: false,
        }
    }
}

/// Signature of the external drift function:
/// `drift(file, line, from_commit, to_commit)`.
pub trait DriftFn: Fn(&str, i64, &str, &str) -> DriftResult {}
impl<F: Fn(&str, i64, &str, &str) -> DriftResult> DriftFn for F {}

// ─── Anchoring ───────────────────────────────────────────────────────────────

/// A thread successfully mapped onto the diff's display stream.
///
/// Display indices count one row per hunk header plus one row per hunk
/// line, across all hunks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredThread {
    pub thread_id: String,
    /// Display index of the first selected line.
    pub display_line: usize,
    /// Display index of the line the comment block renders after.
    pub comment_after_line: usize,
    /// Number of selected lines.
    pub line_count: usize,
    pub status: ThreadStatus,
    pub comment_count: usize,
}

/// Result of anchoring a batch of threads against one file's diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorOutcome {
    /// Threads attached to a diff line, sorted by display position.
    pub anchored: Vec<AnchoredThread>,
    /// Threads whose selection maps to no visible new-side line.
    pub orphaned: Vec<ThreadRecord>,
}

/// Map threads onto display positions in `diff`, or orphan them.
///
/// For each thread: if its `commit_hash` equals `current_commit`, its
/// selection is already in the right coordinate space; otherwise the
/// external `drift` function translates it. The (possibly adjusted)
/// start line is then matched against new-side line numbers only.
///
/// # Example
///
/// ```
/// use rv_review::anchor::{anchor_threads, DriftResult};
/// use rv_review::parse::parse;
/// use rv_review::store::{ThreadRecord, ThreadStatus};
///
/// let diff = parse("@@ -1,2 +1,2 @@\n ctx\n-old\n+new\n")?;
/// let thread = ThreadRecord {
///     thread_id: "t-1".into(),
///     file_path: "f.rs".into(),
///     selection_start: 2,
///     selection_end: None,
///     commit_hash: "head".into(),
///     status: ThreadStatus::Open,
///     comment_count: 1,
/// };
/// let no_drift = |_: &str, line: i64, _: &str, _: &str| DriftResult::same(line);
/// let outcome = anchor_threads(&diff, &[thread], "head", no_drift);
/// assert_eq!(outcome.anchored.len(), 1);
/// # Ok::<(), rv_review::parse::ParseError>(())
/// ```
pub fn anchor_threads(
    diff: &FileDiff,
    threads: &[ThreadRecord],
    current_commit: &str,
    drift: impl Fn(&str, i64, &str, &str) -> DriftResult,
) -> AnchorOutcome {
    // New-side line number → display index. old_line never enters this
    // map; that is the invariant, not an optimization.
    let mut new_line_to_display: HashMap<u32, usize> = HashMap::new();
    let mut display_idx = 0usize;

    for hunk in &diff.hunks {
        display_idx += 1; // hunk header row
        for line in &hunk.lines {
            if let Some(new_ln) = line.new_line {
                // First match wins: hunks are ordered and non-overlapping,
                // so an occupied slot is never overwritten.
                new_line_to_display.entry(new_ln).or_insert(display_idx);
            }
            display_idx += 1;
        }
    }

    let mut outcome = AnchorOutcome::default();

    for thread in threads {
        let start = adjusted_line(thread, thread.selection_start, current_commit, &drift);

        let Some(display_line) = start.and_then(|line| lookup(&new_line_to_display, line)) else {
            outcome.orphaned.push(thread.clone());
            continue;
        };

        // The comment block renders after the last selected line. The
        // selection span keeps its length through drift — the end is the
        // adjusted start plus the original span.
        let span = thread.selection_last() - thread.selection_start;
        let comment_after_line = start
            .and_then(|line| lookup(&new_line_to_display, line + span))
            .unwrap_or(display_line);

        #[allow(clippy::cast_sign_loss)] // selection_last >= selection_start by construction.
        let line_count = (span + 1).max(1) as usize;

        outcome.anchored.push(AnchoredThread {
            thread_id: thread.thread_id.clone(),
            display_line,
            comment_after_line,
            line_count,
            status: thread.status,
            comment_count: thread.comment_count,
        });
    }

    outcome.anchored.sort_by_key(|a| a.display_line);
    outcome
}

/// Translate a line from the thread's commit into the current commit.
fn adjusted_line(
    thread: &ThreadRecord,
    line: i64,
    current_commit: &str,
    drift: &impl Fn(&str, i64, &str, &str) -> DriftResult,
) -> Option<i64> {
    if thread.commit_hash == current_commit {
        Some(line)
    } else {
        drift(&thread.file_path, line, &thread.commit_hash, current_commit).current_line
    }
}

fn lookup(map: &HashMap<u32, usize>, line: i64) -> Option<usize> {
    u32::try_from(line).ok().and_then(|ln| map.get(&ln).copied())
}

// ─── Orphaned Context Ranges ─────────────────────────────────────────────────

/// An inclusive range of 1-based raw file line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: i64,
    pub end: i64,
}

/// Raw-file line ranges to show for orphaned threads.
///
/// Each orphan contributes `selection ± CONTEXT_LINES`, clamped to the
/// file. Overlapping or adjacent ranges merge. Finally every range is
/// clipped against `exclude_ranges` — the both-side hunk coverage from
/// [`crate::parse::exclusion_ranges`] — so the same code never appears
/// both inside a hunk and in an orphaned section.
#[must_use]
pub fn context_ranges(
    threads: &[ThreadRecord],
    total_lines: usize,
    exclude_ranges: &[(i64, i64)],
) -> Vec<LineRange> {
    if threads.is_empty() {
        return Vec::new();
    }

    #[allow(clippy::cast_possible_wrap)] // File line counts are nowhere near i64::MAX.
    let total = total_lines as i64;

    let mut ranges: Vec<LineRange> = threads
        .iter()
        .map(|t| LineRange {
            start: (t.selection_start - CONTEXT_LINES).max(1),
            end: (t.selection_last() + CONTEXT_LINES).min(total),
        })
        .filter(|r| r.start <= r.end)
        .collect();

    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<LineRange> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end + 1 => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }

    if exclude_ranges.is_empty() {
        return merged;
    }

    // Subtract every exclusion from every range; a range can split in two.
    let mut clipped: Vec<LineRange> = Vec::new();
    for range in merged {
        let mut remaining = vec![range];
        for &(ex_start, ex_end) in exclude_ranges {
            let mut next = Vec::new();
            for r in remaining {
                if r.end < ex_start || r.start > ex_end {
                    next.push(r);
                } else {
                    if r.start < ex_start {
                        next.push(LineRange {
                            start: r.start,
                            end: ex_start - 1,
                        });
                    }
                    if r.end > ex_end {
                        next.push(LineRange {
                            start: ex_end + 1,
                            end: r.end,
                        });
                    }
                }
            }
            remaining = next;
        }
        clipped.extend(remaining);
    }
    clipped.sort_by_key(|r| r.start);
    clipped
}

// ─── Tests ───────────────────────────────────────────────────────────────────
