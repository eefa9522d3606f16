// SPDX-License-Identifier: MIT
//
// Unified diff parser.
//
// Parses standard unified diff text into structured hunks with running
// old/new line counters. The counter rules are the contract the whole
// anchoring engine rests on:
//
//   context lines advance both counters,
//   added lines advance only new_line,
//   removed lines advance only old_line.
//
// Parsing is tolerant everywhere except the hunk header: `diff --git`
// and `index` preamble is skipped, `\ No newline at end of file` markers
// are dropped, empty hunks are fine. A hunk header with non-numeric
// range fields is the one hard failure — it means the counters cannot
// be trusted for anything after it, so the whole file's diff is refused
// with a scoped [`ParseError`] and the caller degrades that single file
// to an "unavailable" notice.

use thiserror::Error;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A malformed hunk header.
///
/// Scoped to one file: the caller keeps rendering every other file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A `@@` line whose range fields could not be parsed.
    #[error("malformed hunk header: {header}")]
    MalformedHunkHeader { header: String },
}

// ─── Data Model ──────────────────────────────────────────────────────────────

/// Classification of one hunk line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

/// One line inside a hunk, with its resolved line numbers.
///
/// At least one of `old_line`/`new_line` is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkLine {
    pub kind: LineKind,
    /// Line number in the old file, if the line exists there.
    pub old_line: Option<u32>,
    /// Line number in the new file, if the line exists there.
    pub new_line: Option<u32>,
    /// Content without the leading marker character.
    pub content: String,
}

/// One `@@` hunk: header ranges plus the ordered lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// The raw `@@` header line (kept for display).
    pub header: String,
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<HunkLine>,
}

/// A parsed unified diff for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Path from the `---` line, `a/` prefix stripped.
    pub old_path: Option<String>,
    /// Path from the `+++` line, `b/` prefix stripped.
    pub new_path: Option<String>,
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// Total number of lines across all hunks.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.hunks.iter().map(|h| h.lines.len()).sum()
    }

    /// Added/removed line counts across all hunks.
    #[must_use]
    pub fn change_counts(&self) -> (usize, usize) {
        let mut added = 0;
        let mut removed = 0;
        for hunk in &self.hunks {
            for line in &hunk.lines {
                match line.kind {
                    LineKind::Added => added += 1,
                    LineKind::Removed => removed += 1,
                    LineKind::Context => {}
                }
            }
        }
        (added, removed)
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse unified diff text for one file.
///
/// # Errors
///
/// Returns [`ParseError::MalformedHunkHeader`] if any `@@` line has
/// non-numeric range fields. Everything else degrades gracefully.
///
/// # Example
///
/// ```
/// use rv_review::parse::{parse, LineKind};
///
/// let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,2 +1,2 @@\n ctx\n-old\n+new\n";
/// let parsed = parse(diff)?;
/// assert_eq!(parsed.hunks.len(), 1);
/// assert_eq!(parsed.hunks[0].lines[1].kind, LineKind::Removed);
/// # Ok::<(), rv_review::parse::ParseError>(())
/// ```
pub fn parse(diff: &str) -> Result<FileDiff, ParseError> {
    let mut result = FileDiff::default();
    let mut lines = diff.lines().peekable();

    // Preamble: `---`/`+++` give paths, everything else before the
    // first `@@` (diff --git, index, mode lines) is skipped.
    while let Some(line) = lines.peek() {
        if let Some(path) = line.strip_prefix("--- ") {
            result.old_path = Some(strip_side_prefix(path, "a/"));
            lines.next();
        } else if let Some(path) = line.strip_prefix("+++ ") {
            result.new_path = Some(strip_side_prefix(path, "b/"));
            lines.next();
        } else if line.starts_with("@@") {
            break;
        } else {
            lines.next();
        }
    }

    while let Some(line) = lines.next() {
        if line.starts_with("@@") {
            result.hunks.push(parse_hunk(line, &mut lines)?);
        }
    }

    Ok(result)
}

fn strip_side_prefix(path: &str, prefix: &str) -> String {
    path.strip_prefix(prefix).unwrap_or(path).to_string()
}

/// Parse one hunk: the `@@ -a,b +c,d @@` header and its body lines.
fn parse_hunk(
    header: &str,
    lines: &mut std::iter::Peekable<std::str::Lines<'_>>,
) -> Result<Hunk, ParseError> {
    let malformed = || ParseError::MalformedHunkHeader {
        header: header.to_string(),
    };

    // Example: @@ -1,5 +1,7 @@ fn main() {
    let mut parts = header.split_whitespace();
    parts.next(); // "@@"
    let old_field = parts.next().ok_or_else(malformed)?;
    let new_field = parts.next().ok_or_else(malformed)?;

    let (old_start, old_count) =
        parse_range(old_field.strip_prefix('-').ok_or_else(malformed)?).ok_or_else(malformed)?;
    let (new_start, new_count) =
        parse_range(new_field.strip_prefix('+').ok_or_else(malformed)?).ok_or_else(malformed)?;

    let mut hunk = Hunk {
        header: header.to_string(),
        old_start,
        old_count,
        new_start,
        new_count,
        lines: Vec::new(),
    };

    let mut old_line = old_start;
    let mut new_line = new_start;

    while let Some(line) = lines.peek() {
        if line.starts_with("@@") || line.starts_with("diff ") {
            break;
        }
        let line = lines.next().unwrap_or_default();

        let (kind, content) = if let Some(content) = line.strip_prefix('+') {
            (LineKind::Added, content)
        } else if let Some(content) = line.strip_prefix('-') {
            (LineKind::Removed, content)
        } else if let Some(content) = line.strip_prefix(' ') {
            (LineKind::Context, content)
        } else if line.is_empty() {
            // Empty context line (some tools drop the leading space).
            (LineKind::Context, "")
        } else if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        } else {
            // Unknown marker — treat as context rather than lose the line.
            (LineKind::Context, line)
        };

        let hunk_line = match kind {
            LineKind::Added => {
                let hl = HunkLine {
                    kind,
                    old_line: None,
                    new_line: Some(new_line),
                    content: content.to_string(),
                };
                new_line += 1;
                hl
            }
            LineKind::Removed => {
                let hl = HunkLine {
                    kind,
                    old_line: Some(old_line),
                    new_line: None,
                    content: content.to_string(),
                };
                old_line += 1;
                hl
            }
            LineKind::Context => {
                let hl = HunkLine {
                    kind,
                    old_line: Some(old_line),
                    new_line: Some(new_line),
                    content: content.to_string(),
                };
                old_line += 1;
                new_line += 1;
                hl
            }
        };

        hunk.lines.push(hunk_line);
    }

    Ok(hunk)
}

/// Parse a `start,count` range field; a bare `start` means count 1.
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

// ─── Exclusion Ranges ────────────────────────────────────────────────────────

/// Line ranges covered by hunks — the union of old-side AND new-side
/// numbering, merged and sorted.
///
/// Orphaned context sections show raw file content, whose line numbers
/// can coincide with either side of a hunk. Excluding only the new side
/// would let context lines duplicate rows already shown as removals, so
/// both sides go into the exclusion set.
#[must_use]
pub fn exclusion_ranges(hunks: &[Hunk]) -> Vec<(i64, i64)> {
    let mut ranges: Vec<(i64, i64)> = Vec::new();
    for h in hunks {
        if h.old_count > 0 {
            ranges.push((
                i64::from(h.old_start),
                i64::from(h.old_start + h.old_count.saturating_sub(1)),
            ));
        }
        if h.new_count > 0 {
            ranges.push((
                i64::from(h.new_start),
                i64::from(h.new_start + h.new_count.saturating_sub(1)),
            ));
        }
    }
    ranges.sort_by_key(|r| r.0);

    let mut merged: Vec<(i64, i64)> = Vec::new();
    for (s, e) in ranges {
        match merged.last_mut() {
            Some(last) if s <= last.1 + 1 => last.1 = last.1.max(e),
            _ => merged.push((s, e)),
        }
    }
    merged
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Basic parsing ───────────────────────────────────────────────────

    #[test]
    fn parses_simple_diff() {
        let diff = "\
diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,5 +1,7 @@
 fn main() {
-    println!(\"Hello\");
+    println!(\"Hello, world!\");
+    println!(\"Goodbye!\");
 }
";
        let parsed = parse(diff).unwrap();

        assert_eq!(parsed.old_path, Some("src/main.rs".to_string()));
        assert_eq!(parsed.new_path, Some("src/main.rs".to_string()));
        assert_eq!(parsed.hunks.len(), 1);

        let hunk = &parsed.hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert_eq!(hunk.old_count, 5);
        assert_eq!(hunk.new_start, 1);
        assert_eq!(hunk.new_count, 7);

        let kinds: Vec<LineKind> = hunk.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Context,
                LineKind::Removed,
                LineKind::Added,
                LineKind::Added,
                LineKind::Context,
            ]
        );
    }

    #[test]
    fn counter_rules_end_to_end() {
        // Context advances both, removed only old, added only new.
        let diff = "@@ -1,3 +1,4 @@\n ctx\n-old\n+new1\n+new2\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(parsed.hunks.len(), 1);

        let hunk = &parsed.hunks[0];
        assert_eq!(
            (hunk.old_start, hunk.old_count, hunk.new_start, hunk.new_count),
            (1, 3, 1, 4)
        );

        let new_lines: Vec<Option<u32>> = hunk.lines.iter().map(|l| l.new_line).collect();
        assert_eq!(new_lines, vec![Some(1), None, Some(2), Some(3)]);

        let old_lines: Vec<Option<u32>> = hunk.lines.iter().map(|l| l.old_line).collect();
        assert_eq!(old_lines, vec![Some(1), Some(2), None, None]);
    }

    #[test]
    fn every_line_has_at_least_one_number() {
        let diff = "@@ -10,3 +20,3 @@\n a\n-b\n+c\n d\n";
        let parsed = parse(diff).unwrap();
        for line in &parsed.hunks[0].lines {
            assert!(line.old_line.is_some() || line.new_line.is_some());
        }
    }

    #[test]
    fn counters_start_at_header_values() {
        let diff = "@@ -10,3 +20,4 @@\n ctx\n-r\n+a1\n+a2\n";
        let lines = &parse(diff).unwrap().hunks[0].lines;

        assert_eq!(lines[0].old_line, Some(10));
        assert_eq!(lines[0].new_line, Some(20));
        assert_eq!(lines[1].old_line, Some(11));
        assert_eq!(lines[1].new_line, None);
        assert_eq!(lines[2].new_line, Some(21));
        assert_eq!(lines[3].new_line, Some(22));
    }

    // ── Header variants ─────────────────────────────────────────────────

    #[test]
    fn missing_count_defaults_to_one() {
        let diff = "@@ -5 +7 @@\n-x\n+y\n";
        let hunk = &parse(diff).unwrap().hunks[0];
        assert_eq!((hunk.old_start, hunk.old_count), (5, 1));
        assert_eq!((hunk.new_start, hunk.new_count), (7, 1));
    }

    #[test]
    fn header_with_trailing_context_text() {
        let diff = "@@ -1,2 +1,2 @@ fn main() {\n ctx\n ctx2\n";
        let hunk = &parse(diff).unwrap().hunks[0];
        assert_eq!(hunk.old_start, 1);
        assert!(hunk.header.ends_with("fn main() {"));
    }

    #[test]
    fn multiple_hunks() {
        let diff = "@@ -1,1 +1,1 @@\n-a\n+b\n@@ -10,1 +10,2 @@\n c\n+d\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(parsed.hunks.len(), 2);
        assert_eq!(parsed.hunks[1].old_start, 10);
    }

    // ── Malformed headers ───────────────────────────────────────────────

    #[test]
    fn malformed_header_is_an_error() {
        let diff = "@@ -x,3 +1,4 @@\n ctx\n";
        let err = parse(diff).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedHunkHeader {
                header: "@@ -x,3 +1,4 @@".to_string()
            }
        );
    }

    #[test]
    fn header_missing_new_range_is_an_error() {
        assert!(parse("@@ -1,3 @@\n ctx\n").is_err());
    }

    #[test]
    fn header_with_wrong_sign_is_an_error() {
        assert!(parse("@@ +1,3 -1,4 @@\n ctx\n").is_err());
    }

    #[test]
    fn error_message_names_the_header() {
        let err = parse("@@ -a +b @@\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed hunk header: @@ -a +b @@");
    }

    // ── Tolerated input ─────────────────────────────────────────────────

    #[test]
    fn empty_input_parses_to_empty_diff() {
        let parsed = parse("").unwrap();
        assert!(parsed.hunks.is_empty());
        assert_eq!(parsed.total_lines(), 0);
    }

    #[test]
    fn empty_hunk_is_tolerated() {
        let diff = "@@ -1,0 +1,0 @@\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(parsed.hunks.len(), 1);
        assert!(parsed.hunks[0].lines.is_empty());
    }

    #[test]
    fn no_newline_marker_is_skipped() {
        let diff = "@@ -1,1 +1,1 @@\n-old\n\\ No newline at end of file\n+new\n";
        let hunk = &parse(diff).unwrap().hunks[0];
        assert_eq!(hunk.lines.len(), 2);
        assert_eq!(hunk.lines[0].kind, LineKind::Removed);
        assert_eq!(hunk.lines[1].kind, LineKind::Added);
    }

    #[test]
    fn empty_context_line_without_space() {
        let diff = "@@ -1,3 +1,3 @@\n a\n\n c\n";
        let hunk = &parse(diff).unwrap().hunks[0];
        assert_eq!(hunk.lines.len(), 3);
        assert_eq!(hunk.lines[1].kind, LineKind::Context);
        assert_eq!(hunk.lines[1].content, "");
    }

    #[test]
    fn preamble_without_path_prefixes() {
        let diff = "--- old.txt\n+++ new.txt\n@@ -1,1 +1,1 @@\n-a\n+b\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(parsed.old_path, Some("old.txt".to_string()));
        assert_eq!(parsed.new_path, Some("new.txt".to_string()));
    }

    // ── Derived data ────────────────────────────────────────────────────

    #[test]
    fn change_counts() {
        let diff = "@@ -1,3 +1,4 @@\n ctx\n-old\n+new1\n+new2\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(parsed.change_counts(), (2, 1));
    }

    // ── Exclusion ranges ────────────────────────────────────────────────

    #[test]
    fn exclusion_covers_both_sides() {
        // Old side 100..102, new side 1..4: both ranges must appear.
        let diff = "@@ -100,3 +1,4 @@\n ctx\n-old\n+new1\n+new2\n ctx2\n";
        let parsed = parse(diff).unwrap();
        let ranges = exclusion_ranges(&parsed.hunks);
        assert_eq!(ranges, vec![(1, 4), (100, 102)]);
    }

    #[test]
    fn exclusion_merges_overlapping() {
        let diff = "@@ -1,5 +1,5 @@\n ctx\n@@ -4,5 +4,5 @@\n ctx\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(exclusion_ranges(&parsed.hunks), vec![(1, 8)]);
    }

    #[test]
    fn exclusion_merges_adjacent() {
        let diff = "@@ -1,3 +1,3 @@\n ctx\n@@ -4,3 +4,3 @@\n ctx\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(exclusion_ranges(&parsed.hunks), vec![(1, 6)]);
    }

    #[test]
    fn exclusion_skips_zero_count_sides() {
        // Pure addition: old_count 0 contributes no old-side range.
        let diff = "@@ -5,0 +6,2 @@\n+a\n+b\n";
        let parsed = parse(diff).unwrap();
        assert_eq!(exclusion_ranges(&parsed.hunks), vec![(6, 7)]);
    }

    #[test]
    fn exclusion_empty_for_no_hunks() {
        assert!(exclusion_ranges(&[]).is_empty());
    }
}
