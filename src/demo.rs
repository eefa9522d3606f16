// SPDX-License-Identifier: MIT
//
// In-memory demo store.
//
// A small canned backend so the viewer runs without a database: a
// couple of reviews with diffs, threads, and comments. The data is
// arranged to exercise every anchoring path — a thread at the current
// commit, a thread at an older commit that drifts onto the live diff,
// and a thread whose selection maps to nothing and orphans.

use std::collections::HashMap;

use rv_review::anchor::DriftResult;
use rv_review::store::{
    Comment, ReviewDetail, ReviewStatus, ReviewStore, ReviewSummary, StoreError, ThreadRecord,
    ThreadStatus,
};

// ─── Demo drift ──────────────────────────────────────────────────────────────

/// Drift function backed by a fixed translation table.
///
/// A real implementation asks the VCS how a line moved between two
/// commits. The demo knows exactly two answers and falls back to "same
/// line, not drifted" for everything else.
#[must_use]
pub fn demo_drift(file: &str, line: i64, from_commit: &str, to_commit: &str) -> DriftResult {
    match (file, line, from_commit, to_commit) {
        // Two lines were inserted above the old line 72.
        ("src/render.rs", 72, "3f9c2ad", "8d41b7e") => DriftResult {
            current_line: Some(74),
            drifted: true,
        },
        _ => DriftResult::same(line),
    }
}

// ─── Demo store ──────────────────────────────────────────────────────────────

struct DemoReview {
    detail: ReviewDetail,
    files: Vec<String>,
    /// file path → unified diff text.
    diffs: HashMap<String, String>,
    /// file path → raw file content at the current commit.
    file_lines: HashMap<String, Vec<String>>,
}

/// Canned [`ReviewStore`] used when no backend is wired up.
pub struct DemoStore {
    reviews: Vec<DemoReview>,
    threads: Vec<ThreadRecord>,
    /// thread_id → review_id, for scoping list_threads.
    thread_review: HashMap<String, String>,
    comments: HashMap<String, Vec<Comment>>,
}

impl DemoStore {
    #[must_use]
    pub fn new() -> Self {
        let mut comments: HashMap<String, Vec<Comment>> = HashMap::new();
        let mut thread_review = HashMap::new();

        // ── Review r-1: open, three threads across two files ──

        let parser_diff = "\
diff --git a/src/parser.rs b/src/parser.rs
index 3f9c2ad..8d41b7e 100644
--- a/src/parser.rs
+++ b/src/parser.rs
@@ -38,6 +38,7 @@ fn parse_header(line: &str) -> Option<Header> {
     let rest = line.strip_prefix(\"@@ -\")?;
     let (old, rest) = rest.split_once(' ')?;
-    let new = rest.strip_prefix('+')?;
+    let rest = rest.strip_prefix('+')?;
+    let (new, _) = rest.split_once(\" @@\")?;
     let (old_start, old_count) = parse_range(old)?;
     let (new_start, new_count) = parse_range(new)?;
     Some(Header { old_start, old_count, new_start, new_count })
";

        let render_diff = "\
diff --git a/src/render.rs b/src/render.rs
index 3f9c2ad..8d41b7e 100644
--- a/src/render.rs
+++ b/src/render.rs
@@ -70,4 +72,5 @@ impl Renderer {
         for (y, row) in grid.rows().enumerate() {
             if row == prev_row(y) {
-                continue;
+                skipped += 1;
+                continue;
             }
";

        let parser_lines: Vec<String> = [
            "// Unified diff parsing.",
            "",
            "use std::str::FromStr;",
            "",
            "pub struct Header {",
            "    pub old_start: u32,",
            "    pub old_count: u32,",
            "    pub new_start: u32,",
            "    pub new_count: u32,",
            "}",
            "",
            "fn parse_range(s: &str) -> Option<(u32, u32)> {",
            "    match s.split_once(',') {",
            "        Some((start, count)) => {",
            "            Some((start.parse().ok()?, count.parse().ok()?))",
            "        }",
            "        None => Some((s.parse().ok()?, 1)),",
            "    }",
            "}",
            "",
            "/// Hunk headers look like `@@ -a,b +c,d @@ section`.",
            "///",
            "/// Counts default to 1 when omitted.",
            "fn parse_header(line: &str) -> Option<Header> {",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();

        let r1 = DemoReview {
            detail: ReviewDetail {
                review_id: "r-1".into(),
                title: "Tighten hunk header parsing".into(),
                description: Some(
                    "Handles section text after the trailing @@ and keeps the \
                     count-defaults-to-1 rule."
                        .into(),
                ),
                author: "mira".into(),
                status: ReviewStatus::Open,
                initial_commit: "3f9c2ad".into(),
                current_commit: "8d41b7e".into(),
                thread_count: 3,
                open_thread_count: 2,
            },
            files: vec!["src/parser.rs".into(), "src/render.rs".into()],
            diffs: HashMap::from([
                ("src/parser.rs".to_string(), parser_diff.to_string()),
                ("src/render.rs".to_string(), render_diff.to_string()),
            ]),
            file_lines: HashMap::from([
                ("src/parser.rs".to_string(), parser_lines),
                ("src/render.rs".to_string(), Vec::new()),
            ]),
        };

        // Anchored at the current commit: lands on the two added lines.
        let t101 = ThreadRecord {
            thread_id: "t-101".into(),
            file_path: "src/parser.rs".into(),
            selection_start: 40,
            selection_end: Some(41),
            commit_hash: "8d41b7e".into(),
            status: ThreadStatus::Open,
            comment_count: 2,
        };
        comments.insert(
            "t-101".into(),
            vec![
                Comment {
                    comment_id: "c-1".into(),
                    author: "jonas".into(),
                    body: "split_once eats the section text too — intended?".into(),
                    created_at: "2026-08-19 10:12".into(),
                },
                Comment {
                    comment_id: "c-2".into(),
                    author: "mira".into(),
                    body: "Yes, the section text is display-only.".into(),
                    created_at: "2026-08-19 10:40".into(),
                },
            ],
        );

        // Anchored at the initial commit on a line the diff never
        // touches: orphans, rendered with raw file context.
        let t102 = ThreadRecord {
            thread_id: "t-102".into(),
            file_path: "src/parser.rs".into(),
            selection_start: 15,
            selection_end: None,
            commit_hash: "3f9c2ad".into(),
            status: ThreadStatus::Open,
            comment_count: 1,
        };
        comments.insert(
            "t-102".into(),
            vec![Comment {
                comment_id: "c-3".into(),
                author: "jonas".into(),
                body: "parse_range should reject a count of 0 columns here.".into(),
                created_at: "2026-08-18 16:02".into(),
            }],
        );

        // Anchored at the initial commit; drift moves it onto the diff.
        let t103 = ThreadRecord {
            thread_id: "t-103".into(),
            file_path: "src/render.rs".into(),
            selection_start: 72,
            selection_end: None,
            commit_hash: "3f9c2ad".into(),
            status: ThreadStatus::Resolved,
            comment_count: 1,
        };
        comments.insert(
            "t-103".into(),
            vec![Comment {
                comment_id: "c-4".into(),
                author: "mira".into(),
                body: "Counting skipped rows for the frame stats.".into(),
                created_at: "2026-08-17 09:30".into(),
            }],
        );

        // ── Review r-2: closed, one resolved thread ──

        let input_diff = "\
--- a/src/input.rs
+++ b/src/input.rs
@@ -12,3 +12,3 @@ impl Parser {
     pub fn advance(&mut self, bytes: &[u8]) {
-        self.buf.extend(bytes);
+        self.buf.extend_from_slice(bytes);
     }
";

        let r2 = DemoReview {
            detail: ReviewDetail {
                review_id: "r-2".into(),
                title: "Avoid per-byte extend in the input parser".into(),
                description: None,
                author: "jonas".into(),
                status: ReviewStatus::Closed,
                initial_commit: "9b1f004".into(),
                current_commit: "9b1f004".into(),
                thread_count: 1,
                open_thread_count: 0,
            },
            files: vec!["src/input.rs".into()],
            diffs: HashMap::from([("src/input.rs".to_string(), input_diff.to_string())]),
            file_lines: HashMap::from([("src/input.rs".to_string(), Vec::new())]),
        };

        let t201 = ThreadRecord {
            thread_id: "t-201".into(),
            file_path: "src/input.rs".into(),
            selection_start: 13,
            selection_end: None,
            commit_hash: "9b1f004".into(),
            status: ThreadStatus::Resolved,
            comment_count: 1,
        };
        comments.insert(
            "t-201".into(),
            vec![Comment {
                comment_id: "c-5".into(),
                author: "mira".into(),
                body: "Nice, this was showing up in the profile.".into(),
                created_at: "2026-08-12 14:55".into(),
            }],
        );

        for (tid, rid) in [
            ("t-101", "r-1"),
            ("t-102", "r-1"),
            ("t-103", "r-1"),
            ("t-201", "r-2"),
        ] {
            thread_review.insert(tid.to_string(), rid.to_string());
        }

        Self {
            reviews: vec![r1, r2],
            threads: vec![t101, t102, t103, t201],
            thread_review,
            comments,
        }
    }

    fn find_review(&self, review_id: &str) -> Result<&DemoReview, StoreError> {
        self.reviews
            .iter()
            .find(|r| r.detail.review_id == review_id)
            .ok_or_else(|| StoreError::not_found("review", review_id))
    }
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewStore for DemoStore {
    fn list_reviews(&self) -> Result<Vec<ReviewSummary>, StoreError> {
        Ok(self
            .reviews
            .iter()
            .map(|r| ReviewSummary {
                review_id: r.detail.review_id.clone(),
                title: r.detail.title.clone(),
                author: r.detail.author.clone(),
                status: r.detail.status,
                thread_count: r.detail.thread_count,
                open_thread_count: r.detail.open_thread_count,
            })
            .collect())
    }

    fn get_review(&self, review_id: &str) -> Result<ReviewDetail, StoreError> {
        Ok(self.find_review(review_id)?.detail.clone())
    }

    fn list_threads(&self, review_id: &str) -> Result<Vec<ThreadRecord>, StoreError> {
        self.find_review(review_id)?;
        Ok(self
            .threads
            .iter()
            .filter(|t| {
                self.thread_review.get(&t.thread_id).map(String::as_str) == Some(review_id)
            })
            .cloned()
            .collect())
    }

    fn get_thread(&self, thread_id: &str) -> Result<ThreadRecord, StoreError> {
        self.threads
            .iter()
            .find(|t| t.thread_id == thread_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("thread", thread_id))
    }

    fn list_comments(&self, thread_id: &str) -> Result<Vec<Comment>, StoreError> {
        self.comments
            .get(thread_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("thread", thread_id))
    }

    fn list_files(&self, review_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.find_review(review_id)?.files.clone())
    }

    fn get_diff(&self, review_id: &str, file_path: &str) -> Result<String, StoreError> {
        self.find_review(review_id)?
            .diffs
            .get(file_path)
            .cloned()
            .ok_or_else(|| StoreError::not_found("diff", file_path))
    }

    fn get_file_lines(
        &self,
        review_id: &str,
        file_path: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.find_review(review_id)?
            .file_lines
            .get(file_path)
            .cloned()
            .ok_or_else(|| StoreError::not_found("file", file_path))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
