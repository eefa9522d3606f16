// SPDX-License-Identifier: MIT
//
// Differential renderer — turns one composed frame into minimal terminal
// output.
//
// Instead of redrawing the whole screen every frame, the renderer compares
// the current CellGrid against the previously presented one and emits runs
// of cells only where they differ. Scrolling a list typically touches two
// rows (old selection, new selection); everything else is skipped.
//
// The pipeline per frame:
//
//   1. The view composer paints the full grid (every row at full width,
//      trailing background fill included).
//   2. render() diffs against the stored previous grid, row by row.
//   3. Each row's changed cells become "move cursor, write run" spans.
//      Spans separated by fewer than SKIP_THRESHOLD unchanged cells are
//      merged — re-writing three unchanged cells is cheaper than a CUP.
//   4. ScreenWriter emits the spans, tracking a believed cursor that is
//      never advanced by an assumed wrap (the session runs with DECAWM
//      off, so a full-width write parks at the last column).
//   5. flush() issues a single write() syscall.
//
// Rows are compared at full grid width, always. A row whose text got
// shorter this frame differs in its trailing background cells, so the
// stale tail is overwritten like any other change. Dimension changes and
// the first frame take the other path entirely: clear screen plus full
// redraw, never a partial diff against a differently-shaped grid.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::Cell;
use crate::grid::CellGrid;
use crate::output::{OutputBuffer, ScreenWriter};

/// Spans separated by fewer unchanged cells than this are merged into one
/// run. A CUP sequence costs 6-10 bytes; re-emitting up to three styled
/// cells is usually cheaper and always fewer escape transitions.
const SKIP_THRESHOLD: usize = 4;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells emitted to the terminal (changed, or unchanged-but-merged).
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Move-and-write spans emitted.
    pub spans: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
    /// Whether this pass was a clear-screen full redraw.
    pub full_redraw: bool,
}

impl RenderStats {
    /// Total cells processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Differential renderer that emits ANSI only for changed spans.
///
/// Owns the previous frame for comparison and a [`ScreenWriter`] for
/// stateful output minimization. All output is buffered for a single
/// `write()` syscall per frame.
///
/// # Usage
///
/// ```no_run
/// use rv_term::grid::CellGrid;
/// use rv_term::render::Renderer;
///
/// let mut renderer = Renderer::new();
/// let grid = CellGrid::new(80, 24);
///
/// // Paint the frame into `grid`...
///
/// let stats = renderer.render(&grid);
/// renderer.flush().unwrap();
/// ```
pub struct Renderer {
    output: OutputBuffer,
    writer: ScreenWriter,
    previous: Option<CellGrid>,
}

impl Renderer {
    /// Create a renderer with no previous frame (first render draws everything).
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: ScreenWriter::new(),
            previous: None,
        }
    }

    /// Diff the current frame against the previous and generate ANSI output.
    ///
    /// After calling this, use [`flush`](Self::flush) or
    /// [`flush_to`](Self::flush_to) to write the output to the terminal,
    /// or [`output_bytes`](Self::output_bytes) to inspect it (for tests).
    pub fn render(&mut self, current: &CellGrid) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        // Nothing to render for zero-size grids.
        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        // Synchronized output: terminal buffers until end_sync.
        ansi::begin_sync(&mut self.output).ok();

        // First frame or dimension mismatch: clear + full redraw. Diffing
        // across a resize is meaningless — the terminal rewrapped or
        // clipped its backing store in ways we cannot model.
        let size_matches = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == width && prev.height() == height);
        stats.full_redraw = !size_matches;

        if stats.full_redraw {
            ansi::clear_screen(&mut self.output).ok();
            ansi::cursor_to(&mut self.output, 0, 0).ok();
            self.writer.reset_state();

            for y in 0..height {
                let Some(row) = current.row(y) else { continue };
                self.writer.write_run(&mut self.output, 0, y, row, width);
                stats.cells_rendered += usize::from(width);
                stats.spans += 1;
            }
        } else {
            // self.previous is Some and same-sized here.
            for y in 0..height {
                let (Some(curr), Some(prev)) = (
                    current.row(y),
                    self.previous.as_ref().and_then(|p| p.row(y)),
                ) else {
                    continue;
                };

                // Row-skip: one slice comparison covers the full width,
                // trailing background fill included.
                if curr == prev {
                    stats.cells_skipped += usize::from(width);
                    continue;
                }

                let rendered = Self::render_row_spans(
                    &mut self.output,
                    &mut self.writer,
                    y,
                    curr,
                    prev,
                    width,
                    &mut stats.spans,
                );
                stats.cells_rendered += rendered;
                stats.cells_skipped += usize::from(width) - rendered;
            }
        }

        // Reset terminal state at frame end so nothing leaks into the
        // shell when the session ends mid-style.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// Emit move-and-write spans for one changed row.
    ///
    /// Returns the number of cells written. Spans start at the first
    /// changed cell and extend through the last changed cell of a cluster;
    /// unchanged gaps shorter than [`SKIP_THRESHOLD`] are absorbed. A span
    /// that would start on a continuation cell is widened to include its
    /// owner, so a wide glyph is never re-emitted by halves.
    fn render_row_spans(
        out: &mut OutputBuffer,
        writer: &mut ScreenWriter,
        y: u16,
        curr: &[Cell],
        prev: &[Cell],
        width: u16,
        spans: &mut usize,
    ) -> usize {
        let w = curr.len();
        let mut rendered = 0usize;
        let mut x = 0usize;

        while x < w {
            if curr[x] == prev[x] {
                x += 1;
                continue;
            }

            let mut start = x;
            if curr[start].is_continuation() && start > 0 {
                start -= 1;
            }

            // Grow the span; tolerate short unchanged gaps.
            let mut end = x + 1;
            let mut scan = end;
            let mut gap = 0usize;
            while scan < w && gap < SKIP_THRESHOLD {
                if curr[scan] == prev[scan] {
                    gap += 1;
                } else {
                    gap = 0;
                }
                scan += 1;
                if gap == 0 {
                    end = scan;
                }
            }

            #[allow(clippy::cast_possible_truncation)]
            writer.write_run(out, start as u16, y, &curr[start..end], width);
            rendered += end - start;
            *spans += 1;
            x = scan.max(end);
        }

        rendered
    }

    /// The raw ANSI bytes from the last render (for testing and debugging).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render draws everything.
    ///
    /// Used after SIGWINCH and for manual refresh (Ctrl-L).
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Store the current frame for the next render's comparison.
    ///
    /// Reuses the existing allocation when dimensions match; only the
    /// first render or a resize allocates.
    fn store_frame(&mut self, current: &CellGrid) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => {
                self.previous = Some(current.clone());
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
