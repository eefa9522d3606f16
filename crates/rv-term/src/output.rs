// SPDX-License-Identifier: MIT
//
// Output buffering and stateful run writing.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer — accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() syscall. This eliminates per-escape
//   overhead and keeps the terminal's input parser happy.
//
//   ScreenWriter — owns the believed cursor position and the last-emitted
//   style. The renderer hands it runs of cells; it prefixes an absolute
//   cursor move whenever the run's target differs from where it believes
//   the cursor is, and skips SGR sequences that would not change anything.
//
// The believed-cursor model is deliberately conservative. The session runs
// with auto-wrap (DECAWM) disabled, so a write that reaches the last column
// parks the cursor there — it never wraps to the next row. The writer
// encodes exactly that: the believed column is clamped at the last column,
// and any position mismatch costs one explicit CUP. Guessing wrong about
// wrap is how duplicated rows and phantom markers get painted; a few bytes
// of cursor movement is the price of never guessing.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::CellColor;
use crate::grid::char_width;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Instead of hundreds of small writes per frame (cursor moves, color
/// changes, characters), everything goes into this buffer first. A single
/// flush at frame end writes it all at once.
///
/// Default capacity: 16 KB — enough for most frames without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a Unicode codepoint as UTF-8.
    ///
    /// Invalid codepoints (including 0, the continuation marker) produce `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        if cp == 0 {
            // Continuation cell marker — should never reach output.
            self.buf.push(b'?');
            return;
        }
        match char::from_u32(cp) {
            Some(ch) => {
                let mut enc = [0u8; 4];
                let s = ch.encode_utf8(&mut enc);
                self.buf.extend_from_slice(s.as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&self.buf)?;
            stdout.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_stdout() / flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── ScreenWriter ────────────────────────────────────────────────────────────

/// Stateful run writer that tracks the believed cursor and last style.
///
/// # Cursor model
///
/// - `col`/`row` are where the writer believes the terminal cursor sits;
///   `-1` means unknown (after reset or screen clear).
/// - Writing a run of `n` columns starting at `x` advances the believed
///   column to `x + n`, **clamped to the last column**. With DECAWM off
///   the terminal parks there; it never moves to the next row on its own.
/// - A run whose start differs from the believed position always gets an
///   absolute CUP first. In particular the first run of every row does,
///   because a previous full-width row leaves the cursor parked at the
///   last column, not at column 0 of the next row.
///
/// # Style model
///
/// - Attribute change: SGR 0 first if old attrs were set (SGR 0 clears
///   colors too, so fg/bg tracking is invalidated), then the new attrs.
/// - fg/bg: emitted only on change.
/// - Continuation cells: skipped when the preceding wide-char start was
///   just written (the terminal drew both columns); otherwise they emit
///   a styled space so background fill stays correct.
#[allow(clippy::struct_field_names)]
pub struct ScreenWriter {
    col: i32,
    row: i32,
    last_fg: Option<CellColor>,
    last_bg: Option<CellColor>,
    last_attrs: Attr,
}

impl ScreenWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            col: -1,
            row: -1,
            last_fg: None,
            last_bg: None,
            last_attrs: Attr::empty(),
        }
    }

    /// Forget all tracked state. Call after SGR 0 at frame end or any
    /// full-screen clear.
    #[allow(clippy::missing_const_for_fn)] // *self = Self::new() isn't const-evaluable.
    pub fn reset_state(&mut self) {
        *self = Self::new();
    }

    /// The believed cursor position, if known.
    #[must_use]
    pub const fn believed_cursor(&self) -> Option<(u16, u16)> {
        if self.col < 0 || self.row < 0 {
            None
        } else {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            Some((self.col as u16, self.row as u16))
        }
    }

    /// Write a horizontal run of cells starting at `(x, y)`.
    ///
    /// The run is truncated at `grid_width` — never wrapped. Emits an
    /// absolute cursor move unless `(x, y)` equals the believed cursor.
    pub fn write_run(
        &mut self,
        out: &mut OutputBuffer,
        x: u16,
        y: u16,
        cells: &[Cell],
        grid_width: u16,
    ) {
        if grid_width == 0 || x >= grid_width {
            return;
        }
        let max_cells = usize::from(grid_width - x);
        let cells = &cells[..cells.len().min(max_cells)];
        if cells.is_empty() {
            return;
        }

        if i32::from(x) != self.col || i32::from(y) != self.row {
            ansi::cursor_to(out, x, y).ok();
        }

        // Whether the terminal already drew the current column as the
        // second half of a wide character.
        let mut covered = false;

        for cell in cells {
            if cell.is_continuation() {
                if covered {
                    covered = false;
                } else {
                    // Orphaned continuation (run started mid-glyph).
                    self.apply_style(out, cell);
                    out.buf.push(b' ');
                }
                continue;
            }

            covered = false;
            self.apply_style(out, cell);
            out.write_codepoint(cell.ch);
            if cell.character().is_some_and(|ch| char_width(ch) == 2) {
                covered = true;
            }
        }

        // Believed position: one column per cell written, parked at the
        // last column when the run reached it (wrap is off).
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        {
            let end = i32::from(x) + cells.len() as i32;
            self.col = end.min(i32::from(grid_width) - 1);
            self.row = i32::from(y);
        }
    }

    /// Apply style changes (attrs, fg, bg) for a cell.
    fn apply_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                // SGR 0 clears everything — invalidate color tracking.
                ansi::reset(out).ok();
                self.last_fg = None;
                self.last_bg = None;
            }
            self.last_attrs = cell.attrs;
            if !cell.attrs.is_empty() {
                ansi::attrs(out, cell.attrs).ok();
            }
        }

        if self.last_fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.last_fg = Some(cell.fg);
        }

        if self.last_bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.last_bg = Some(cell.bg);
        }
    }
}

impl Default for ScreenWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── OutputBuffer ────────────────────────────────────────────────────

    #[test]
    fn output_buffer_new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn output_buffer_write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
    }

    #[test]
    fn write_codepoint_ascii_and_unicode() {
        let mut buf = OutputBuffer::new();
        buf.write_codepoint(u32::from('A'));
        buf.write_codepoint(u32::from('中'));
        let mut expected = b"A".to_vec();
        expected.extend_from_slice("中".as_bytes());
        assert_eq!(buf.as_bytes(), expected);
    }

    #[test]
    fn write_codepoint_zero_and_invalid_become_question_mark() {
        let mut buf = OutputBuffer::new();
        buf.write_codepoint(0); // continuation marker
        buf.write_codepoint(0xD800); // surrogate
        assert_eq!(buf.as_bytes(), b"??");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = OutputBuffer::new();
        write!(buf, "some data").unwrap();
        let cap = buf.buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), cap);
    }

    #[test]
    fn flush_to_writes_and_clears() {
        let mut buf = OutputBuffer::new();
        write!(buf, "frame data").unwrap();
        let mut dest = Vec::new();
        buf.flush_to(&mut dest).unwrap();
        assert_eq!(dest, b"frame data");
        assert!(buf.is_empty());
    }

    // ── ScreenWriter — helpers ──────────────────────────────────────────

    const W: u16 = 80;

    fn run(writer: &mut ScreenWriter, x: u16, y: u16, text: &str) -> String {
        let cells: Vec<Cell> = text.chars().map(Cell::new).collect();
        let mut out = OutputBuffer::new();
        writer.write_run(&mut out, x, y, &cells, W);
        String::from_utf8(out.as_bytes().to_vec()).unwrap()
    }

    // ── ScreenWriter — cursor ───────────────────────────────────────────

    #[test]
    fn first_run_emits_cursor_move() {
        let mut w = ScreenWriter::new();
        let output = run(&mut w, 5, 3, "A");
        assert!(output.contains("\x1b[4;6H"));
        assert!(output.contains('A'));
    }

    #[test]
    fn adjacent_run_skips_cursor_move() {
        let mut w = ScreenWriter::new();
        run(&mut w, 0, 0, "ABC");
        assert_eq!(w.believed_cursor(), Some((3, 0)));
        // Next run starts exactly where the cursor is believed to be.
        let output = run(&mut w, 3, 0, "DEF");
        assert!(!output.contains('H'));
        assert!(output.contains("DEF"));
    }

    #[test]
    fn gapped_run_emits_cursor_move() {
        let mut w = ScreenWriter::new();
        run(&mut w, 0, 0, "A");
        let output = run(&mut w, 5, 0, "B");
        assert!(output.contains("\x1b[1;6H"));
    }

    #[test]
    fn full_width_run_parks_at_last_column() {
        let mut w = ScreenWriter::new();
        let text: String = std::iter::repeat_n('x', usize::from(W)).collect();
        run(&mut w, 0, 0, &text);
        // Believed column is clamped at the last column, never wrapped.
        assert_eq!(w.believed_cursor(), Some((W - 1, 0)));
    }

    #[test]
    fn next_row_after_full_width_run_gets_absolute_move() {
        let mut w = ScreenWriter::new();
        let text: String = std::iter::repeat_n('x', usize::from(W)).collect();
        run(&mut w, 0, 0, &text);
        // Column 0 of the next row differs from the parked position, so an
        // absolute CUP must be emitted — wrap is never assumed.
        let output = run(&mut w, 0, 1, "y");
        assert!(output.contains("\x1b[2;1H"));
    }

    #[test]
    fn run_truncates_at_grid_edge() {
        let mut w = ScreenWriter::new();
        let cells: Vec<Cell> = "abcdef".chars().map(Cell::new).collect();
        let mut out = OutputBuffer::new();
        w.write_run(&mut out, 3, 0, &cells, 6);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        // Width 6, start 3: only columns 3..6 fit.
        assert!(output.contains("abc"));
        assert!(!output.contains('d'));
        assert_eq!(w.believed_cursor(), Some((5, 0)));
    }

    #[test]
    fn run_past_grid_edge_is_noop() {
        let mut w = ScreenWriter::new();
        let cells = [Cell::new('a')];
        let mut out = OutputBuffer::new();
        w.write_run(&mut out, 10, 0, &cells, 10);
        assert!(out.is_empty());
        assert_eq!(w.believed_cursor(), None);
    }

    // ── ScreenWriter — style dedupe ─────────────────────────────────────

    #[test]
    fn same_fg_not_re_emitted_within_run() {
        let red = CellColor::Rgb(255, 0, 0);
        let cells = [Cell::new('A').with_fg(red), Cell::new('B').with_fg(red)];
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 0, 0, &cells, W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert_eq!(output.matches("\x1b[38;2;255;0;0m").count(), 1);
    }

    #[test]
    fn fg_change_emitted() {
        let cells = [
            Cell::new('A').with_fg(CellColor::Rgb(255, 0, 0)),
            Cell::new('B').with_fg(CellColor::Rgb(0, 255, 0)),
        ];
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 0, 0, &cells, W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(output.contains("\x1b[38;2;255;0;0m"));
        assert!(output.contains("\x1b[38;2;0;255;0m"));
    }

    #[test]
    fn attr_change_triggers_reset_and_color_re_emit() {
        let red = CellColor::Rgb(255, 0, 0);
        let cells = [
            Cell::new('A').with_fg(red).with_attrs(Attr::BOLD),
            Cell::new('B').with_fg(red).with_attrs(Attr::ITALIC),
        ];
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 0, 0, &cells, W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(output.contains("\x1b[0m"));
        assert!(output.contains("\x1b[3m"));
        // SGR 0 cleared the fg, so the same red is emitted twice.
        assert_eq!(output.matches("\x1b[38;2;255;0;0m").count(), 2);
    }

    #[test]
    fn none_to_attr_skips_reset() {
        let cells = [Cell::new('A'), Cell::new('B').with_attrs(Attr::BOLD)];
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 0, 0, &cells, W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(!output.contains("\x1b[0m"));
        assert!(output.contains("\x1b[1m"));
    }

    #[test]
    fn style_tracking_persists_across_runs() {
        let blue = CellColor::Rgb(0, 0, 255);
        let mut w = ScreenWriter::new();
        let mut out = OutputBuffer::new();
        w.write_run(&mut out, 0, 0, &[Cell::new('A').with_bg(blue)], W);
        w.write_run(&mut out, 0, 1, &[Cell::new('B').with_bg(blue)], W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert_eq!(output.matches("\x1b[48;2;0;0;255m").count(), 1);
    }

    // ── ScreenWriter — wide chars ───────────────────────────────────────

    #[test]
    fn continuation_after_wide_start_is_skipped() {
        let wide = Cell::new('中');
        let cont = Cell::continuation(CellColor::Default, CellColor::Default, Attr::empty());
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 3, 0, &[wide, cont], W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        let last_m = output.rfind('m').unwrap();
        // Nothing after the wide char itself: no filler space.
        assert_eq!(&output[last_m + 1..], "中");
        // Both columns are accounted for in the believed position.
        assert_eq!(w.believed_cursor(), Some((5, 0)));
    }

    #[test]
    fn orphaned_continuation_emits_styled_space() {
        let cont = Cell::continuation(CellColor::Default, CellColor::Rgb(0, 0, 255), Attr::empty());
        let mut out = OutputBuffer::new();
        let mut w = ScreenWriter::new();
        w.write_run(&mut out, 4, 0, &[cont], W);
        let output = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(output.contains("\x1b[1;5H"));
        assert!(output.contains("\x1b[48;2;0;0;255m"));
        assert!(output.ends_with(' '));
    }

    // ── ScreenWriter — reset ────────────────────────────────────────────

    #[test]
    fn reset_state_forgets_cursor_and_style() {
        let mut w = ScreenWriter::new();
        run(&mut w, 0, 0, "ABC");
        w.reset_state();
        assert_eq!(w.believed_cursor(), None);
        // The next run re-emits position and default colors.
        let output = run(&mut w, 3, 0, "D");
        assert!(output.contains("\x1b[1;4H"));
        assert!(output.contains("\x1b[39m"));
    }
}
