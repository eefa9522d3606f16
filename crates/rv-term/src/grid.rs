// SPDX-License-Identifier: MIT
//
// CellGrid — the 2D cell grid that everything paints to.
//
// The view composer rebuilds this grid once per frame; the renderer then
// compares it against the previously presented grid and emits only the
// difference. Rows are full terminal width always, including trailing
// background fill. There is no notion of "logical content length" here —
// that is what keeps stale cells from surviving a frame where a row got
// shorter.
//
// Layout: flat `Vec<Cell>`, row-major (`index = y * width + x`), so a row
// is one contiguous slice and the renderer's row comparison is a memcmp.
//
// Wide characters occupy two columns: codepoint cell plus continuation
// cell (ch = 0). Paint methods create continuations and break any wide
// character they partially overwrite.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Style};
use crate::color::CellColor;

// ─── CellGrid ────────────────────────────────────────────────────────────────

/// A 2D grid of terminal cells — the canvas for one frame.
///
/// # Examples
///
/// ```
/// use rv_term::grid::CellGrid;
/// use rv_term::cell::{Cell, Style};
///
/// let mut grid = CellGrid::new(80, 24);
/// grid.put_str(2, 1, "hello", Style::default(), 80);
/// assert_eq!(grid.get(2, 1).unwrap().character(), Some('h'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a grid filled with empty cells (space, default colors).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    /// Create a grid pre-filled with a background color.
    #[must_use]
    pub fn with_bg(width: u16, height: u16, bg: CellColor) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY.with_bg(bg); size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice (for the renderer's hot loop).
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Clear the grid to empty cells.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Clear with a specific background color.
    pub fn clear_with_bg(&mut self, bg: CellColor) {
        self.cells.fill(Cell::EMPTY.with_bg(bg));
    }

    /// Resize the grid, clearing all content.
    ///
    /// Partial content carry-over across a resize is never attempted;
    /// the next frame is composed from scratch anyway.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy all cells from another grid of the same dimensions.
    ///
    /// The renderer uses this to refresh its previous-frame copy without
    /// reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "copy_from requires equal dimensions"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    // ─── Direct Cell Access ──────────────────────────────────────────────

    /// Write a cell directly. Bounds-checked, no wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    // ─── Wide Character Cleanup ──────────────────────────────────────────

    /// Break any wide character that touches position `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation cell, the owner at `x-1` becomes a
    ///   space.
    /// - If the cell after `(x, y)` is a continuation, it was owned by a
    ///   wide char starting here; the orphan is cleared.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    /// Paint a single styled character with wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = style.cell(ch);
        true
    }

    /// Fill a rectangle with styled spaces.
    ///
    /// Out-of-bounds portions are clipped to the grid.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, style: Style) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);
        let blank = style.cell(' ');
        for row in y..y2 {
            let start = self.index(x, row);
            let end = self.index(x2, row);
            self.cells[start..end].fill(blank);
        }
    }

    /// Fill an entire row with styled spaces.
    #[inline]
    pub fn fill_row(&mut self, y: u16, style: Style) {
        self.fill_rect(0, y, self.width, 1, style);
    }

    /// Paint a string left-to-right from `(x, y)`, consuming at most
    /// `max_width` columns and never crossing the grid edge.
    ///
    /// Wide characters get a continuation cell at `x+1`; when one would
    /// not fit in the remaining width, a space is painted instead
    /// (half a wide glyph is display garbage in every terminal).
    /// Zero-width characters are skipped entirely and never reach cells.
    ///
    /// Returns the number of columns consumed.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, max_width: u16) -> u16 {
        if y >= self.height || x >= self.width {
            return 0;
        }
        let limit = x.saturating_add(max_width).min(self.width);
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }

            let char_w = ch.width().unwrap_or(0);
            if char_w == 0 {
                continue;
            }
            let is_wide = char_w == 2;

            if is_wide && col + 1 >= limit {
                self.put_char(col, y, ' ', style);
                col += 1;
                break;
            }

            if self.put_char(col, y, ch, style) && is_wide {
                let cont_x = col + 1;
                self.break_wide_char_at(cont_x, y);
                let cont_idx = self.index(cont_x, y);
                self.cells[cont_idx] = Cell::continuation(style.fg, style.bg, style.attrs);
            }

            // char_w is 1 or 2 here.
            #[allow(clippy::cast_possible_truncation)]
            let w = char_w as u16;
            col = col.saturating_add(w);
        }

        col - x
    }
}

impl std::fmt::Debug for CellGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CellGrid({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// 0 for control/combining characters, 1 for most, 2 for wide (CJK and
/// most emoji), per Unicode Standard Annex #11.
///
/// ```
/// use rv_term::grid::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
///
/// ```
/// use rv_term::grid::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("a中b"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
