// SPDX-License-Identifier: MIT
//
// Cell — the atomic unit of terminal rendering.
//
// Every character position on screen is a Cell: a Unicode codepoint plus
// foreground, background, and text attributes. The whole pipeline exists to
// produce grids of these, diff them, and emit the difference.
//
// Size: 16 bytes, Copy. A 200×50 terminal is 10,000 cells = 160 KB per
// frame grid — two of those (previous and current) is nothing.
//
// Wide characters (CJK, most emoji) occupy two columns. The first cell
// holds the codepoint; the second is a continuation cell (ch = 0). The
// writer skips continuation cells for character output but still honors
// their colors so background fill stays correct.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to one SGR (Select Graphic Rendition) parameter.
    /// Combine with bitwise OR:
    ///
    /// ```
    /// use rv_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::ITALIC));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD          = 1 << 0;
        /// SGR 2 — decreased intensity (faint).
        const DIM           = 1 << 1;
        /// SGR 3 — italic or oblique.
        const ITALIC        = 1 << 2;
        /// SGR 4 — underline.
        const UNDERLINE     = 1 << 3;
        /// SGR 7 — swap foreground and background.
        const INVERSE       = 1 << 4;
        /// SGR 9 — crossed-out text.
        const STRIKETHROUGH = 1 << 5;
    }
}

impl Attr {
    /// Whether no attributes are set.
    #[inline]
    #[must_use]
    pub const fn is_empty_flags(self) -> bool {
        self.bits() == 0
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell — the atom of rendering.
///
/// # Layout (16 bytes)
///
/// ```text
/// ┌──────────┬───────────┬───────────┬───────┬─────────┐
/// │ ch: u32  │ fg: Cell  │ bg: Cell  │ attrs │ padding │
/// │ 4 bytes  │  Color 4  │  Color 4  │  u8   │ 3 bytes │
/// └──────────┴───────────┴───────────┴───────┴─────────┘
/// ```
///
/// # Wide characters
///
/// Characters that occupy two terminal columns use a **continuation
/// cell**: the first cell holds the codepoint, the second has `ch = 0`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint to display.
    ///
    /// - `0` = continuation cell (second column of a wide character)
    /// - `b' '` (32) = empty / space (the default)
    /// - Any other value = the character to render
    pub ch: u32,

    /// Foreground (text) color.
    pub fg: CellColor,

    /// Background color.
    pub bg: CellColor,

    /// Text attributes (bold, italic, underline, etc.).
    pub attrs: Attr,
}

/// Continuation marker: a cell whose `ch` is 0 belongs to the preceding
/// wide character and produces no character output of its own.
const CONTINUATION: u32 = 0;

/// Default character for empty cells.
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with full styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// Create a continuation cell for wide characters.
    ///
    /// Continuation cells inherit the colors and attributes of the
    /// preceding wide-character cell so the background fills correctly.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// Whether this is a continuation cell (second column of a wide char).
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, default colors, unstyled).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.ch == SPACE
            && self.fg == CellColor::Default
            && self.bg == CellColor::Default
            && self.attrs.is_empty_flags()
    }

    /// The Unicode codepoint as a `char`, if valid.
    ///
    /// Returns `None` for continuation cells and invalid scalar values.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    // ─── Mutations ────────────────────────────────────────────────────────

    /// Set the foreground color.
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    /// Set the background color.
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    /// Set text attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Whether two cells share colors and attributes, regardless of
    /// character content. The writer uses this to decide whether a new
    /// SGR sequence is needed between adjacent cells.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A reusable (fg, bg, attrs) triple for painting runs of cells.
///
/// Themes resolve to a set of these; the view composer threads them
/// through grid paint calls instead of three loose arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

impl Style {
    /// Style with both colors set and no attributes.
    #[inline]
    #[must_use]
    pub const fn new(fg: CellColor, bg: CellColor) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    /// Add attributes to this style.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Build a cell carrying this style.
    #[inline]
    #[must_use]
    pub const fn cell(self, ch: char) -> Cell {
        Cell::styled(ch, self.fg, self.bg, self.attrs)
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            write!(f, "Cell(continuation)")
        } else {
            let ch = char::from_u32(self.ch).unwrap_or('?');
            write!(f, "Cell({ch:?}")?;
            if self.fg != CellColor::Default {
                write!(f, ", fg={:?}", self.fg)?;
            }
            if self.bg != CellColor::Default {
                write!(f, ", bg={:?}", self.bg)?;
            }
            if !self.attrs.is_empty_flags() {
                write!(f, ", {:?}", self.attrs)?;
            }
            write!(f, ")")
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    // ── Layout ───────────────────────────────────────────────────────────

    #[test]
    fn cell_is_16_bytes() {
        assert_eq!(mem::size_of::<Cell>(), 16);
    }

    #[test]
    fn attr_is_1_byte() {
        assert_eq!(mem::size_of::<Attr>(), 1);
    }

    #[test]
    fn cell_is_copy() {
        let a = Cell::EMPTY;
        let b = a;
        assert_eq!(a, b);
    }

    // ── Default / Empty ──────────────────────────────────────────────────

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.ch, b' ' as u32);
        assert_eq!(cell.fg, CellColor::Default);
        assert_eq!(cell.bg, CellColor::Default);
        assert!(cell.attrs.is_empty_flags());
    }

    #[test]
    fn styled_space_is_not_empty() {
        assert!(!Cell::EMPTY.with_bg(CellColor::Rgb(0, 0, 255)).is_empty());
        assert!(!Cell::EMPTY.with_attrs(Attr::BOLD).is_empty());
    }

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn styled_cell_has_all_fields() {
        let cell = Cell::styled(
            'Z',
            CellColor::Rgb(255, 255, 0),
            CellColor::Rgb(0, 0, 128),
            Attr::BOLD | Attr::ITALIC,
        );
        assert_eq!(cell.character(), Some('Z'));
        assert_eq!(cell.fg, CellColor::Rgb(255, 255, 0));
        assert_eq!(cell.bg, CellColor::Rgb(0, 0, 128));
        assert!(cell.attrs.contains(Attr::BOLD));
        assert!(!cell.attrs.contains(Attr::DIM));
    }

    #[test]
    fn unicode_cell() {
        assert_eq!(Cell::new('日').character(), Some('日'));
    }

    // ── Continuation ─────────────────────────────────────────────────────

    #[test]
    fn continuation_cell_detected() {
        let cell = Cell::continuation(CellColor::Default, CellColor::Default, Attr::empty());
        assert!(cell.is_continuation());
        assert_eq!(cell.ch, 0);
        assert!(cell.character().is_none());
    }

    #[test]
    fn continuation_inherits_colors() {
        let bg = CellColor::Rgb(10, 20, 30);
        let cell = Cell::continuation(CellColor::Default, bg, Attr::BOLD);
        assert_eq!(cell.bg, bg);
        assert!(cell.attrs.contains(Attr::BOLD));
    }

    #[test]
    fn regular_cell_is_not_continuation() {
        assert!(!Cell::new('x').is_continuation());
    }

    // ── Style comparison ─────────────────────────────────────────────────

    #[test]
    fn same_style_ignores_character() {
        let a = Cell::new('A').with_fg(CellColor::Rgb(255, 0, 0));
        let b = Cell::new('B').with_fg(CellColor::Rgb(255, 0, 0));
        assert!(a.same_style(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn different_style_detected() {
        let a = Cell::new('A').with_fg(CellColor::Rgb(255, 0, 0));
        let b = Cell::new('A').with_fg(CellColor::Rgb(0, 255, 0));
        assert!(!a.same_style(&b));
        let c = Cell::new('A').with_attrs(Attr::BOLD);
        assert!(!a.same_style(&c));
    }

    // ── Debug format ─────────────────────────────────────────────────────

    #[test]
    fn debug_continuation_cell() {
        let cell = Cell::continuation(CellColor::Default, CellColor::Default, Attr::empty());
        assert_eq!(format!("{cell:?}"), "Cell(continuation)");
    }
}
