// SPDX-License-Identifier: MIT
//
// Viewport / scroll manager.
//
// Pure windowing state for a selectable list or diff stream. Emits only
// window bounds; rendering happens elsewhere. Every transition funnels
// through one clamp so the invariants hold for ALL input sequences:
//
//   0 <= selected < content_len          (when content_len > 0)
//   0 <= offset   <= max(0, content_len - height)
//   selected in [offset, offset + height - 1]

// ─── Moves ───────────────────────────────────────────────────────────────────

/// A selection movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Selection up one row.
    Up,
    /// Selection down one row.
    Down,
    /// Selection up one viewport height.
    PageUp,
    /// Selection down one viewport height.
    PageDown,
    /// First row.
    Top,
    /// Last row.
    Bottom,
}

// ─── Viewport ────────────────────────────────────────────────────────────────

/// Scroll window over a logical list of `content_len` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row index.
    offset: usize,
    /// Selected row index.
    selected: usize,
    /// Visible rows.
    height: usize,
    /// Total logical rows.
    content_len: usize,
}

impl Viewport {
    /// Viewport at the top of a list.
    #[must_use]
    pub const fn new(height: usize, content_len: usize) -> Self {
        Self {
            offset: 0,
            selected: 0,
            height,
            content_len,
        }
    }

    /// First visible row.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Selected row.
    #[inline]
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Visible row count.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total logical rows.
    #[inline]
    #[must_use]
    pub const fn content_len(&self) -> usize {
        self.content_len
    }

    /// Half-open range of visible row indices, clipped to the content.
    #[must_use]
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let end = (self.offset + self.height).min(self.content_len);
        self.offset..end
    }

    /// Whether `index` is currently on screen.
    #[must_use]
    pub fn is_visible(&self, index: usize) -> bool {
        self.visible_range().contains(&index)
    }

    /// Apply a movement, then re-clamp.
    pub fn apply(&mut self, mv: Move) {
        self.selected = match mv {
            Move::Up => self.selected.saturating_sub(1),
            Move::Down => self.selected.saturating_add(1),
            Move::PageUp => self.selected.saturating_sub(self.height.max(1)),
            Move::PageDown => self.selected.saturating_add(self.height.max(1)),
            Move::Top => 0,
            Move::Bottom => self.content_len.saturating_sub(1),
        };
        self.clamp();
    }

    /// Jump the selection to an absolute row, then re-clamp.
    pub fn select(&mut self, index: usize) {
        self.selected = index;
        self.clamp();
    }

    /// Content length changed (filter toggled, review switched).
    pub fn set_content_len(&mut self, content_len: usize) {
        self.content_len = content_len;
        self.clamp();
    }

    /// Viewport height changed (terminal resize).
    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.clamp();
    }

    /// Restore all invariants.
    ///
    /// Selection clamps into the content; the offset then makes the
    /// minimal shift that keeps the selection visible, itself clamped
    /// so the window never scrolls past the end.
    fn clamp(&mut self) {
        if self.content_len == 0 {
            self.selected = 0;
            self.offset = 0;
            return;
        }

        self.selected = self.selected.min(self.content_len - 1);

        let height = self.height.max(1);
        if self.selected < self.offset {
            // Selection above the window: scroll up just enough.
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            // Selection below the window: scroll down just enough.
            self.offset = self.selected + 1 - height;
        }

        let max_offset = self.content_len.saturating_sub(height);
        self.offset = self.offset.min(max_offset);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
