// SPDX-License-Identifier: MIT
//
// Built-in themes — fully resolved style sets.
//
// A theme here is nothing but a bag of (fg, bg, attrs) triples, one per
// UI surface. Resolution happens once at startup; by the time the view
// composer runs, every paint call hands the grid a concrete `Style`
// with no lookups left. External theme files are out of scope — two
// built-in palettes, selected by name via config or `--theme`.

use rv_term::cell::{Attr, Style};
use rv_term::color::CellColor;

// ─── Theme ───────────────────────────────────────────────────────────────────

/// Resolved styles for every surface the view composer paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Theme name as selected by config or CLI.
    pub name: &'static str,

    // ── Chrome ────────────────────────────────────────────────
    /// Default text on the default background.
    pub base: Style,
    /// Top header bar.
    pub header: Style,
    /// Bottom status line (key hints, counts).
    pub status: Style,
    /// Inline error notices (store failures, unavailable diffs).
    pub error: Style,

    // ── Review list ───────────────────────────────────────────
    /// Unselected list row.
    pub list_row: Style,
    /// Selection bar.
    pub list_selected: Style,
    /// Closed reviews render dimmed.
    pub list_closed: Style,

    // ── Diff stream ───────────────────────────────────────────
    /// File header row (path + change counts).
    pub file_header: Style,
    /// `@@ ... @@` hunk header row.
    pub hunk_header: Style,
    /// Added line.
    pub added: Style,
    /// Removed line.
    pub removed: Style,
    /// Context line.
    pub context: Style,
    /// Gutter line numbers.
    pub gutter: Style,
    /// Selection bar over a diff row.
    pub diff_selected: Style,

    // ── Threads & comments ────────────────────────────────────
    /// Marker column for an open thread.
    pub thread_open: Style,
    /// Marker column for a resolved thread.
    pub thread_resolved: Style,
    /// Comment block header (author, count).
    pub comment_header: Style,
    /// Comment body text.
    pub comment_body: Style,
    /// Orphaned-thread section header.
    pub orphan_header: Style,
    /// `··· N lines ···` separators inside orphaned context.
    pub orphan_gap: Style,
}

impl Theme {
    /// Look up a built-in theme by name.
    ///
    /// Returns `None` if the name is not recognized.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" | "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Names accepted by [`Theme::by_name`].
    #[must_use]
    pub const fn names() -> &'static [&'static str] {
        &["dark", "light"]
    }

    /// The default dark palette.
    #[must_use]
    pub fn dark() -> Self {
        let bg = CellColor::Rgb(0x1e, 0x22, 0x27);
        let bg_panel = CellColor::Rgb(0x2a, 0x2f, 0x36);
        let bg_select = CellColor::Rgb(0x3a, 0x42, 0x4e);
        let fg = CellColor::Rgb(0xd8, 0xda, 0xdd);
        let fg_dim = CellColor::Rgb(0x7d, 0x85, 0x90);
        let green = CellColor::Rgb(0x8f, 0xc8, 0x7f);
        let red = CellColor::Rgb(0xe0, 0x6c, 0x75);
        let yellow = CellColor::Rgb(0xe2, 0xb8, 0x6b);
        let blue = CellColor::Rgb(0x6f, 0xa8, 0xdc);
        let cyan = CellColor::Rgb(0x56, 0xb6, 0xc2);

        Self {
            name: "dark",
            base: Style::new(fg, bg),
            header: Style::new(fg, bg_panel).with_attrs(Attr::BOLD),
            status: Style::new(fg_dim, bg_panel),
            error: Style::new(red, bg).with_attrs(Attr::BOLD),
            list_row: Style::new(fg, bg),
            list_selected: Style::new(fg, bg_select).with_attrs(Attr::BOLD),
            list_closed: Style::new(fg_dim, bg),
            file_header: Style::new(blue, bg_panel).with_attrs(Attr::BOLD),
            hunk_header: Style::new(cyan, bg),
            added: Style::new(green, bg),
            removed: Style::new(red, bg),
            context: Style::new(fg, bg),
            gutter: Style::new(fg_dim, bg),
            diff_selected: Style::new(fg, bg_select),
            thread_open: Style::new(yellow, bg).with_attrs(Attr::BOLD),
            thread_resolved: Style::new(fg_dim, bg),
            comment_header: Style::new(yellow, bg_panel).with_attrs(Attr::BOLD),
            comment_body: Style::new(fg, bg_panel),
            orphan_header: Style::new(yellow, bg).with_attrs(Attr::ITALIC),
            orphan_gap: Style::new(fg_dim, bg).with_attrs(Attr::DIM),
        }
    }

    /// The built-in light palette.
    #[must_use]
    pub fn light() -> Self {
        let bg = CellColor::Rgb(0xfa, 0xfa, 0xf8);
        let bg_panel = CellColor::Rgb(0xea, 0xea, 0xe6);
        let bg_select = CellColor::Rgb(0xd5, 0xdd, 0xe8);
        let fg = CellColor::Rgb(0x2b, 0x2f, 0x33);
        let fg_dim = CellColor::Rgb(0x83, 0x88, 0x8d);
        let green = CellColor::Rgb(0x2e, 0x7d, 0x32);
        let red = CellColor::Rgb(0xc6, 0x28, 0x38);
        let orange = CellColor::Rgb(0xb0, 0x6a, 0x00);
        let blue = CellColor::Rgb(0x1e, 0x5a, 0xa8);
        let teal = CellColor::Rgb(0x00, 0x77, 0x7a);

        Self {
            name: "light",
            base: Style::new(fg, bg),
            header: Style::new(fg, bg_panel).with_attrs(Attr::BOLD),
            status: Style::new(fg_dim, bg_panel),
            error: Style::new(red, bg).with_attrs(Attr::BOLD),
            list_row: Style::new(fg, bg),
            list_selected: Style::new(fg, bg_select).with_attrs(Attr::BOLD),
            list_closed: Style::new(fg_dim, bg),
            file_header: Style::new(blue, bg_panel).with_attrs(Attr::BOLD),
            hunk_header: Style::new(teal, bg),
            added: Style::new(green, bg),
            removed: Style::new(red, bg),
            context: Style::new(fg, bg),
            gutter: Style::new(fg_dim, bg),
            diff_selected: Style::new(fg, bg_select),
            thread_open: Style::new(orange, bg).with_attrs(Attr::BOLD),
            thread_resolved: Style::new(fg_dim, bg),
            comment_header: Style::new(orange, bg_panel).with_attrs(Attr::BOLD),
            comment_body: Style::new(fg, bg_panel),
            orphan_header: Style::new(orange, bg).with_attrs(Attr::ITALIC),
            orphan_gap: Style::new(fg_dim, bg).with_attrs(Attr::DIM),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
