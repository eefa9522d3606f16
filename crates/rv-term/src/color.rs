// SPDX-License-Identifier: MIT
//
// CellColor — the fully resolved color stored in a Cell.
//
// The rendering pipeline deals only in resolved colors: either a truecolor
// RGB triple, an indexed 256-palette entry, or the terminal's configured
// default. Theme resolution (named palettes, fallbacks) happens upstream in
// the application; by the time a color reaches a cell there is nothing left
// to decide, which keeps frame diffing a plain equality check.

// ─── CellColor ───────────────────────────────────────────────────────────────

/// A resolved terminal color, 4 bytes, `Copy`.
///
/// `Default` means "whatever the terminal's own foreground/background is" —
/// it renders as SGR 39/49 and is distinct from any concrete color.
///
/// ```
/// use rv_term::color::CellColor;
///
/// let c = CellColor::Rgb(0x28, 0x2c, 0x34);
/// assert!(!c.is_default());
/// assert!(CellColor::Default.is_default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// Truecolor (24-bit). Emitted as SGR 38;2;r;g;b / 48;2;r;g;b.
    Rgb(u8, u8, u8),
    /// Indexed color from the 256-color palette.
    Ansi256(u8),
    /// The terminal's configured default foreground or background.
    #[default]
    Default,
}

impl CellColor {
    /// Whether this is the terminal default (no explicit color).
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse a `#rrggbb` or `#rgb` hex string.
    ///
    /// Returns `None` for anything else; callers fall back to `Default`.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::Rgb(r, g, b))
            }
            3 => {
                let d = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
                let (r, g, b) = (d(0)?, d(1)?, d(2)?);
                // 0xF -> 0xFF, 0xA -> 0xAA: replicate the nibble.
                Some(Self::Rgb(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cell_color_is_4_bytes() {
        assert_eq!(std::mem::size_of::<CellColor>(), 4);
    }

    #[test]
    fn default_is_default() {
        assert!(CellColor::Default.is_default());
        assert!(!CellColor::Rgb(0, 0, 0).is_default());
        assert!(!CellColor::Ansi256(0).is_default());
    }

    // ── Hex parsing ──────────────────────────────────────────────────────

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(
            CellColor::from_hex("#282c34"),
            Some(CellColor::Rgb(0x28, 0x2c, 0x34))
        );
    }

    #[test]
    fn parses_three_digit_hex() {
        assert_eq!(CellColor::from_hex("#fff"), Some(CellColor::Rgb(255, 255, 255)));
        assert_eq!(CellColor::from_hex("#a0c"), Some(CellColor::Rgb(0xaa, 0x00, 0xcc)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(CellColor::from_hex("282c34"), None); // missing '#'
        assert_eq!(CellColor::from_hex("#28"), None);
        assert_eq!(CellColor::from_hex("#zzzzzz"), None);
        assert_eq!(CellColor::from_hex(""), None);
    }
}
