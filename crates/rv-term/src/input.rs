// SPDX-License-Identifier: MIT
//
// Terminal input decoding.
//
// Turns raw stdin bytes into the events the viewer actually binds:
// printable characters, Enter/Escape/Backspace, arrows, Home/End,
// PageUp/PageDown, and SGR mouse clicks and scrolls. The terminal can
// send far more than that — function keys, editing keys, focus and
// paste protocols — and all of it is consumed and dropped here rather
// than surfaced as variants nothing listens to.
//
// Decoding is a scan over a small internal buffer, because a sequence
// can arrive split across `read()` calls. Each step either emits an
// event and consumes bytes, drops bytes it recognizes but does not
// want, or stops because the tail might still complete. A lone ESC is
// the ambiguous case: it sits in the buffer until [`Decoder::flush`]
// resolves it to an Escape keypress after the caller's timeout.

use bitflags::bitflags;

// ─── Events ──────────────────────────────────────────────────────────────────

/// A decoded terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),
    /// A mouse event (button action or scroll with position).
    Mouse(MouseEvent),
}

/// A keyboard event with key identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

/// Identity of a key.
///
/// Only the keys the viewer binds get variants. Control bytes decode
/// as `Char` with [`Modifiers::CTRL`] — Tab arrives as Ctrl+I, which
/// is exactly what it is on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    Enter,
    Escape,
    Backspace,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags, matching the xterm CSI encoding
    /// (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

/// A mouse event with button/scroll action, position, and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened (press, release, scroll).
    pub kind: MouseEventKind,
    /// 0-indexed column.
    pub x: u16,
    /// 0-indexed row.
    pub y: u16,
    /// Active modifier keys during the mouse event.
    pub modifiers: Modifiers,
}

/// Mouse event classification.
///
/// Only click and scroll tracking are enabled in `terminal.rs`, so
/// drag and motion reports never arrive and have no variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Button pressed.
    Press(MouseButton),
    /// Button released.
    Release(MouseButton),
    /// Scroll wheel up.
    ScrollUp,
    /// Scroll wheel down.
    ScrollDown,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Incremental input decoder.
///
/// Feed raw bytes with [`feed`](Decoder::feed) and collect events.
/// Incomplete sequences stay buffered across calls; after a quiet
/// timeout, [`flush`](Decoder::flush) resolves a pending lone ESC to
/// a real Escape keypress.
pub struct Decoder {
    buf: Vec<u8>,
}

/// One decoding step over the buffered bytes.
enum Step {
    /// An event, and how many bytes it consumed.
    Emit(Event, usize),
    /// The tail might complete with more input — stop here.
    Need,
    /// Recognized but unwanted bytes — consume silently.
    Discard(usize),
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw stdin bytes and return every event that decodes.
    ///
    /// Bytes forming an incomplete sequence remain buffered and are
    /// retried on the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        let mut used = 0;

        while used < self.buf.len() {
            match decode_one(&self.buf[used..]) {
                Step::Emit(event, n) => {
                    events.push(event);
                    used += n;
                }
                Step::Discard(n) => used += n,
                Step::Need => break,
            }
        }

        self.buf.drain(..used);
        events
    }

    /// Are there buffered bytes waiting on more input?
    #[must_use]
    pub fn pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve buffered bytes after a quiet timeout.
    ///
    /// A leading ESC becomes an Escape keypress; whatever follows is
    /// decoded normally, and anything still incomplete is discarded.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.buf.first() == Some(&0x1B) {
            self.buf.remove(0);
            events.push(key(KeyCode::Escape, Modifiers::empty()));
            events.extend(self.feed(&[]));
        }
        self.buf.clear();
        events
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Decoding steps ──────────────────────────────────────────────────────────
//
// Each function reads from the front of its slice and reports how far
// it got. None of them touch decoder state.

fn decode_one(bytes: &[u8]) -> Step {
    match bytes[0] {
        0x1B => decode_esc(bytes),
        0x0A | 0x0D => Step::Emit(key(KeyCode::Enter, Modifiers::empty()), 1),
        0x7F => Step::Emit(key(KeyCode::Backspace, Modifiers::empty()), 1),
        // Control bytes are Ctrl+letter on the wire (0x03 = Ctrl+C).
        b @ 0x01..=0x1A => Step::Emit(
            key(KeyCode::Char((b'a' + b - 1) as char), Modifiers::CTRL),
            1,
        ),
        b @ 0x20..=0x7E => Step::Emit(key(KeyCode::Char(b as char), Modifiers::empty()), 1),
        b if b >= 0x80 => decode_utf8(bytes),
        // NUL and the unassigned C0 gap.
        _ => Step::Discard(1),
    }
}

fn decode_esc(bytes: &[u8]) -> Step {
    let Some(&next) = bytes.get(1) else {
        // Lone ESC: Escape key or sequence start — flush() decides.
        return Step::Need;
    };

    match next {
        b'[' => decode_csi(bytes),
        b'O' => decode_ss3(bytes),
        // Alt chord: swallow as Alt+char so "ESC then j" from a real
        // Alt+J press doesn't fire Escape and a cursor move.
        b @ 0x20..=0x7E => Step::Emit(
            key(KeyCode::Char(b as char), Modifiers::ALT),
            2,
        ),
        // Anything else: surface the Escape, reconsider the next byte.
        _ => Step::Emit(key(KeyCode::Escape, Modifiers::empty()), 1),
    }
}

/// CSI sequences: `ESC [ params final`.
///
/// Parameter bytes are `0x30..=0x3F`, intermediates `0x20..=0x2F`, and
/// the final byte is `0x40..=0x7E`. Finals we don't bind (function
/// keys, editing keys) are consumed whole and dropped.
fn decode_csi(bytes: &[u8]) -> Step {
    if bytes.len() < 3 {
        return Step::Need;
    }
    if bytes[2] == b'<' {
        return decode_sgr_mouse(bytes);
    }

    let mut i = 2;
    loop {
        let Some(&b) = bytes.get(i) else {
            return Step::Need;
        };
        match b {
            0x40..=0x7E => break,
            0x20..=0x3F => i += 1,
            // Not a CSI byte at all — the sequence is garbage.
            _ => return Step::Discard(i + 1),
        }
    }

    let used = i + 1;
    let params = &bytes[2..i];
    let modifiers = csi_modifiers(params);

    let code = match bytes[i] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'~' => match leading_number(params) {
            1 | 7 => KeyCode::Home,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            // Insert, Delete, F5-F20 — nothing binds them.
            _ => return Step::Discard(used),
        },
        // F1-F4 letter finals, Shift+Tab, DA responses, the rest.
        _ => return Step::Discard(used),
    };

    Step::Emit(key(code, modifiers), used)
}

/// SS3 sequences: `ESC O final`. Some terminals use these for arrows
/// and Home/End in application mode; F1-F4 arrive here too and drop.
fn decode_ss3(bytes: &[u8]) -> Step {
    let Some(&b) = bytes.get(2) else {
        return Step::Need;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Step::Discard(3),
    };
    Step::Emit(key(code, Modifiers::empty()), 3)
}

/// SGR mouse reports: `ESC [ < flags ; col ; row M` (press/scroll) or
/// the same with a trailing `m` (release). Coordinates are 1-indexed
/// on the wire, 0-indexed in the event.
fn decode_sgr_mouse(bytes: &[u8]) -> Step {
    let mut i = 3;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b';') {
        i += 1;
    }
    let Some(&fin) = bytes.get(i) else {
        return Step::Need;
    };
    let used = i + 1;
    if fin != b'M' && fin != b'm' {
        return Step::Discard(used);
    }

    let mut fields = bytes[3..i].split(|&b| b == b';').map(ascii_number);
    let flags = fields.next().unwrap_or(0);
    let x = fields.next().unwrap_or(0).saturating_sub(1);
    let y = fields.next().unwrap_or(0).saturating_sub(1);

    // Motion tracking is never enabled; a terminal that reports it
    // anyway must not be misread as a click.
    if flags & 32 != 0 {
        return Step::Discard(used);
    }

    let mut modifiers = Modifiers::empty();
    if flags & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if flags & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if flags & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let kind = if flags & 64 != 0 {
        match flags & 3 {
            0 => MouseEventKind::ScrollUp,
            1 => MouseEventKind::ScrollDown,
            _ => return Step::Discard(used),
        }
    } else {
        let button = match flags & 3 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => return Step::Discard(used),
        };
        if fin == b'm' {
            MouseEventKind::Release(button)
        } else {
            MouseEventKind::Press(button)
        }
    };

    Step::Emit(Event::Mouse(MouseEvent { kind, x, y, modifiers }), used)
}

/// Multi-byte UTF-8: the lead byte's run of high ones is the total
/// length. Stray continuation bytes and invalid leads drop one byte
/// so the scan resynchronizes on the next character.
fn decode_utf8(bytes: &[u8]) -> Step {
    let want = match bytes[0].leading_ones() {
        2 => 2,
        3 => 3,
        4 => 4,
        _ => return Step::Discard(1),
    };
    if bytes.len() < want {
        return Step::Need;
    }
    match std::str::from_utf8(&bytes[..want]) {
        Ok(s) => s.chars().next().map_or(Step::Discard(want), |ch| {
            Step::Emit(key(KeyCode::Char(ch), Modifiers::empty()), want)
        }),
        Err(_) => Step::Discard(1),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn key(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// The second CSI parameter carries modifiers as `1 + bitmask`
/// (`1;5C` is Ctrl+Right). Absent or zero means none.
fn csi_modifiers(params: &[u8]) -> Modifiers {
    let mut fields = params.split(|&b| b == b';');
    fields.next();
    fields.next().map_or(Modifiers::empty(), |field| {
        let bits = u8::try_from(ascii_number(field).saturating_sub(1)).unwrap_or(u8::MAX);
        Modifiers::from_bits_truncate(bits)
    })
}

/// The first CSI parameter, for tilde-terminated sequences.
fn leading_number(params: &[u8]) -> u16 {
    params.split(|&b| b == b';').next().map_or(0, ascii_number)
}

/// Decimal value of a digit run, saturating. Stops at the first
/// non-digit; an empty or non-numeric field is 0.
fn ascii_number(field: &[u8]) -> u16 {
    field
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |acc, b| {
            acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
        })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: decode bytes in one feed.
    fn decode(data: &[u8]) -> Vec<Event> {
        Decoder::new().feed(data)
    }

    /// Helper: decode bytes, expect exactly one event.
    fn one(data: &[u8]) -> Event {
        let events = decode(data);
        assert_eq!(events.len(), 1, "expected 1 event, got {events:?}");
        events[0]
    }

    fn plain(code: KeyCode) -> Event {
        key(code, Modifiers::empty())
    }

    // ── Printable & control bytes ──────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(one(b"a"), plain(KeyCode::Char('a')));
        assert_eq!(one(b" "), plain(KeyCode::Char(' ')));
        let events = decode(b"jkq");
        assert_eq!(
            events,
            vec![
                plain(KeyCode::Char('j')),
                plain(KeyCode::Char('k')),
                plain(KeyCode::Char('q')),
            ]
        );
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(one(b"\x03"), key(KeyCode::Char('c'), Modifiers::CTRL));
        assert_eq!(one(b"\x15"), key(KeyCode::Char('u'), Modifiers::CTRL));
    }

    #[test]
    fn tab_is_ctrl_i_on_the_wire() {
        assert_eq!(one(b"\x09"), key(KeyCode::Char('i'), Modifiers::CTRL));
    }

    #[test]
    fn enter_both_encodings() {
        assert_eq!(one(b"\r"), plain(KeyCode::Enter));
        assert_eq!(one(b"\n"), plain(KeyCode::Enter));
    }

    #[test]
    fn del_byte_is_backspace() {
        assert_eq!(one(b"\x7F"), plain(KeyCode::Backspace));
    }

    #[test]
    fn nul_byte_is_dropped() {
        let events = decode(b"\x00a");
        assert_eq!(events, vec![plain(KeyCode::Char('a'))]);
    }

    // ── Arrows & navigation ────────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(one(b"\x1b[A"), plain(KeyCode::Up));
        assert_eq!(one(b"\x1b[B"), plain(KeyCode::Down));
        assert_eq!(one(b"\x1b[C"), plain(KeyCode::Right));
        assert_eq!(one(b"\x1b[D"), plain(KeyCode::Left));
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(one(b"\x1b[1;2A"), key(KeyCode::Up, Modifiers::SHIFT));
        assert_eq!(one(b"\x1b[1;5B"), key(KeyCode::Down, Modifiers::CTRL));
        assert_eq!(
            one(b"\x1b[1;4D"),
            key(KeyCode::Left, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    #[test]
    fn home_end_all_encodings() {
        assert_eq!(one(b"\x1b[H"), plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[F"), plain(KeyCode::End));
        assert_eq!(one(b"\x1b[1~"), plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[7~"), plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[4~"), plain(KeyCode::End));
        assert_eq!(one(b"\x1b[8~"), plain(KeyCode::End));
    }

    #[test]
    fn page_up_down() {
        assert_eq!(one(b"\x1b[5~"), plain(KeyCode::PageUp));
        assert_eq!(one(b"\x1b[6~"), plain(KeyCode::PageDown));
    }

    #[test]
    fn ss3_arrows_and_home_end() {
        assert_eq!(one(b"\x1bOA"), plain(KeyCode::Up));
        assert_eq!(one(b"\x1bOB"), plain(KeyCode::Down));
        assert_eq!(one(b"\x1bOH"), plain(KeyCode::Home));
        assert_eq!(one(b"\x1bOF"), plain(KeyCode::End));
    }

    // ── Unbound sequences drop without confusing the stream ───────────

    #[test]
    fn function_keys_are_dropped() {
        // SS3 F1-F4 and tilde-encoded F5/F12.
        assert!(decode(b"\x1bOP").is_empty());
        assert!(decode(b"\x1b[15~").is_empty());
        assert!(decode(b"\x1b[24~").is_empty());
        // A key after a dropped sequence still decodes.
        assert_eq!(decode(b"\x1b[15~q"), vec![plain(KeyCode::Char('q'))]);
    }

    #[test]
    fn editing_keys_are_dropped() {
        assert!(decode(b"\x1b[2~").is_empty()); // Insert
        assert!(decode(b"\x1b[3~").is_empty()); // Delete
    }

    #[test]
    fn unknown_csi_final_is_dropped() {
        assert_eq!(decode(b"\x1b[5Xa"), vec![plain(KeyCode::Char('a'))]);
    }

    // ── Alt chords ─────────────────────────────────────────────────────

    #[test]
    fn alt_char() {
        assert_eq!(one(b"\x1bn"), key(KeyCode::Char('n'), Modifiers::ALT));
    }

    // ── ESC disambiguation ─────────────────────────────────────────────

    #[test]
    fn lone_esc_stays_pending() {
        let mut decoder = Decoder::new();
        assert!(decoder.feed(b"\x1b").is_empty());
        assert!(decoder.pending());
    }

    #[test]
    fn flush_resolves_pending_esc() {
        let mut decoder = Decoder::new();
        decoder.feed(b"\x1b");
        assert_eq!(decoder.flush(), vec![plain(KeyCode::Escape)]);
        assert!(!decoder.pending());
    }

    #[test]
    fn flush_on_empty_buffer_is_quiet() {
        assert!(Decoder::new().flush().is_empty());
    }

    #[test]
    fn partial_csi_resumes_across_feeds() {
        let mut decoder = Decoder::new();
        assert!(decoder.feed(b"\x1b[1;").is_empty());
        assert_eq!(
            decoder.feed(b"5C"),
            vec![key(KeyCode::Right, Modifiers::CTRL)]
        );
    }

    // ── SGR mouse ──────────────────────────────────────────────────────

    #[test]
    fn mouse_press_and_release() {
        assert_eq!(
            one(b"\x1b[<0;10;20M"),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Press(MouseButton::Left),
                x: 9,
                y: 19,
                modifiers: Modifiers::empty(),
            })
        );
        assert_eq!(
            one(b"\x1b[<0;10;20m"),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Release(MouseButton::Left),
                x: 9,
                y: 19,
                modifiers: Modifiers::empty(),
            })
        );
    }

    #[test]
    fn mouse_middle_and_right() {
        let Event::Mouse(m) = one(b"\x1b[<1;5;5M") else {
            panic!("expected mouse event");
        };
        assert_eq!(m.kind, MouseEventKind::Press(MouseButton::Middle));
        let Event::Mouse(m) = one(b"\x1b[<2;1;1M") else {
            panic!("expected mouse event");
        };
        assert_eq!(m.kind, MouseEventKind::Press(MouseButton::Right));
        assert_eq!((m.x, m.y), (0, 0));
    }

    #[test]
    fn mouse_scroll() {
        let Event::Mouse(up) = one(b"\x1b[<64;10;20M") else {
            panic!("expected mouse event");
        };
        assert_eq!(up.kind, MouseEventKind::ScrollUp);
        let Event::Mouse(down) = one(b"\x1b[<65;10;20M") else {
            panic!("expected mouse event");
        };
        assert_eq!(down.kind, MouseEventKind::ScrollDown);
    }

    #[test]
    fn mouse_motion_reports_are_dropped() {
        // Drag = motion bit (32) + button. Motion tracking is never
        // enabled; a terminal that sends it anyway must not click.
        assert!(decode(b"\x1b[<32;15;25M").is_empty());
        assert!(decode(b"\x1b[<35;15;25M").is_empty());
    }

    #[test]
    fn mouse_modifiers() {
        let Event::Mouse(m) = one(b"\x1b[<4;10;10M") else {
            panic!("expected mouse event");
        };
        assert_eq!(m.modifiers, Modifiers::SHIFT);
        let Event::Mouse(m) = one(b"\x1b[<16;10;10M") else {
            panic!("expected mouse event");
        };
        assert_eq!(m.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn mouse_large_coordinates() {
        // SGR supports coordinates beyond the X10 limit of 223.
        let Event::Mouse(m) = one(b"\x1b[<0;300;150M") else {
            panic!("expected mouse event");
        };
        assert_eq!((m.x, m.y), (299, 149));
    }

    #[test]
    fn partial_mouse_resumes() {
        let mut decoder = Decoder::new();
        assert!(decoder.feed(b"\x1b[<0;10").is_empty());
        assert_eq!(decoder.feed(b";20M").len(), 1);
    }

    // ── UTF-8 ──────────────────────────────────────────────────────────

    #[test]
    fn utf8_two_three_four_byte() {
        assert_eq!(one("é".as_bytes()), plain(KeyCode::Char('é')));
        assert_eq!(one("中".as_bytes()), plain(KeyCode::Char('中')));
        assert_eq!(one("🦀".as_bytes()), plain(KeyCode::Char('🦀')));
    }

    #[test]
    fn utf8_split_across_feeds() {
        let bytes = "中".as_bytes();
        let mut decoder = Decoder::new();
        assert!(decoder.feed(&bytes[..1]).is_empty());
        assert!(decoder.pending());
        assert_eq!(decoder.feed(&bytes[1..]), vec![plain(KeyCode::Char('中'))]);
    }

    #[test]
    fn stray_continuation_byte_resyncs() {
        assert_eq!(decode(b"\x80a"), vec![plain(KeyCode::Char('a'))]);
    }

    // ── Mixed streams ──────────────────────────────────────────────────

    #[test]
    fn keys_and_sequences_interleave() {
        let events = decode(b"j\x1b[Bq");
        assert_eq!(
            events,
            vec![
                plain(KeyCode::Char('j')),
                plain(KeyCode::Down),
                plain(KeyCode::Char('q')),
            ]
        );
    }

    #[test]
    fn burst_of_scroll_reports() {
        let mut data = Vec::new();
        for _ in 0..5 {
            data.extend_from_slice(b"\x1b[<65;10;20M");
        }
        let events = decode(&data);
        assert_eq!(events.len(), 5);
        for event in events {
            let Event::Mouse(m) = event else {
                panic!("expected mouse event");
            };
            assert_eq!(m.kind, MouseEventKind::ScrollDown);
        }
    }
}
