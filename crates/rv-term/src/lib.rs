// SPDX-License-Identifier: MIT
//
// rv-term — Terminal rendering engine for revu.
//
// A wrap-safe, differential terminal backend. Frames are composed into
// a cell grid, diffed against the previous frame, and emitted as the
// smallest span set worth sending — whole unchanged rows cost one slice
// compare, and auto-wrap stays disabled for the entire session so the
// writer's believed cursor position is never a guess.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for. Every frame is diffed. Every escape code is earned.

pub mod ansi;
pub mod cell;
pub mod color;
pub mod event_loop;
pub mod grid;
pub mod input;
pub mod output;
pub mod render;
pub mod terminal;

pub use cell::{Attr, Cell, Style};
pub use color::CellColor;
pub use event_loop::{Action, App, EventLoop, LoopConfig};
pub use grid::CellGrid;
pub use input::{Event, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use render::{RenderStats, Renderer};
pub use terminal::{Size, Terminal};
