// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — the heartbeat of the terminal viewer.
//
// This is the module that wires everything together: a background
// thread pumps raw stdin bytes into a channel, the loop decodes them
// into events, the application handles them, paints a cell grid, and
// the diff renderer outputs only what changed to the terminal. One
// loop. One frame per wakeup.
//
// # Drain Before Paint
//
// The loop blocks on the stdin channel with a timeout, and once the
// first chunk arrives it keeps draining the channel with `try_recv`
// until empty. All decoded events are dispatched before a single frame
// is composed. A held-down scroll wheel or key repeat can queue dozens
// of events between frames; coalescing them into one paint keeps the
// viewer glued to the *latest* state instead of animating through a
// backlog of stale intermediate frames.
//
// # SIGWINCH Handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The loop checks this flag each iteration, re-queries
// the size, resizes the grid, and forces a full redraw. A resize is
// never an error — just a new grid.
//
// # Escape Sequence Timeout
//
// A lone ESC byte is ambiguous: it could be the Escape key or the start
// of a CSI sequence. The decoder holds it as "pending." On the next loop
// iteration where no new bytes arrive (timeout fires), pending bytes
// are flushed as literal events. The timeout is short enough that the
// user never notices the lag on Escape.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::grid::CellGrid;
use crate::input::{Decoder, Event};
use crate::render::Renderer;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler simply sets the [`SIGWINCH_RECEIVED`] flag. This is
/// async-signal-safe: writing to an atomic is one of the few operations
/// permitted inside signal handlers.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    // No-op on non-unix platforms.
}

// ─── Stdin Pump ──────────────────────────────────────────────────────────────
//
// `read()` on stdin blocks, and the loop must stay responsive for
// rendering, resize handling, and the escape timeout. A background
// thread reads stdin and forwards chunks over a channel; the loop uses
// `recv_timeout` and can still drain everything the terminal buffered
// before composing a frame.

/// Chunk size for stdin reads. A keypress is a handful of bytes; a
/// fast scroll burst is a few hundred. One page absorbs either.
const STDIN_CHUNK: usize = 4096;

/// Poll interval for the pump thread's stop check (milliseconds).
/// Bounds shutdown latency — imperceptible at 50ms.
const STDIN_POLL_MS: i32 = 50;

/// Handle to the background stdin thread.
///
/// The thread polls stdin between reads so it can notice the shutdown
/// flag without being stuck in a blocking `read()`.
/// [`shutdown`](Self::shutdown) flips the flag and joins; drop does
/// the same.
struct StdinPump {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StdinPump {
    /// Start the pump thread.
    ///
    /// Returns the handle and the receiving end of the byte channel.
    /// The channel closes when the pump is shut down or stdin hits EOF.
    fn start() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("revu-stdin".into())
            .spawn(move || pump_stdin(&tx, &flag))?;

        Ok((
            Self {
                stop,
                thread: Some(thread),
            },
            rx,
        ))
    }

    /// Signal the thread to exit and wait for it. Idempotent.
    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for StdinPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The pump thread body: poll, read, forward. Exits on the stop flag,
/// EOF, a read error, or a dropped receiver.
#[cfg(unix)]
fn pump_stdin(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut chunk = [0u8; STDIN_CHUNK];

    while !stop.load(Ordering::Relaxed) {
        if !stdin_readable(fd) {
            continue;
        }
        let n = unsafe { libc::read(fd, chunk.as_mut_ptr().cast(), chunk.len()) };
        let Ok(n) = usize::try_from(n) else {
            break; // read error
        };
        if n == 0 {
            break; // EOF
        }
        if tx.send(chunk[..n].to_vec()).is_err() {
            break; // nobody listening
        }
    }
}

/// One bounded `poll()` on stdin, so the pump loop can check its stop
/// flag between waits.
#[cfg(unix)]
fn stdin_readable(fd: i32) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    unsafe { libc::poll(&raw mut pfd, 1, STDIN_POLL_MS) > 0 }
}

/// Non-unix fallback: plain blocking reads. Shutdown is less graceful
/// (the thread may sit in `read()` until the next byte), but works.
#[cfg(not(unix))]
fn pump_stdin(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let mut chunk = [0u8; STDIN_CHUNK];
    while !stop.load(Ordering::Relaxed) {
        match io::stdin().lock().read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(chunk[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Implement this trait to create a terminal application. The event loop
/// calls your methods in this order each wakeup:
///
/// 1. [`on_event`](App::on_event) — for each decoded input event
/// 2. [`on_resize`](App::on_resize) — when the terminal size changes
/// 3. [`on_tick`](App::on_tick) — every loop iteration
/// 4. [`paint`](App::paint) — when state changed and a frame is due
///
/// Only [`paint`](App::paint) is required. Everything else has default
/// no-op implementations. The hardware cursor stays hidden for the whole
/// session — the viewer has no text insertion point to show.
pub trait App {
    /// Handle a decoded input event (key or mouse).
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_event(&mut self, _event: &Event) -> Action {
        Action::Continue
    }

    /// Handle terminal resize.
    ///
    /// Called with the new terminal dimensions. The cell grid has
    /// already been resized before this is called.
    fn on_resize(&mut self, _size: Size) {}

    /// Called every loop iteration, even when no input arrived.
    ///
    /// Use this for time-based state. Return `true` if state changed
    /// and a repaint is needed.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Paint the current application state to the cell grid.
    ///
    /// Called only when a frame is due (input arrived, resize happened,
    /// or `on_tick` returned `true`). The grid has been cleared before
    /// this call — paint everything you want visible.
    fn paint(&mut self, grid: &mut CellGrid);
}

// ─── Frame Loop Config ───────────────────────────────────────────────────────

/// Configuration for the event loop timing.
///
/// The default wakes 60 times per second when idle, which doubles as
/// the escape sequence timeout. A read-only viewer has no animations,
/// so anything in the tens of milliseconds is fine here.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Timeout for the channel `recv_timeout` call (microseconds).
    ///
    /// This controls both the idle wakeup rate and the escape sequence
    /// timeout. Default: 16667μs (60 Hz).
    pub tick_interval_us: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 16_667, // 60 Hz
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, decoder, and renderer. Call [`run`](Self::run)
/// to enter the loop — it returns when the application signals
/// [`Action::Quit`].
///
/// # Example
///
/// ```no_run
/// use rv_term::event_loop::{Action, App, EventLoop};
/// use rv_term::grid::CellGrid;
/// use rv_term::input::{Event, KeyCode, KeyEvent};
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_event(&mut self, event: &Event) -> Action {
///         if let Event::Key(KeyEvent { code: KeyCode::Char('q'), .. }) = event {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, grid: &mut CellGrid) {
///         // Paint your UI here...
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    decoder: Decoder,
    renderer: Renderer,
    config: LoopConfig,
}

impl EventLoop {
    /// Create a new event loop with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Create a new event loop with custom timing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            decoder: Decoder::new(),
            renderer: Renderer::new(),
            config,
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// This method:
    /// 1. Enters TUI mode (raw mode, alternate screen, wrap off, mouse)
    /// 2. Installs the SIGWINCH handler
    /// 3. Starts the background stdin pump
    /// 4. Runs the drain-then-paint loop
    /// 5. Restores the terminal on exit (even on error)
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave, the stdin thread, or
    /// rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        // Terminal teardown must run even if the pump or loop fails.
        let result = match StdinPump::start() {
            Ok((mut pump, rx)) => {
                let outcome = self.run_inner(app, &rx);
                pump.shutdown();
                outcome
            }
            Err(err) => Err(err),
        };

        self.terminal.leave()?;
        result
    }

    /// The inner loop, separated so cleanup runs regardless of outcome.
    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = CellGrid::new(size.cols, size.rows);
        let mut dirty = true; // First frame always renders.
        let timeout = Duration::from_micros(self.config.tick_interval_us);

        loop {
            // ── Receive stdin bytes, then drain the channel ──────
            // Everything the terminal has buffered is decoded and
            // dispatched before one frame is composed.
            match rx.recv_timeout(timeout) {
                Ok(first) => {
                    let mut bytes = first;
                    loop {
                        match rx.try_recv() {
                            Ok(more) => bytes.extend_from_slice(&more),
                            Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                        }
                    }

                    let events = self.decoder.feed(&bytes);
                    for event in &events {
                        if app.on_event(event) == Action::Quit {
                            return Ok(());
                        }
                    }
                    if !events.is_empty() {
                        dirty = true;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Flush pending escape sequences (lone ESC → Escape key).
                    if self.decoder.pending() {
                        let events = self.decoder.flush();
                        for event in &events {
                            if app.on_event(event) == Action::Quit {
                                return Ok(());
                            }
                        }
                        if !events.is_empty() {
                            dirty = true;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Pump thread exited (EOF) — exit gracefully.
                    return Ok(());
                }
            }

            // ── Check for terminal resize ────────────────────────
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
                dirty = true;
            }

            // ── Tick (time-based state) ──────────────────────────
            if app.on_tick() {
                dirty = true;
            }

            // ── Render if dirty ──────────────────────────────────
            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;
                dirty = false;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
