// SPDX-License-Identifier: MIT
//
// revu — a terminal interface for browsing code reviews.
//
// This is the binary that wires together the two crates:
//
//   rv-term   → terminal control, cell-grid diffing, input, event loop
//   rv-review → diff parsing, thread anchoring, viewport, store trait
//
// The Viewer struct implements rv-term's App trait, connecting the
// event loop to the application state. Each keypress flows through:
//
//   stdin → decoder → on_event → viewport/screen mutation
//   paint → view composer → cell grid → diff renderer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ header bar                   │  ← 1 row
//   ├──────────────────────────────┤
//   │ review list / diff stream    │  ← h - 2 rows (viewport)
//   ├──────────────────────────────┤
//   │ status line / messages       │  ← 1 row
//   └──────────────────────────────┘

use std::env;
use std::fs::File;
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use rv_term::event_loop::EventLoop;

mod app;
mod config;
mod demo;
mod theme;
mod view;

use app::{Filter, Viewer};
use config::Config;
use demo::{demo_drift, DemoStore};
use theme::Theme;

// ─── CLI ─────────────────────────────────────────────────────────────────────

const USAGE: &str = "\
Usage: revu [OPTIONS]

Options:
  --review <ID>   Open a review directly
  --thread <ID>   Open the review containing a thread and focus it
  --theme <NAME>  Select a built-in theme (dark, light)
  --help          Show this help
  --version       Show the version
";

/// Parsed command-line flags.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    review: Option<String>,
    thread: Option<String>,
    theme: Option<String>,
}

/// Hand-rolled flag parsing — three value flags don't warrant a parser
/// dependency.
fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = argv.iter();

    while let Some(arg) = iter.next() {
        let target = match arg.as_str() {
            "--review" => &mut args.review,
            "--thread" => &mut args.thread,
            "--theme" => &mut args.theme,
            other => return Err(format!("unknown option: {other}")),
        };
        match iter.next() {
            Some(value) => *target = Some(value.clone()),
            None => return Err(format!("{arg} requires a value")),
        }
    }

    Ok(args)
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// Route tracing output to the file named by `REVU_LOG`.
///
/// Never stderr: once the alternate screen is up, stray writes to the
/// terminal corrupt the display. No `REVU_LOG` means no logging.
fn init_logging() {
    let Ok(path) = env::var("REVU_LOG") else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        // Pre-TUI, stderr is still safe.
        eprintln!("revu: cannot open log file {path}");
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let argv: Vec<String> = env::args().skip(1).collect();

    if argv.iter().any(|a| a == "--help" || a == "-h") {
        print!("{USAGE}");
        return Ok(());
    }
    if argv.iter().any(|a| a == "--version") {
        println!("revu {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("revu: {msg}");
            eprint!("{USAGE}");
            process::exit(2);
        }
    };

    init_logging();

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("config unusable, using defaults: {err:#}");
        Config::default()
    });

    let theme_name = args.theme.as_deref().unwrap_or(&config.theme);
    let Some(theme) = Theme::by_name(theme_name) else {
        eprintln!(
            "revu: unknown theme '{theme_name}' (available: {})",
            Theme::names().join(", ")
        );
        process::exit(2);
    };

    let mut viewer = Viewer::new(
        DemoStore::new(),
        theme,
        Filter::from_name(&config.list_filter),
        config.expand_comments,
        demo_drift,
    );

    // Deep links: a thread link implies its review; a review link opens
    // the detail screen. Unknown IDs fall back to the list with a notice.
    if let Some(thread_id) = &args.thread {
        viewer.focus_thread(thread_id);
    } else if let Some(review_id) = &args.review {
        viewer.open_review(review_id);
    }

    tracing::info!(theme = theme_name, "starting");

    let mut event_loop = EventLoop::new().context("initializing terminal")?;
    event_loop.run(&mut viewer).context("event loop failed")?;

    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
