// SPDX-License-Identifier: MIT
//
// rv-review — review domain for revu.
//
// The non-visual half of the viewer: unified diff parsing with strict
// old/new line counters, the drift/thread-anchoring engine that maps
// historical comment threads onto a live diff without old-side line
// collisions, pure viewport windowing, and the read-only store
// interface the binary implements. No terminal code lives here; these
// modules produce data the view composer turns into cell grids.

pub mod anchor;
pub mod parse;
pub mod store;
pub mod viewport;

pub use anchor::{anchor_threads, context_ranges, AnchorOutcome, AnchoredThread, DriftResult};
pub use parse::{exclusion_ranges, parse, FileDiff, Hunk, HunkLine, LineKind, ParseError};
pub use store::{
    Comment, ReviewDetail, ReviewStatus, ReviewStore, ReviewSummary, StoreError, ThreadRecord,
    ThreadStatus,
};
pub use viewport::{Move, Viewport};
