#![forbid(unsafe_code)]

//! Test harness and reference fixtures for bottomsheet.
//!
//! - [`fixtures`]: a presenting screen ([`RootScreen`]) that is both the
//!   controller factory and the dismissal handler, and a resizable content
//!   screen ([`ResizeScreen`]) with the classic x2 / ÷2 / ±100 controls
//! - [`script`]: scripted pan and pointer sequences
//! - [`logging`]: tracing subscriber setup and JSONL check records
//!
//! The [`settle`] helper advances a presenter frame by frame until every
//! animation has finished.

pub mod fixtures;
pub mod logging;
pub mod script;

use std::time::Duration;

use bottomsheet::Presenter;

pub use fixtures::{DismissMode, ResizeScreen, RootScreen};
pub use logging::{init_test_logging, log_jsonl};
pub use script::{PanScript, PointerScript};

/// One 60 Hz frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on frames [`settle`] will run before giving up.
pub const MAX_SETTLE_FRAMES: usize = 1_000;

/// Advance `presenter` one [`FRAME`] at a time until nothing animates.
///
/// Returns the number of frames advanced.
pub fn settle(presenter: &Presenter) -> usize {
    let mut frames = 0;
    while frames < MAX_SETTLE_FRAMES && presenter.advance(FRAME) {
        frames += 1;
    }
    if frames == MAX_SETTLE_FRAMES {
        tracing::warn!(frames, "presenter did not settle");
    }
    frames
}
