#![no_main]

//! Random interaction sequences against a presented sheet.
//!
//! Checks that no sequence panics and that the sheet offset stays within
//! `[0, height]`.

use std::time::Duration;

use arbitrary::Arbitrary;
use bottomsheet::{SheetConfig, TransitionTimings};
use bottomsheet_core::{PanEvent, PanPhase, Point, Size};
use bottomsheet_harness::{DismissMode, RootScreen};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Pan { phase: u8, translation: i16, velocity: i16 },
    Request(i16),
    Advance(u16),
    Tap { x: u16, y: u16 },
    Resize { width: u16, height: u16 },
    Mode(u8),
    Allow(bool),
    Dismiss(bool),
    ShowNext(i16),
    ShowRoot,
}

#[derive(Debug, Arbitrary)]
struct Input {
    animated: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let config = if input.animated {
        SheetConfig::default()
    } else {
        SheetConfig::default().timings(TransitionTimings::instant())
    };
    let root = RootScreen::with_config(Size::new(390.0, 844.0), config);
    let Ok(mut screen) = root.show_sheet(300.0, input.animated) else {
        return;
    };

    for op in input.ops.iter().take(256) {
        let presenter = root.presenter();
        match *op {
            Op::Pan {
                phase,
                translation,
                velocity,
            } => {
                let phase = match phase % 4 {
                    0 => PanPhase::Began,
                    1 => PanPhase::Changed,
                    2 => PanPhase::Ended,
                    _ => PanPhase::Cancelled,
                };
                presenter.handle_pan(PanEvent::vertical(
                    phase,
                    f64::from(translation),
                    f64::from(velocity),
                ));
            }
            Op::Request(h) => screen.update_content_height(f64::from(h)),
            Op::Advance(ms) => {
                presenter.advance(Duration::from_millis(u64::from(ms)));
            }
            Op::Tap { x, y } => {
                presenter.handle_tap(Point::new(f64::from(x), f64::from(y)));
            }
            Op::Resize { width, height } => {
                presenter.set_container_size(Size::new(f64::from(width), f64::from(height)));
            }
            Op::Mode(m) => root.set_dismiss_mode(match m % 3 {
                0 => DismissMode::Immediate,
                1 => DismissMode::Deferred,
                _ => DismissMode::Ignore,
            }),
            Op::Allow(allow) => root.set_allow_dismissal(allow),
            Op::Dismiss(animated) => {
                presenter.dismiss(animated, None);
            }
            Op::ShowNext(h) => {
                root.show_next(f64::from(h));
            }
            Op::ShowRoot => {
                root.show_root();
            }
        }

        if let Some((offset, height)) = presenter.with_controller(|c| (c.offset(), c.sheet_height()))
        {
            assert!(offset >= -1e-9 && offset <= height + 1e-9, "{offset} / {height}");
        }

        if !presenter.is_presenting() {
            match root.show_sheet(300.0, input.animated) {
                Ok(next) => screen = next,
                Err(_) => return,
            }
        }
    }
});
