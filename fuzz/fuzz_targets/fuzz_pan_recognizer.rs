#![no_main]

//! Raw pointer streams through the pan recognizer.
//!
//! Every `Began` must be closed by exactly one `Ended` or `Cancelled` before
//! the next `Began`, and reported velocities must be finite.

use std::time::Duration;

use bottomsheet_core::{Gesture, PanPhase, PanRecognizer, Point, PointerEvent};
use libfuzzer_sys::fuzz_target;
use web_time::Instant;

fuzz_target!(|data: &[u8]| {
    let start = Instant::now();
    let mut elapsed = Duration::ZERO;
    let mut recognizer = PanRecognizer::new();
    let mut open = false;

    for chunk in data.chunks_exact(4).take(1024) {
        elapsed += Duration::from_millis(u64::from(chunk[1] % 64));
        let at = start + elapsed;
        let position = Point::new(f64::from(chunk[2]) * 4.0, f64::from(chunk[3]) * 4.0);
        let event = match chunk[0] % 4 {
            0 => PointerEvent::Down { position, at },
            1 => PointerEvent::Move { position, at },
            2 => PointerEvent::Up { position, at },
            _ => PointerEvent::Cancel,
        };
        let Some(Gesture::Pan(pan)) = recognizer.handle(event) else {
            continue;
        };
        assert!(pan.velocity.x.is_finite() && pan.velocity.y.is_finite());
        match pan.phase {
            PanPhase::Began => {
                assert!(!open, "pan began twice");
                open = true;
            }
            PanPhase::Changed => assert!(open, "change outside a pan"),
            PanPhase::Ended | PanPhase::Cancelled => {
                assert!(open, "pan closed twice");
                open = false;
            }
        }
    }
});
