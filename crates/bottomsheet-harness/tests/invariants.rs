#![forbid(unsafe_code)]

//! Property tests over random interaction sequences.

use std::rc::Rc;
use std::time::Duration;

use bottomsheet::{HeightBounds, SheetConfig, SheetState, TransitionTimings};
use bottomsheet_core::{Point, Size};
use bottomsheet_harness::{PanScript, ResizeScreen, RootScreen};
use proptest::prelude::*;

const PHONE: Size = Size::new(390.0, 844.0);

#[derive(Debug, Clone)]
enum Op {
    Drag {
        distance: f64,
        back_to: f64,
        velocity: f64,
        cancelled: bool,
    },
    Request(f64),
    Advance(u64),
    Tap(f64),
    Rotate,
    Refuse(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-300.0f64..900.0, -300.0f64..900.0, -3000.0f64..3000.0, any::<bool>()).prop_map(
            |(distance, back_to, velocity, cancelled)| Op::Drag {
                distance,
                back_to,
                velocity,
                cancelled,
            }
        ),
        (-1000.0f64..6000.0).prop_map(Op::Request),
        (0u64..400).prop_map(Op::Advance),
        (0.0f64..844.0).prop_map(Op::Tap),
        Just(Op::Rotate),
        any::<bool>().prop_map(Op::Refuse),
    ]
}

fn apply(root: &RootScreen, screen: &ResizeScreen, op: &Op) {
    let presenter = root.presenter();
    match *op {
        Op::Drag {
            distance,
            back_to,
            velocity,
            cancelled,
        } => {
            let mut script = PanScript::drag(distance)
                .then_to(back_to)
                .release_velocity(velocity);
            if cancelled {
                script = script.cancelled();
            }
            script.play(presenter);
        }
        Op::Request(h) => screen.update_content_height(h),
        Op::Advance(ms) => {
            presenter.advance(Duration::from_millis(ms));
        }
        Op::Tap(y) => {
            presenter.handle_tap(Point::new(10.0, y));
        }
        Op::Rotate => {
            let size = presenter.container_size();
            presenter.set_container_size(Size::new(size.height, size.width));
        }
        Op::Refuse(refuse) => root.set_allow_dismissal(!refuse),
    }
}

fn check_geometry(root: &RootScreen) -> Result<(), TestCaseError> {
    let Some((offset, height, content, animating)) = root.presenter().with_controller(|c| {
        (
            c.offset(),
            c.sheet_height(),
            c.content_size().height,
            c.is_animating(),
        )
    }) else {
        return Ok(());
    };
    prop_assert!(offset >= -1e-9, "offset {offset} above rest");
    prop_assert!(offset <= height + 1e-9, "offset {offset} past height {height}");
    prop_assert!(
        HeightBounds::default().contains(content),
        "content height {content} escaped bounds"
    );
    if !animating {
        let container = root.presenter().container_size();
        prop_assert!(height <= container.height - 44.0 + 1e-9);
    }
    Ok(())
}

proptest! {
    #[test]
    fn random_interaction_keeps_sheet_consistent(
        animated in any::<bool>(),
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let config = if animated {
            SheetConfig::default()
        } else {
            SheetConfig::default().timings(TransitionTimings::instant())
        };
        let root = RootScreen::with_config(PHONE, config);
        let mut presentations = 0u32;
        let mut screen = root.show_sheet(300.0, animated).expect("present");
        presentations += 1;

        for op in &ops {
            apply(&root, &screen, op);
            check_geometry(&root)?;
            // One logical dismissal asks the handler at most once.
            prop_assert!(root.dismissal_calls() <= presentations);
            if !root.presenter().is_presenting() {
                prop_assert!(!root.has_delegate());
                screen = root.show_sheet(300.0, animated).expect("present again");
                presentations += 1;
            }
        }
    }

    #[test]
    fn resize_is_applied_exactly_when_in_bounds(
        requests in prop::collection::vec(-1000.0f64..6000.0, 1..30),
    ) {
        let root = RootScreen::with_config(
            PHONE,
            SheetConfig::default().timings(TransitionTimings::instant()),
        );
        let screen = root.show_sheet(300.0, false).expect("present");
        for h in requests {
            let before = root.presenter().content_size().map(|s| s.height);
            screen.update_content_height(h);
            let after = root.presenter().content_size().map(|s| s.height);
            if HeightBounds::default().contains(h) {
                prop_assert_eq!(after, Some(h));
            } else {
                prop_assert_eq!(after, before);
            }
            prop_assert!(matches!(
                root.presenter().state(),
                Some(SheetState::Presented { .. })
            ), "sheet is no longer presented");
        }
    }

    #[test]
    fn dismissal_releases_host_resources(distance in 160.0f64..900.0) {
        let root = RootScreen::with_config(
            PHONE,
            SheetConfig::default().timings(TransitionTimings::instant()),
        );
        root.show_sheet(300.0, false).expect("present");
        let delegate = root.delegate_handle().expect("delegate");
        PanScript::drag(distance).play(root.presenter());
        prop_assert_eq!(root.dismissal_calls(), 1);
        prop_assert!(delegate.upgrade().is_none());
        prop_assert!(root.sheet().is_none());
        let weak = Rc::downgrade(&root);
        drop(root);
        prop_assert!(weak.upgrade().is_none());
    }
}
