#![forbid(unsafe_code)]

//! Dismissal authority: who decides, how often they are asked, and what is
//! released afterwards.

use std::cell::Cell;
use std::rc::Rc;

use bottomsheet::{
    DismissTriggers, DismissalHandler, SheetConfig, SheetEvent, SheetState, TransitionTimings,
};
use bottomsheet_core::{Point, Size};
use bottomsheet_harness::{DismissMode, PanScript, RootScreen, init_test_logging, settle};

const PHONE: Size = Size::new(390.0, 844.0);

fn instant_root() -> Rc<RootScreen> {
    RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    )
}

#[test]
fn swipe_down_asks_handler_exactly_once() {
    init_test_logging();
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    let delegate = root.delegate_handle().expect("delegate installed");

    PanScript::drag(250.0).play(root.presenter());

    assert_eq!(root.dismissal_calls(), 1);
    assert!(!root.presenter().is_presenting());
    assert!(!root.has_delegate());
    assert_eq!(root.delegate_releases(), 1);
    assert!(delegate.upgrade().is_none(), "delegate must be freed");
}

#[test]
fn perform_dismissal_after_removal_is_harmless() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(250.0).play(root.presenter());
    assert!(!root.presenter().is_presenting());

    root.perform_dismissal(true);
    root.perform_dismissal(false);
    assert_eq!(root.dismissal_calls(), 3);
    assert_eq!(root.delegate_releases(), 1);
    assert!(!root.presenter().is_presenting());
}

#[test]
fn fast_flick_dismisses_from_short_drag() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(40.0)
        .release_velocity(1800.0)
        .play(root.presenter());
    assert_eq!(root.dismissal_calls(), 1);
    assert!(!root.presenter().is_presenting());
}

#[test]
fn short_drag_snaps_back_without_asking() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(60.0).play(root.presenter());
    assert_eq!(root.dismissal_calls(), 0);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 320.0 })
    );
}

#[test]
fn reversed_drag_snaps_back() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(300.0)
        .then_to(250.0)
        .release_velocity(-400.0)
        .play(root.presenter());
    assert_eq!(root.dismissal_calls(), 0);
    assert!(root.presenter().is_presenting());
}

#[test]
fn refusing_handler_keeps_sheet() {
    init_test_logging();
    let root = instant_root();
    root.set_allow_dismissal(false);
    root.show_sheet(300.0, false).expect("present");
    root.presenter().take_events();

    PanScript::drag(300.0).play(root.presenter());

    assert_eq!(root.dismissal_calls(), 0);
    assert!(root.has_delegate());
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 320.0 })
    );
    assert_eq!(
        root.presenter().take_events(),
        vec![SheetEvent::DismissalCancelled, SheetEvent::SnappedBack]
    );
}

#[test]
fn handler_that_ignores_request_sees_snap_back() {
    let root = instant_root();
    root.set_dismiss_mode(DismissMode::Ignore);
    root.show_sheet(300.0, false).expect("present");

    PanScript::drag(300.0).play(root.presenter());

    assert_eq!(root.dismissal_calls(), 1);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 320.0 })
    );

    // The next swipe is a new logical dismissal and asks again.
    root.set_dismiss_mode(DismissMode::Immediate);
    PanScript::drag(300.0).play(root.presenter());
    assert_eq!(root.dismissal_calls(), 2);
    assert!(!root.presenter().is_presenting());
}

#[test]
fn deferred_handler_completes_dismissal() {
    let root = instant_root();
    root.set_dismiss_mode(DismissMode::Deferred);
    root.show_sheet(300.0, false).expect("present");

    PanScript::drag(300.0).play(root.presenter());

    assert_eq!(root.dismissal_calls(), 1);
    assert!(!root.presenter().is_presenting());
    assert!(
        !root
            .presenter()
            .take_events()
            .contains(&SheetEvent::DismissalCancelled)
    );
}

#[test]
fn animated_dismissal_slides_out() {
    let root = RootScreen::new(PHONE);
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(200.0).play(root.presenter());

    assert_eq!(root.dismissal_calls(), 1);
    assert_eq!(root.presenter().state(), Some(SheetState::Dismissing));
    let before = root.presenter().frame_of_presented_view().expect("frame").y;
    root.presenter().advance(std::time::Duration::from_millis(50));
    let after = root.presenter().frame_of_presented_view().expect("frame").y;
    assert!(after > before);

    // Drags while sliding out are ignored.
    PanScript::drag(-100.0).play(root.presenter());
    assert_eq!(root.presenter().state(), Some(SheetState::Dismissing));

    settle(root.presenter());
    assert!(!root.presenter().is_presenting());
    assert_eq!(root.dismissal_calls(), 1);
}

#[test]
fn repeated_dismiss_is_a_noop() {
    let root = RootScreen::new(PHONE);
    root.show_sheet(300.0, false).expect("present");
    let completions = Rc::new(Cell::new(0));

    let c = Rc::clone(&completions);
    assert!(
        root.presenter()
            .dismiss(true, Some(Box::new(move || c.set(c.get() + 1))))
    );
    let c = Rc::clone(&completions);
    assert!(
        !root
            .presenter()
            .dismiss(true, Some(Box::new(move || c.set(c.get() + 1))))
    );
    assert_eq!(completions.get(), 0);

    settle(root.presenter());
    assert_eq!(completions.get(), 2);
    assert!(!root.presenter().dismiss(false, None));
    let dismissal_events = root
        .presenter()
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, SheetEvent::DismissalStarted { .. }))
        .count();
    assert_eq!(dismissal_events, 1);
}

#[test]
fn backdrop_tap_dismisses() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");

    // A tap on the sheet itself does nothing.
    assert!(!root.presenter().handle_tap(Point::new(100.0, 700.0)));
    assert_eq!(root.dismissal_calls(), 0);

    assert!(root.presenter().handle_tap(Point::new(100.0, 100.0)));
    assert_eq!(root.dismissal_calls(), 1);
    assert!(!root.presenter().is_presenting());
}

#[test]
fn backdrop_tap_can_be_disabled() {
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default()
            .timings(TransitionTimings::instant())
            .dismiss_triggers(DismissTriggers::SWIPE_DOWN),
    );
    root.show_sheet(300.0, false).expect("present");
    assert!(!root.presenter().tap_backdrop());
    assert_eq!(root.dismissal_calls(), 0);

    PanScript::drag(300.0).play(root.presenter());
    assert_eq!(root.dismissal_calls(), 1);
}

#[test]
fn swipe_can_be_disabled() {
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default()
            .timings(TransitionTimings::instant())
            .dismiss_triggers(DismissTriggers::BACKDROP_TAP),
    );
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(300.0)
        .release_velocity(5000.0)
        .play(root.presenter());
    assert_eq!(root.dismissal_calls(), 0);
    assert!(root.presenter().is_presenting());
}

#[test]
fn dropped_host_cannot_dismiss() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    let presenter = root.presenter().clone();
    let weak = Rc::downgrade(&root);
    drop(root);
    assert!(weak.upgrade().is_none(), "presenter must not keep the host alive");

    PanScript::drag(300.0).play(&presenter);
    assert_eq!(
        presenter.state(),
        Some(SheetState::Presented { height: 320.0 })
    );
}

#[test]
fn sheet_can_be_presented_again_after_dismissal() {
    let root = instant_root();
    root.show_sheet(300.0, false).expect("present");
    PanScript::drag(300.0).play(root.presenter());
    assert!(!root.presenter().is_presenting());

    let screen = root.show_sheet(450.0, false).expect("present again");
    assert!(root.has_delegate());
    screen.double();
    assert_eq!(
        root.presenter().content_size().map(|s| s.height),
        Some(900.0)
    );
}
