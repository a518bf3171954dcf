#![forbid(unsafe_code)]

//! End-to-end: present, resize, navigate, dismiss through the reference host.

use bottomsheet::{
    BackdropConfig, HeightBounds, SheetConfig, SheetEvent, SheetState, TransitionTimings,
};
use bottomsheet_core::{Insets, Rgba, Size};
use bottomsheet_harness::{RootScreen, init_test_logging, log_jsonl, settle};

const PHONE: Size = Size::new(390.0, 844.0);

fn content_height(root: &RootScreen) -> Option<f64> {
    root.presenter().content_size().map(|s| s.height)
}

#[test]
fn resize_round_trip_ignores_invalid_height() {
    init_test_logging();
    let root = RootScreen::new(PHONE);
    let screen = root.show_sheet(300.0, true).expect("present");
    settle(root.presenter());
    assert_eq!(content_height(&root), Some(300.0));

    screen.update_content_height(600.0);
    settle(root.presenter());
    assert_eq!(content_height(&root), Some(600.0));
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 620.0 })
    );

    screen.update_content_height(-50.0);
    settle(root.presenter());
    let passed = content_height(&root) == Some(600.0);
    log_jsonl(
        "resize_round_trip_ignores_invalid_height",
        "negative height ignored",
        passed,
        "",
    );
    assert!(passed);
    assert!(root.presenter().take_events().contains(&SheetEvent::ResizeIgnored {
        requested: -50.0,
        reason: bottomsheet::IgnoreReason::OutOfBounds,
    }));
}

#[test]
fn bounds_are_half_open() {
    init_test_logging();
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    );
    let screen = root.show_sheet(300.0, false).expect("present");

    for (requested, expected) in [
        (199.0, 300.0),
        (200.0, 200.0),
        (4999.0, 4999.0),
        (5000.0, 4999.0),
        (f64::INFINITY, 4999.0),
    ] {
        screen.update_content_height(requested);
        assert_eq!(
            content_height(&root),
            Some(expected),
            "after requesting {requested}"
        );
    }
}

#[test]
fn demo_controls_double_halve_and_step() {
    init_test_logging();
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    );
    let screen = root.show_sheet(300.0, false).expect("present");

    screen.double();
    assert_eq!(content_height(&root), Some(600.0));
    screen.grow();
    assert_eq!(content_height(&root), Some(700.0));
    screen.halve();
    assert_eq!(content_height(&root), Some(350.0));
    screen.shrink();
    assert_eq!(content_height(&root), Some(250.0));
    // 150 is below the minimum: the request is recorded, the sheet stays.
    screen.shrink();
    assert_eq!(screen.requested_height(), 150.0);
    assert_eq!(content_height(&root), Some(250.0));
}

#[test]
fn sheet_is_bottom_aligned_and_capped() {
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    );
    root.set_safe_area(Insets::vertical(47.0, 34.0));
    let screen = root.show_sheet(300.0, false).expect("present");

    let frame = root.presenter().frame_of_presented_view().expect("frame");
    assert_eq!(frame.bottom(), PHONE.height);
    assert_eq!(frame.width, PHONE.width);
    assert_eq!(frame.height, 20.0 + 300.0 + 34.0);

    // Content far taller than the screen: the sheet stops below the top inset.
    screen.update_content_height(3000.0);
    let frame = root.presenter().frame_of_presented_view().expect("frame");
    assert_eq!(frame.y, 47.0 + 44.0);
    assert_eq!(content_height(&root), Some(3000.0));
}

#[test]
fn animated_resize_interpolates_height() {
    let root = RootScreen::new(PHONE);
    let screen = root.show_sheet(300.0, false).expect("present");
    screen.update_content_height(500.0);
    assert!(matches!(
        root.presenter().state(),
        Some(SheetState::Resizing { from, to }) if from == 320.0 && to == 520.0
    ));
    root.presenter().advance(std::time::Duration::from_millis(100));
    let mid = root
        .presenter()
        .frame_of_presented_view()
        .expect("frame")
        .height;
    assert!(mid > 320.0 && mid < 520.0, "mid = {mid}");
    let frames = settle(root.presenter());
    assert!(frames > 0);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 520.0 })
    );
}

#[test]
fn navigation_push_and_pop_resize_the_sheet() {
    init_test_logging();
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    );
    root.show_sheet(300.0, false).expect("present");

    let next = root.show_next(450.0).expect("sheet is up");
    assert_eq!(content_height(&root), Some(450.0));
    next.double();
    assert_eq!(content_height(&root), Some(900.0));

    root.show_next(250.0).expect("sheet is up");
    assert_eq!(content_height(&root), Some(250.0));
    assert_eq!(root.sheet().map(|s| s.depth()), Some(3));

    assert_eq!(root.show_root(), 2);
    assert_eq!(content_height(&root), Some(300.0));
    assert_eq!(root.show_root(), 0);
}

#[test]
fn backdrop_color_tracks_config() {
    let config = SheetConfig::default()
        .timings(TransitionTimings::instant())
        .backdrop(BackdropConfig::new(Rgba::rgb(10, 20, 30), 0.5));
    let root = RootScreen::with_config(PHONE, config);
    root.show_sheet(300.0, false).expect("present");
    let color = root.presenter().backdrop_color().expect("color");
    assert_eq!((color.r, color.g, color.b, color.a), (10, 20, 30, 128));
}

#[test]
fn custom_bounds_apply() {
    let config = SheetConfig::default()
        .timings(TransitionTimings::instant())
        .content_height_bounds(HeightBounds::new(100.0, 400.0));
    let root = RootScreen::with_config(PHONE, config);
    let screen = root.show_sheet(300.0, false).expect("present");
    screen.update_content_height(150.0);
    assert_eq!(content_height(&root), Some(150.0));
    screen.update_content_height(400.0);
    assert_eq!(content_height(&root), Some(150.0));
}

#[test]
fn rotation_relayouts_sheet() {
    let root = RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    );
    root.show_sheet(600.0, false).expect("present");
    root.presenter()
        .set_container_size(Size::new(PHONE.height, PHONE.width));
    let frame = root.presenter().frame_of_presented_view().expect("frame");
    assert_eq!(frame.height, PHONE.width - 44.0);
    assert_eq!(frame.bottom(), PHONE.width);
    assert_eq!(frame.width, PHONE.height);
}
