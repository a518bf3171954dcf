#![forbid(unsafe_code)]

//! A drag over scrollable sheet content moves the content first, then the
//! sheet; an upward drag returns the sheet before scrolling.

use std::rc::Rc;

use bottomsheet::{SheetConfig, SheetState, TransitionTimings};
use bottomsheet_core::{PanEvent, PanPhase, Size};
use bottomsheet_harness::{ResizeScreen, RootScreen, init_test_logging, log_jsonl};

const PHONE: Size = Size::new(390.0, 844.0);

fn root() -> Rc<RootScreen> {
    RootScreen::with_config(
        PHONE,
        SheetConfig::default().timings(TransitionTimings::instant()),
    )
}

fn sheet_offset(root: &RootScreen) -> f64 {
    root.presenter()
        .with_controller(|c| c.offset())
        .expect("sheet is up")
}

fn pan(root: &RootScreen, phase: PanPhase, translation: f64, velocity: f64) {
    root.presenter()
        .handle_pan(PanEvent::vertical(phase, translation, velocity));
}

#[test]
fn content_scrolls_to_top_before_sheet_moves() {
    init_test_logging();
    let root = root();
    let screen = ResizeScreen::scrolling(1200.0, 2000.0);
    root.present_screen(screen.clone(), false).expect("present");
    let scroll = screen.scroll().expect("scrolling screen");
    assert_eq!(scroll.viewport_height(), 780.0);
    scroll.set_offset(100.0);

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 60.0, 0.0);
    assert_eq!(scroll.offset(), 40.0);
    assert_eq!(sheet_offset(&root), 0.0);

    pan(&root, PanPhase::Changed, 100.0, 0.0);
    assert_eq!(scroll.offset(), 0.0);
    assert_eq!(sheet_offset(&root), 0.0);

    pan(&root, PanPhase::Changed, 130.0, 0.0);
    assert_eq!(sheet_offset(&root), 30.0);
    pan(&root, PanPhase::Changed, 180.0, 0.0);
    let passed = sheet_offset(&root) == 80.0 && scroll.offset() == 0.0;
    log_jsonl(
        "content_scrolls_to_top_before_sheet_moves",
        "sheet follows 1:1 once content is at top",
        passed,
        "",
    );
    assert!(passed);

    pan(&root, PanPhase::Ended, 180.0, 0.0);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 800.0 })
    );
    assert_eq!(root.dismissal_calls(), 0);
}

#[test]
fn fractional_scroll_offset_keeps_sheet_still() {
    let root = root();
    let screen = ResizeScreen::scrolling(1200.0, 2000.0);
    root.present_screen(screen.clone(), false).expect("present");
    let scroll = screen.scroll().expect("scrolling screen");
    scroll.set_offset(0.4);

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 50.0, 0.0);
    assert_eq!(sheet_offset(&root), 0.0);
    assert_eq!(scroll.offset(), 0.0);

    pan(&root, PanPhase::Changed, 70.0, 0.0);
    assert_eq!(sheet_offset(&root), 20.0);
    pan(&root, PanPhase::Cancelled, 0.0, 0.0);
}

#[test]
fn upward_drag_returns_sheet_then_scrolls() {
    let root = root();
    let screen = ResizeScreen::scrolling(1200.0, 2000.0);
    root.present_screen(screen.clone(), false).expect("present");
    let scroll = screen.scroll().expect("scrolling screen");

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 50.0, 0.0);
    assert_eq!(sheet_offset(&root), 50.0);

    pan(&root, PanPhase::Changed, -30.0, 0.0);
    assert_eq!(sheet_offset(&root), 0.0);
    assert_eq!(scroll.offset(), 30.0);

    pan(&root, PanPhase::Ended, -30.0, -200.0);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 800.0 })
    );
}

#[test]
fn flick_absorbed_by_content_never_dismisses() {
    let root = root();
    let screen = ResizeScreen::scrolling(1200.0, 2000.0);
    root.present_screen(screen.clone(), false).expect("present");
    let scroll = screen.scroll().expect("scrolling screen");
    scroll.set_offset(500.0);

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 200.0, 3000.0);
    pan(&root, PanPhase::Ended, 200.0, 3000.0);

    assert_eq!(scroll.offset(), 300.0);
    assert_eq!(root.dismissal_calls(), 0);
    assert!(root.presenter().is_presenting());
}

#[test]
fn short_content_lets_sheet_move_immediately() {
    let root = root();
    let screen = ResizeScreen::scrolling(300.0, 200.0);
    root.present_screen(screen.clone(), false).expect("present");

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 40.0, 0.0);
    assert_eq!(sheet_offset(&root), 40.0);
    pan(&root, PanPhase::Cancelled, 0.0, 0.0);
    assert_eq!(sheet_offset(&root), 0.0);
}

#[test]
fn pushed_screen_scroll_view_is_reconciled() {
    let root = root();
    root.show_sheet(300.0, false).expect("present");
    let next = ResizeScreen::scrolling(900.0, 3000.0);
    root.sheet().expect("sheet is up").push(next.clone());
    let scroll = next.scroll().expect("scrolling screen");
    assert_eq!(scroll.viewport_height(), 780.0);
    scroll.set_offset(200.0);

    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, 100.0, 0.0);
    assert_eq!(scroll.offset(), 100.0);
    assert_eq!(sheet_offset(&root), 0.0);
    pan(&root, PanPhase::Ended, 100.0, 0.0);
}

#[test]
fn same_height_pushed_screen_gets_a_viewport() {
    let root = root();
    root.show_sheet(600.0, false).expect("present");
    let next = ResizeScreen::scrolling(600.0, 3000.0);
    root.sheet().expect("sheet is up").push(next.clone());
    let scroll = next.scroll().expect("scrolling screen");
    assert_eq!(scroll.viewport_height(), 600.0);
    assert_eq!(scroll.max_offset(), 2400.0);

    // Upward drags stop at the end of the content.
    pan(&root, PanPhase::Began, 0.0, 0.0);
    pan(&root, PanPhase::Changed, -3000.0, 0.0);
    assert_eq!(scroll.offset(), 2400.0);
    assert_eq!(sheet_offset(&root), 0.0);
    pan(&root, PanPhase::Ended, -3000.0, 0.0);
    assert_eq!(
        root.presenter().state(),
        Some(SheetState::Presented { height: 620.0 })
    );
}
