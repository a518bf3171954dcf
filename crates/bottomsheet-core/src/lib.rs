#![forbid(unsafe_code)]

//! Core primitives for bottomsheet.
//!
//! This crate provides the host-independent building blocks the presentation
//! controller is assembled from:
//! - [`geometry`]: points, sizes, rects and insets in logical points
//! - [`color`]: backdrop colors
//! - [`reactive`]: [`Observable`] values with RAII [`Subscription`]s
//! - [`animation`]: elapsed-driven interpolation with easing curves
//! - [`gesture`]: pointer samples to pan events (slop + velocity tracking)
//! - [`executor`]: the single-threaded [`MainQueue`] for deferred work
//!
//! Everything here is `Rc`-based and intentionally `!Send`: a sheet and all of
//! its collaborators live on one UI thread.

pub mod animation;
pub mod color;
pub mod executor;
pub mod geometry;
pub mod gesture;
pub mod reactive;

pub use animation::{Animation, Easing};
pub use color::Rgba;
pub use executor::MainQueue;
pub use geometry::{Insets, Point, Rect, Size};
pub use gesture::{Gesture, PanEvent, PanPhase, PanRecognizer, PointerEvent};
pub use reactive::{Observable, Subscription};
