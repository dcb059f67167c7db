#![forbid(unsafe_code)]

//! Core: geometry and throttling primitives for the wayfinder tour engine.
//!
//! # Role in wayfinder
//! `wayfinder-core` holds the small, dependency-free building blocks that the
//! tour engine (`wayfinder-tour`) is written against: host-coordinate
//! rectangles for anchors and viewports, and a time-based [`Throttle`] used to
//! rate-limit geometry recomputation on resize and scroll.
//!
//! [`Throttle`]: throttle::Throttle

pub mod geometry;
pub mod throttle;

pub use geometry::{Rect, Size};
pub use throttle::Throttle;
