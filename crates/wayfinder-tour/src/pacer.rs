#![forbid(unsafe_code)]

//! Pacing for the short, awaited pauses inside step actions and transitions.
//!
//! Actions such as the click affordance or the navigation dim need the UI to
//! breathe for a moment before the next effect. Those pauses go through a
//! [`Pacer`] so that production code can really wait while tests and headless
//! hosts can account for the time without sleeping.

use std::time::Duration;

/// Suspends the caller for a requested duration.
pub trait Pacer {
    fn pause(&mut self, duration: Duration);
}

/// Pacer that blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Pacer that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

impl Pacer for NoopPacer {
    fn pause(&mut self, _duration: Duration) {}
}
