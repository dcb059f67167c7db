#![forbid(unsafe_code)]

//! Time-based throttling for high-frequency host notifications.
//!
//! Resize and scroll notifications can arrive far faster than geometry needs
//! to be recomputed. [`Throttle`] lets the first notification through
//! immediately (leading edge), swallows the rest of the burst, and remembers
//! that one was swallowed so the caller can run a single trailing recompute
//! once the interval has elapsed.
//!
//! Time is supplied by the caller as a monotonic offset, which keeps the
//! throttle deterministic under test.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use wayfinder_core::throttle::Throttle;
//!
//! let mut throttle = Throttle::new(Duration::from_millis(100));
//! assert!(throttle.push(Duration::ZERO));                 // leading edge fires
//! assert!(!throttle.push(Duration::from_millis(30)));     // swallowed
//! assert!(!throttle.poll(Duration::from_millis(60)));     // too early
//! assert!(throttle.poll(Duration::from_millis(100)));     // trailing edge fires
//! assert!(!throttle.poll(Duration::from_millis(400)));    // nothing pending
//! ```

use std::time::Duration;

/// Leading-edge throttle with a single trailing fire.
///
/// # Invariants
///
/// 1. Two fires are never closer than `interval` apart.
/// 2. A swallowed notification produces exactly one trailing fire.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Duration>,
    pending: bool,
}

impl Throttle {
    /// Create a throttle that fires at most once per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: false,
        }
    }

    /// The configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a notification at `now`.
    ///
    /// Returns `true` if the caller should act immediately. Otherwise the
    /// notification is remembered and surfaces later through [`poll`](Self::poll).
    pub fn push(&mut self, now: Duration) -> bool {
        if self.ready(now) {
            self.fire(now);
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Returns `true` once when a swallowed notification is due.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.pending && self.ready(now) {
            self.fire(now);
            true
        } else {
            false
        }
    }

    /// Whether a swallowed notification is waiting for its trailing fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.last_fired = None;
        self.pending = false;
    }

    fn ready(&self, now: Duration) -> bool {
        self.last_fired
            .is_none_or(|last| now.saturating_sub(last) >= self.interval)
    }

    fn fire(&mut self, now: Duration) {
        self.last_fired = Some(now);
        self.pending = false;
    }
}
