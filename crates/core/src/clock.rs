//! Time sources for the engine
//!
//! The engine never reads the system time directly. Live games use
//! [`SystemClock`]; replays and tests use [`VirtualClock`], whose handles
//! share one counter so a driver can move time while the engine owns a clone.
//!
//! Timestamps are `u32` milliseconds and wrap like the deadline arithmetic
//! that consumes them.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic millisecond clock
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        self.origin.elapsed().as_millis() as u32
    }
}

/// Manually driven clock
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<u32>>,
}

impl VirtualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
