//! Monotonic time source
//!
//! The link never blocks without a deadline. Every wait (frame completion,
//! module response) is measured against this clock.

/// Millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed epoch. Must never go backwards.
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `since`
    fn elapsed_ms(&self, since: u64) -> u64 {
        self.now_ms().saturating_sub(since)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
