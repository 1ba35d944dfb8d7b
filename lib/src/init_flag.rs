//! One-shot initialization latch.
//!
//! An [`InitFlag`] starts clear and can be set exactly once. Subsystems use
//! it to publish "my setup ran" to other CPUs; readers pair an `Acquire`
//! load with the setter's `Release` store, so any data written before
//! [`InitFlag::mark_set`] is visible to anyone observing the flag.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct InitFlag {
    set: AtomicBool,
}

impl InitFlag {
    #[inline]
    pub const fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
        }
    }

    /// Set the flag. Returns `true` for the caller that actually performed
    /// the transition, `false` if the flag was already set.
    #[inline]
    pub fn init_once(&self) -> bool {
        self.set
            .compare_exchange(false, true, Ordering::Release, Ordering::Relaxed)
            .is_ok()
    }

    /// Set the flag unconditionally.
    #[inline]
    pub fn mark_set(&self) {
        self.set.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }
}

impl Default for InitFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_caller_wins() {
        let flag = InitFlag::new();
        assert!(!flag.is_set());
        assert!(flag.init_once());
        assert!(!flag.init_once());
        assert!(flag.is_set());
    }
}
