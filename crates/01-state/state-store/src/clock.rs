use std::cell::Cell;
use std::rc::Rc;

/// Wall-clock source in whole epoch seconds.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now_epoch_seconds(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_epoch_seconds(&self) -> u64 {
        (**self).now_epoch_seconds()
    }
}

/// Manually advanced clock shared between a store and its test.
///
/// Clones observe the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn at(now: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.set(self.now.get().saturating_add(seconds));
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, now: u64) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.now.get()
    }
}
