//! Time source for claims evaluation

/// Source of the current time, in whole seconds since the Unix epoch
///
/// The validator reads time through this trait so the claims window can be
/// tested at exact boundaries.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time as Unix epoch seconds
    fn now_epoch_secs(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock frozen at a fixed instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}
