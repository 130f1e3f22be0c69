//! Flush trigger policy shared by both handler variants.
//!
//! A buffer asks the policy after every append whether the batch must be
//! published now. The policy fires when the buffer has reached capacity or
//! when the event is at least as severe as the flush level.

use crate::level::{Level, SharedLevel};

/// Decides whether an append requires an immediate flush.
#[derive(Clone, Debug)]
pub struct FlushPolicy {
    capacity: usize,
    flush_level: SharedLevel,
}

impl FlushPolicy {
    /// `capacity` is clamped to at least one event.
    pub fn new(capacity: usize, flush_level: SharedLevel) -> Self {
        Self {
            capacity: capacity.max(1),
            flush_level,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn flush_level(&self) -> Level {
        self.flush_level.get()
    }

    /// Replace the flush level. Clones of this policy observe the change.
    pub fn set_flush_level(&self, level: Level) {
        self.flush_level.set(level);
    }

    /// `buffered` is the buffer length including the event just appended.
    pub fn should_flush(&self, level: Level, buffered: usize) -> bool {
        buffered >= self.capacity || level >= self.flush_level.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(capacity: usize) -> FlushPolicy {
        FlushPolicy::new(capacity, SharedLevel::new(Level::Critical))
    }

    #[rstest]
    #[case(2, Level::Info, 1, false)]
    #[case(2, Level::Info, 2, true)]
    #[case(2, Level::Error, 1, false)]
    #[case(2, Level::Critical, 1, true)]
    #[case(1000, Level::Critical, 0, true)]
    #[case(3, Level::Debug, 5, true)]
    fn flush_decisions(
        #[case] capacity: usize,
        #[case] level: Level,
        #[case] buffered: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(policy(capacity).should_flush(level, buffered), expected);
    }

    #[test]
    fn lowered_flush_level_forces_flush() {
        let policy = policy(10);
        assert!(!policy.should_flush(Level::Info, 1));
        policy.set_flush_level(Level::Info);
        assert!(policy.should_flush(Level::Info, 1));
        assert!(!policy.should_flush(Level::Debug, 1));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(policy(0).capacity(), 1);
    }
}
