//! Single-shot deadlines owned by one component
//!
//! Timers hold no callbacks and no threads. The owner arms them, polls them
//! with the current instant, and cancels them on supersession or teardown,
//! so a timer can never fire against state it does not own.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) to expire `after` from `now`
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Disarm; returns true if the timer was pending
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return true if the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines
pub fn earliest<I>(deadlines: I) -> Option<Instant>
where
    I: IntoIterator<Item = Option<Instant>>,
{
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_once() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.arm(start, Duration::from_millis(300));

        assert!(!timer.fire(start + Duration::from_millis(299)));
        assert!(timer.fire(start + Duration::from_millis(300)));
        assert!(!timer.fire(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_rearm_supersedes() {
        let start = Instant::now();
        let mut timer = Timer::new();
        timer.arm(start, Duration::from_secs(3));
        timer.arm(start + Duration::from_secs(2), Duration::from_secs(3));

        assert!(!timer.fire(start + Duration::from_secs(3)));
        assert!(timer.fire(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = Timer::new();
        assert!(!timer.cancel());
        timer.arm(start, Duration::from_secs(1));
        assert!(timer.cancel());
        assert!(!timer.fire(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_earliest() {
        let start = Instant::now();
        let later = start + Duration::from_secs(1);
        assert_eq!(earliest([None, Some(later), Some(start)]), Some(start));
        assert_eq!(earliest([None, None]), None);
    }
}
