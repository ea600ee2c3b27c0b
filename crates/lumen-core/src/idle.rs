//! Pointer idle timer for the control overlay

use crate::timer::Timer;
use std::time::{Duration, Instant};
use tracing::debug;

/// Hides the overlay after a period without pointer movement
#[derive(Debug, Clone)]
pub struct IdleTimer {
    timeout: Duration,
    timer: Timer,
}

impl IdleTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            timer: Timer::new(),
        }
    }

    /// Pointer moved over the container: show the overlay and restart the countdown
    pub fn pointer_moved(&mut self, now: Instant) {
        self.timer.arm(now, self.timeout);
    }

    /// Pointer left the container. Returns true if the overlay should hide.
    pub fn pointer_left(&mut self, menu_open: bool) -> bool {
        self.timer.cancel();
        !menu_open
    }

    /// Returns true if the countdown expired and the overlay should hide
    pub fn poll(&mut self, now: Instant, menu_open: bool) -> bool {
        if !self.timer.fire(now) {
            return false;
        }
        if menu_open {
            debug!("Idle timeout ignored while settings menu is open");
            return false;
        }
        debug!("Pointer idle; hiding controls");
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_hides_after_timeout() {
        let t0 = Instant::now();
        let mut idle = IdleTimer::new(secs(3));
        idle.pointer_moved(t0);

        assert!(!idle.poll(t0 + Duration::from_millis(2999), false));
        assert!(idle.poll(t0 + secs(3), false));
        assert_eq!(idle.deadline(), None);
    }

    #[test]
    fn test_movement_restarts_window() {
        let t0 = Instant::now();
        let mut idle = IdleTimer::new(secs(3));
        idle.pointer_moved(t0);
        idle.pointer_moved(t0 + secs(2));

        assert!(!idle.poll(t0 + secs(3), false));
        assert!(idle.poll(t0 + secs(5), false));
    }

    #[test]
    fn test_menu_guard() {
        let t0 = Instant::now();
        let mut idle = IdleTimer::new(secs(3));
        idle.pointer_moved(t0);

        assert!(!idle.poll(t0 + secs(4), true));
        assert!(!idle.pointer_left(true));
        assert!(idle.pointer_left(false));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut idle = IdleTimer::new(secs(3));
        idle.pointer_moved(t0);
        idle.cancel();
        assert!(!idle.poll(t0 + secs(10), false));
    }
}
