//! Touch gesture recognizer
//!
//! Classifies one touch sequence at a time into a tap, a double tap, or a
//! vertical drag on a fixed axis:
//!
//! ```text
//!   Idle ──touch-start──▶ Armed ──|Δy| > threshold──▶ Locked(axis)
//!    ▲                      │                            │
//!    └──────touch-end───────┴────────touch-end───────────┘
//! ```
//!
//! Tap handling runs beside the phase machine: a touch-start arms a
//! provisional single tap that toggles the overlay when its window expires,
//! unless a second touch-start inside the window upgrades it to a double tap.
//! The drag axis comes from the side of the container the sequence started
//! on and never changes afterwards.

use crate::{
    config::{PlayerConfig, MAX_BRIGHTNESS, MIN_BRIGHTNESS},
    timer::{earliest, Timer},
    types::{Axis, Point, Viewport},
};
use std::time::{Duration, Instant};
use tracing::debug;

/// Normalized requests produced by touch input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureIntent {
    TogglePlay,
    ToggleControls,
    SetVolume(f64),
    SetBrightness(f64),
}

/// Current values a drag is anchored to when its axis locks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub volume: f64,
    pub brightness: f64,
}

/// Phase of the current touch sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    /// Finger down, axis not yet decided
    Armed { origin: Point, axis: Axis },
    /// Vertical travel passed the threshold; `anchor` is the value at lock time
    Locked { origin: Point, axis: Axis, anchor: f64 },
}

/// Which indicator badges are visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Indicators {
    pub volume: bool,
    pub brightness: bool,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    double_tap_window: Duration,
    drag_threshold: f64,
    indicator_linger: Duration,
    phase: GesturePhase,
    last_tap: Option<Instant>,
    pending_tap: Timer,
    linger: Timer,
    indicators: Indicators,
}

impl GestureRecognizer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            double_tap_window: config.double_tap_window(),
            drag_threshold: config.drag_threshold_px,
            indicator_linger: config.indicator_linger(),
            phase: GesturePhase::Idle,
            last_tap: None,
            pending_tap: Timer::new(),
            linger: Timer::new(),
            indicators: Indicators::default(),
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// A provisional single tap is waiting for its window to close
    pub fn is_tap_pending(&self) -> bool {
        self.pending_tap.is_armed()
    }

    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    /// Start a touch sequence at `at` inside `viewport`
    pub fn touch_start(&mut self, at: Point, viewport: Viewport, now: Instant) -> Option<GestureIntent> {
        let axis = if at.x > viewport.midpoint_x() {
            Axis::Volume
        } else {
            Axis::Brightness
        };
        self.phase = GesturePhase::Armed { origin: at, axis };

        let is_double_tap = self
            .last_tap
            .is_some_and(|last| now.saturating_duration_since(last) < self.double_tap_window);

        if is_double_tap {
            self.pending_tap.cancel();
            self.last_tap = None;
            debug!("Double tap");
            Some(GestureIntent::TogglePlay)
        } else {
            self.last_tap = Some(now);
            self.pending_tap.arm(now, self.double_tap_window);
            None
        }
    }

    /// Track movement; returns the new value once the drag has locked
    pub fn touch_move(&mut self, at: Point, viewport: Viewport, ctx: GestureContext) -> Option<GestureIntent> {
        let (origin, axis, anchor) = match self.phase {
            GesturePhase::Idle => return None,
            GesturePhase::Armed { origin, axis } => {
                if (at.y - origin.y).abs() <= self.drag_threshold {
                    return None;
                }
                let anchor = match axis {
                    Axis::Volume => ctx.volume,
                    Axis::Brightness => ctx.brightness,
                };
                self.phase = GesturePhase::Locked { origin, axis, anchor };
                match axis {
                    Axis::Volume => self.indicators.volume = true,
                    Axis::Brightness => self.indicators.brightness = true,
                }
                debug!(?axis, anchor, "Drag axis locked");
                (origin, axis, anchor)
            }
            GesturePhase::Locked { origin, axis, anchor } => (origin, axis, anchor),
        };

        if viewport.height <= 0.0 {
            return None;
        }

        let delta = -(at.y - origin.y) / viewport.height;
        Some(match axis {
            Axis::Volume => GestureIntent::SetVolume((anchor + delta).clamp(0.0, 1.0)),
            Axis::Brightness => GestureIntent::SetBrightness(
                (anchor + delta * 100.0).clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS),
            ),
        })
    }

    /// End the sequence; indicators linger, then hide
    pub fn touch_end(&mut self, now: Instant) {
        self.phase = GesturePhase::Idle;
        self.linger.arm(now, self.indicator_linger);
    }

    /// Fire expired timers
    pub fn poll(&mut self, now: Instant) -> Option<GestureIntent> {
        if self.linger.fire(now) {
            self.indicators = Indicators::default();
        }
        if self.pending_tap.fire(now) {
            debug!("Single tap");
            return Some(GestureIntent::ToggleControls);
        }
        None
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.pending_tap.deadline(), self.linger.deadline()])
    }

    /// Cancel every timer and forget the current sequence
    pub fn cancel(&mut self) {
        self.phase = GesturePhase::Idle;
        self.last_tap = None;
        self.pending_tap.cancel();
        self.linger.cancel();
        self.indicators = Indicators::default();
    }
}
