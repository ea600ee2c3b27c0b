//! Playback control state
//!
//! [`PlaybackState`] is the single source of truth the host renders from.
//! Media-driven fields change only through [`PlaybackState::apply`]; UI
//! preferences (brightness, overlay visibility, aspect ratio) change through
//! the clamping setters. Both are crate-private so the controller stays the
//! only writer.

use crate::{
    adapter::MediaUpdate,
    config::{PlayerConfig, MAX_BRIGHTNESS, MIN_BRIGHTNESS},
    error::{MediaErrorKind, MediaFailure},
    types::{AspectRatioMode, PlaybackRate},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What a stalled session returns to once data arrives again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    Ready,
    Playing,
    Paused,
}

/// Explicit playback status; replaces loading/error/playing flag combinations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No source bound yet
    Idle,
    /// Waiting for the engine; `resume` is the mode to return to
    Loading { resume: ResumeMode },
    /// Ready but not playing (includes refused autoplay)
    Ready,
    Playing,
    Paused,
    /// Terminal; only an explicit close moves on
    Error {
        kind: MediaErrorKind,
        code: Option<u16>,
        message: String,
    },
}

impl PlaybackStatus {
    pub fn loading() -> Self {
        PlaybackStatus::Loading {
            resume: ResumeMode::Ready,
        }
    }

    fn from_resume(resume: ResumeMode) -> Self {
        match resume {
            ResumeMode::Ready => PlaybackStatus::Ready,
            ResumeMode::Playing => PlaybackStatus::Playing,
            ResumeMode::Paused => PlaybackStatus::Paused,
        }
    }

    fn from_failure(failure: MediaFailure) -> Self {
        PlaybackStatus::Error {
            kind: failure.kind,
            code: failure.code,
            message: failure.message,
        }
    }
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Loading { .. } => write!(f, "loading"),
            PlaybackStatus::Ready => write!(f, "ready"),
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Error { kind, .. } => write!(f, "error({kind})"),
        }
    }
}

/// The one display mode in effect at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Loading,
    Error,
    Ready,
}

/// Playback state for one mounted player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    status: PlaybackStatus,
    current_time: f64,
    duration: f64,
    volume: f64,
    last_non_zero_volume: f64,
    playback_rate: PlaybackRate,
    aspect_ratio: AspectRatioMode,
    is_fullscreen: bool,
    controls_visible: bool,
    buffered_fraction: f64,
    brightness: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

impl PlaybackState {
    pub fn new(config: &PlayerConfig) -> Self {
        let volume = config.initial_volume.clamp(0.0, 1.0);
        Self {
            status: PlaybackStatus::Idle,
            current_time: 0.0,
            duration: 0.0,
            volume,
            last_non_zero_volume: if volume > 0.0 { volume } else { 1.0 },
            playback_rate: PlaybackRate::try_new(config.initial_playback_rate).unwrap_or_default(),
            aspect_ratio: AspectRatioMode::default(),
            is_fullscreen: false,
            controls_visible: true,
            buffered_fraction: 0.0,
            brightness: config.initial_brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn status(&self) -> &PlaybackStatus {
        &self.status
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Duration in seconds; 0 until metadata is loaded
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn last_non_zero_volume(&self) -> f64 {
        self.last_non_zero_volume
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    pub fn aspect_ratio(&self) -> AspectRatioMode {
        self.aspect_ratio
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    pub fn buffered_fraction(&self) -> f64 {
        self.buffered_fraction
    }

    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.status, PlaybackStatus::Playing)
    }

    /// Playing, or stalled while playing and due to resume
    pub fn is_playing_or_will_resume(&self) -> bool {
        matches!(
            self.status,
            PlaybackStatus::Playing
                | PlaybackStatus::Loading {
                    resume: ResumeMode::Playing
                }
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, PlaybackStatus::Idle | PlaybackStatus::Loading { .. })
    }

    pub fn has_error(&self) -> bool {
        matches!(self.status, PlaybackStatus::Error { .. })
    }

    pub fn error_kind(&self) -> Option<MediaErrorKind> {
        match &self.status {
            PlaybackStatus::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<u16> {
        match &self.status {
            PlaybackStatus::Error { code, .. } => *code,
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            PlaybackStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        match self.status {
            PlaybackStatus::Idle | PlaybackStatus::Loading { .. } => DisplayMode::Loading,
            PlaybackStatus::Error { .. } => DisplayMode::Error,
            PlaybackStatus::Ready | PlaybackStatus::Playing | PlaybackStatus::Paused => {
                DisplayMode::Ready
            }
        }
    }

    /// Playback position as a fraction of duration
    pub fn progress_fraction(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Clamp an absolute target position to `[0, duration]`
    pub fn clamp_time(&self, position: f64) -> f64 {
        position.clamp(0.0, self.duration.max(0.0))
    }

    // ------------------------------------------------------------------
    // Media-driven transitions
    // ------------------------------------------------------------------

    /// Apply one normalized media update. Returns true if anything changed.
    pub(crate) fn apply(&mut self, update: MediaUpdate) -> bool {
        if self.has_error() {
            debug!(update = ?update, "Ignoring media update in terminal error state");
            return false;
        }

        let before = self.clone();
        let next = match (before.status.clone(), update) {
            (_, MediaUpdate::Failed(failure)) => Some(PlaybackStatus::from_failure(failure)),

            (_, MediaUpdate::LoadStarted) => Some(PlaybackStatus::loading()),

            (_, MediaUpdate::MetadataLoaded { duration }) => {
                self.duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                self.current_time = self.clamp_time(self.current_time);
                match self.status {
                    PlaybackStatus::Idle => Some(PlaybackStatus::Ready),
                    PlaybackStatus::Loading { resume } => {
                        Some(PlaybackStatus::from_resume(resume))
                    }
                    _ => None,
                }
            }

            (PlaybackStatus::Idle, MediaUpdate::CanPlay) => Some(PlaybackStatus::Ready),
            (PlaybackStatus::Loading { resume }, MediaUpdate::CanPlay) => {
                Some(PlaybackStatus::from_resume(resume))
            }
            (_, MediaUpdate::CanPlay) => None,

            (PlaybackStatus::Idle | PlaybackStatus::Ready, MediaUpdate::Waiting) => {
                Some(PlaybackStatus::loading())
            }
            (PlaybackStatus::Playing, MediaUpdate::Waiting) => Some(PlaybackStatus::Loading {
                resume: ResumeMode::Playing,
            }),
            (PlaybackStatus::Paused, MediaUpdate::Waiting) => Some(PlaybackStatus::Loading {
                resume: ResumeMode::Paused,
            }),
            (_, MediaUpdate::Waiting) => None,

            (PlaybackStatus::Loading { .. }, MediaUpdate::Playing) => {
                Some(PlaybackStatus::Loading {
                    resume: ResumeMode::Playing,
                })
            }
            (_, MediaUpdate::Playing) | (_, MediaUpdate::PlayStarted) => {
                Some(PlaybackStatus::Playing)
            }

            (PlaybackStatus::Playing, MediaUpdate::Paused) => Some(PlaybackStatus::Paused),
            (PlaybackStatus::Loading { .. }, MediaUpdate::Paused) => {
                Some(PlaybackStatus::Loading {
                    resume: ResumeMode::Paused,
                })
            }
            (_, MediaUpdate::Paused) => None,

            (_, MediaUpdate::TimeUpdate { current_time }) => {
                if current_time.is_finite() {
                    self.current_time = if self.duration > 0.0 {
                        self.clamp_time(current_time)
                    } else {
                        current_time.max(0.0)
                    };
                }
                None
            }

            (_, MediaUpdate::Buffered { end }) => {
                self.buffered_fraction = if self.duration > 0.0 && end.is_finite() {
                    (end / self.duration).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                None
            }

            (PlaybackStatus::Playing | PlaybackStatus::Loading { .. }, MediaUpdate::Ended) => {
                self.current_time = self.duration;
                Some(PlaybackStatus::Paused)
            }
            (_, MediaUpdate::Ended) => {
                self.current_time = self.duration;
                None
            }

            (_, MediaUpdate::PlayRejected { reason }) => {
                warn!(%reason, "Play request rejected; staying ready but paused");
                match self.status {
                    PlaybackStatus::Paused => None,
                    _ => Some(PlaybackStatus::Ready),
                }
            }
        };

        if let Some(status) = next {
            self.transition(status);
        }
        *self != before
    }

    /// Enter the terminal error state directly (initialization failure)
    pub(crate) fn fail(&mut self, failure: MediaFailure) {
        self.transition(PlaybackStatus::from_failure(failure));
    }

    fn transition(&mut self, next: PlaybackStatus) {
        if self.status != next {
            info!(from = %self.status, to = %next, "State transition");
            self.status = next;
        }
    }

    /// Reset media-derived fields for a newly attached session.
    /// Preferences (volume, rate, brightness, aspect, fullscreen) carry over.
    pub(crate) fn reset_for_session(&mut self) {
        self.transition(PlaybackStatus::loading());
        self.current_time = 0.0;
        self.duration = 0.0;
        self.buffered_fraction = 0.0;
    }

    /// Back to idle after the session is torn down
    pub(crate) fn reset_to_idle(&mut self) {
        self.reset_for_session();
        self.transition(PlaybackStatus::Idle);
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// Clamp to `[0, 1]`; remembers non-zero values for unmute. Returns the applied volume.
    pub(crate) fn set_volume(&mut self, volume: f64) -> f64 {
        let volume = volume.clamp(0.0, 1.0);
        self.volume = volume;
        if volume > 0.0 {
            self.last_non_zero_volume = volume;
        }
        volume
    }

    /// Mute, or restore the last non-zero volume. Returns the applied volume.
    pub(crate) fn toggle_mute(&mut self) -> f64 {
        if self.volume > 0.0 {
            self.last_non_zero_volume = self.volume;
            self.volume = 0.0;
        } else {
            self.volume = if self.last_non_zero_volume > 0.0 {
                self.last_non_zero_volume
            } else {
                1.0
            };
        }
        self.volume
    }

    pub(crate) fn set_brightness(&mut self, brightness: f64) -> f64 {
        self.brightness = brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
        self.brightness
    }

    pub(crate) fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.playback_rate = rate;
    }

    pub(crate) fn set_aspect_ratio(&mut self, mode: AspectRatioMode) {
        self.aspect_ratio = mode;
    }

    pub(crate) fn set_fullscreen(&mut self, active: bool) {
        self.is_fullscreen = active;
    }

    pub(crate) fn set_controls_visible(&mut self, visible: bool) {
        self.controls_visible = visible;
    }
}
