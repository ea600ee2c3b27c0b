//! Core types for Lumen

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a media session, used to correlate log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counter identifying which engine instance an event belongs to
pub type Generation = u64;

/// Playback rate restricted to the supported discrete set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Every rate the player offers
    pub const SUPPORTED: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

    pub const NORMAL: PlaybackRate = PlaybackRate(1.0);

    /// Accept only members of [`PlaybackRate::SUPPORTED`]
    pub fn try_new(rate: f64) -> Result<Self> {
        Self::SUPPORTED
            .iter()
            .find(|&&supported| (supported - rate).abs() < 1e-9)
            .map(|&supported| Self(supported))
            .ok_or(Error::InvalidPlaybackRate { rate })
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Every supported rate, slowest first
    pub fn all() -> impl Iterator<Item = PlaybackRate> {
        Self::SUPPORTED.into_iter().map(PlaybackRate)
    }

    /// Menu label: "Normal" for 1x, otherwise e.g. "1.5x"
    pub fn label(self) -> String {
        if self == Self::NORMAL {
            "Normal".to_string()
        } else {
            format!("{}x", self.0)
        }
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = Error;

    fn try_from(rate: f64) -> Result<Self> {
        Self::try_new(rate)
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.0
    }
}

/// How the video is fitted into the container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AspectRatioMode {
    #[default]
    BestFit,
    FitScreen,
    Fill,
    #[serde(rename = "ratio16_9")]
    Ratio16x9,
    #[serde(rename = "ratio4_3")]
    Ratio4x3,
}

impl AspectRatioMode {
    pub const ALL: [AspectRatioMode; 5] = [
        AspectRatioMode::BestFit,
        AspectRatioMode::FitScreen,
        AspectRatioMode::Fill,
        AspectRatioMode::Ratio16x9,
        AspectRatioMode::Ratio4x3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatioMode::BestFit => "Best Fit",
            AspectRatioMode::FitScreen => "Fit Screen",
            AspectRatioMode::Fill => "Fill",
            AspectRatioMode::Ratio16x9 => "16:9",
            AspectRatioMode::Ratio4x3 => "4:3",
        }
    }
}

/// Settings menu tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsTab {
    Speed,
    Subtitles,
    /// General settings; holds the aspect ratio options
    AspectRatio,
}

impl SettingsTab {
    pub const ALL: [SettingsTab; 3] = [
        SettingsTab::Speed,
        SettingsTab::Subtitles,
        SettingsTab::AspectRatio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsTab::Speed => "Speed",
            SettingsTab::Subtitles => "Subtitles",
            SettingsTab::AspectRatio => "Settings",
        }
    }
}

/// Which preference a vertical drag controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Brightness,
    Volume,
}

/// A position relative to the player container's top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the player container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Horizontal midpoint; touches strictly right of it control volume
    pub fn midpoint_x(&self) -> f64 {
        self.width / 2.0
    }
}

/// Which input path is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Touch gestures; pointer and keyboard handlers are detached
    Touch,
    /// Mouse clicks, idle timer and keyboard shortcuts
    #[default]
    Pointer,
}

const MOBILE_AGENTS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Viewports at or below this width count as small screens
const SMALL_SCREEN_WIDTH: f64 = 768.0;

impl InputMode {
    /// Touch for mobile user agents, or touch-capable devices on small screens
    pub fn detect(user_agent: &str, touch_capable: bool, viewport_width: f64) -> Self {
        let agent = user_agent.to_lowercase();
        let mobile_agent = MOBILE_AGENTS.iter().any(|needle| agent.contains(needle));
        let small_screen = viewport_width <= SMALL_SCREEN_WIDTH;

        if mobile_agent || (touch_capable && small_screen) {
            InputMode::Touch
        } else {
            InputMode::Pointer
        }
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputMode::Touch => write!(f, "touch"),
            InputMode::Pointer => write!(f, "pointer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_rate_set() {
        assert_eq!(PlaybackRate::try_new(1.25).unwrap().value(), 1.25);
        assert!(matches!(
            PlaybackRate::try_new(3.0),
            Err(Error::InvalidPlaybackRate { rate }) if rate == 3.0
        ));
        assert!(PlaybackRate::try_new(f64::NAN).is_err());
        assert_eq!(PlaybackRate::all().count(), 6);
    }

    #[test]
    fn test_playback_rate_labels() {
        assert_eq!(PlaybackRate::NORMAL.label(), "Normal");
        assert_eq!(PlaybackRate::try_new(0.75).unwrap().label(), "0.75x");
        assert_eq!(PlaybackRate::try_new(2.0).unwrap().label(), "2x");
    }

    #[test]
    fn test_playback_rate_serde_validates() {
        let rate: PlaybackRate = serde_json::from_str("1.5").unwrap();
        assert_eq!(rate.value(), 1.5);
        assert!(serde_json::from_str::<PlaybackRate>("1.1").is_err());
    }

    #[test]
    fn test_aspect_ratio_labels() {
        assert_eq!(AspectRatioMode::default(), AspectRatioMode::BestFit);
        assert_eq!(AspectRatioMode::Ratio16x9.label(), "16:9");
        assert_eq!(
            serde_json::to_string(&AspectRatioMode::Ratio4x3).unwrap(),
            "\"ratio4_3\""
        );
        assert_eq!(
            serde_json::to_string(&AspectRatioMode::FitScreen).unwrap(),
            "\"fitScreen\""
        );
    }

    #[test]
    fn test_input_mode_detection() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(InputMode::detect(iphone, true, 390.0), InputMode::Touch);

        let desktop = "Mozilla/5.0 (X11; Linux x86_64)";
        assert_eq!(InputMode::detect(desktop, false, 1920.0), InputMode::Pointer);
        assert_eq!(InputMode::detect(desktop, true, 1920.0), InputMode::Pointer);
        assert_eq!(InputMode::detect(desktop, true, 768.0), InputMode::Touch);
    }
}
