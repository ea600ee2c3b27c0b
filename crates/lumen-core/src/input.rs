//! Intents and raw input mapping
//!
//! Keyboard, pointer and gesture input all normalize to [`Intent`], so the
//! controller applies one command regardless of where it came from.

use crate::types::{AspectRatioMode, SettingsTab};
use serde::{Deserialize, Serialize};

/// A user request to change playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    TogglePlay,
    /// Relative seek in seconds
    SeekRelative(f64),
    /// Skip buttons; step is `seek_step_secs`
    SkipForward,
    SkipBack,
    /// Absolute seek as a fraction of duration (progress bar)
    SeekToFraction(f64),
    SetVolume(f64),
    /// Relative volume change (arrow keys)
    StepVolume(f64),
    ToggleMute,
    SetBrightness(f64),
    /// Raw rate; validated against the supported set
    SetPlaybackRate(f64),
    SetAspectRatio(AspectRatioMode),
    ToggleFullscreen,
    ToggleSettings,
    SelectSettingsTab(SettingsTab),
    CloseSettings,
    ToggleControls,
    /// Escape: leave fullscreen, otherwise close the settings menu
    Dismiss,
    /// Ask the host to unmount the player
    Close,
}

/// Keys the player binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    KeyF,
    KeyM,
    Escape,
    Other,
}

impl Key {
    /// Map a DOM-style `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => Key::Space,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "KeyF" => Key::KeyF,
            "KeyM" => Key::KeyM,
            "Escape" => Key::Escape,
            _ => Key::Other,
        }
    }

    /// The host should suppress the platform's default action for this key
    pub fn prevents_default(self) -> bool {
        matches!(
            self,
            Key::Space | Key::ArrowUp | Key::ArrowDown | Key::KeyF | Key::KeyM
        )
    }

    pub fn intent(self, volume_step: f64) -> Option<Intent> {
        match self {
            Key::Space => Some(Intent::TogglePlay),
            Key::ArrowUp => Some(Intent::StepVolume(volume_step)),
            Key::ArrowDown => Some(Intent::StepVolume(-volume_step)),
            Key::KeyF => Some(Intent::ToggleFullscreen),
            Key::KeyM => Some(Intent::ToggleMute),
            Key::Escape => Some(Intent::Dismiss),
            Key::Other => None,
        }
    }
}

/// Where a pointer click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The video surface; counts as an outside click for the settings menu
    Surface,
    SettingsButton,
    /// Inside the open settings menu; handled by the menu itself
    SettingsMenu,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(Key::from_code("Space").intent(0.1), Some(Intent::TogglePlay));
        assert_eq!(
            Key::from_code("ArrowDown").intent(0.1),
            Some(Intent::StepVolume(-0.1))
        );
        assert_eq!(Key::from_code("KeyM").intent(0.1), Some(Intent::ToggleMute));
        assert_eq!(Key::from_code("Escape").intent(0.1), Some(Intent::Dismiss));
        assert_eq!(Key::from_code("KeyQ").intent(0.1), None);
    }

    #[test]
    fn test_prevent_default() {
        assert!(Key::Space.prevents_default());
        assert!(Key::KeyF.prevents_default());
        assert!(!Key::Escape.prevents_default());
        assert!(!Key::Other.prevents_default());
    }

    #[test]
    fn test_intent_json() {
        let intent: Intent =
            serde_json::from_str(r#"{"intent": "seek_relative", "value": -10.0}"#).unwrap();
        assert_eq!(intent, Intent::SeekRelative(-10.0));
        let intent: Intent = serde_json::from_str(r#"{"intent": "toggle_play"}"#).unwrap();
        assert_eq!(intent, Intent::TogglePlay);
    }
}
