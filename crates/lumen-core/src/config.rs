//! Player configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lowest brightness filter value (percent)
pub const MIN_BRIGHTNESS: f64 = 20.0;
/// Highest brightness filter value (percent)
pub const MAX_BRIGHTNESS: f64 = 150.0;

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pointer inactivity before the control overlay hides (milliseconds)
    pub idle_timeout_ms: u64,
    /// Window in which a second touch-start counts as a double tap (milliseconds)
    pub double_tap_window_ms: u64,
    /// Vertical travel before a drag locks its axis (pixels)
    pub drag_threshold_px: f64,
    /// How long volume/brightness badges stay after touch-end (milliseconds)
    pub indicator_linger_ms: u64,
    /// Volume change per arrow key press
    pub keyboard_volume_step: f64,
    /// Seek step for the skip buttons (seconds)
    pub seek_step_secs: f64,
    /// Volume applied to the first session
    pub initial_volume: f64,
    /// Playback rate applied to the first session
    pub initial_playback_rate: f64,
    /// Brightness filter (percent)
    pub initial_brightness: f64,
    /// The loading overlay is only shown before this position (seconds)
    pub loading_overlay_max_time_secs: f64,
    /// Issue a play command as soon as the engine is constructed
    pub autoplay: bool,
    /// Subtitle track language tag
    pub subtitle_language: String,
    /// Subtitle track label
    pub subtitle_label: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 3000,
            double_tap_window_ms: 300,
            drag_threshold_px: 20.0,
            indicator_linger_ms: 1000,
            keyboard_volume_step: 0.1,
            seek_step_secs: 10.0,
            initial_volume: 1.0,
            initial_playback_rate: 1.0,
            initial_brightness: 100.0,
            loading_overlay_max_time_secs: 3.0,
            autoplay: true,
            subtitle_language: "en".to_string(),
            subtitle_label: "English".to_string(),
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout_ms == 0 {
            return Err(Error::InvalidConfig("idle_timeout_ms must be positive".into()));
        }
        if self.double_tap_window_ms == 0 {
            return Err(Error::InvalidConfig(
                "double_tap_window_ms must be positive".into(),
            ));
        }
        if !(self.drag_threshold_px.is_finite() && self.drag_threshold_px >= 0.0) {
            return Err(Error::InvalidConfig(
                "drag_threshold_px must be a non-negative number".into(),
            ));
        }
        if !(self.keyboard_volume_step > 0.0 && self.keyboard_volume_step <= 1.0) {
            return Err(Error::InvalidConfig(
                "keyboard_volume_step must be in (0, 1]".into(),
            ));
        }
        if !(self.seek_step_secs.is_finite() && self.seek_step_secs > 0.0) {
            return Err(Error::InvalidConfig("seek_step_secs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::InvalidConfig("initial_volume must be in [0, 1]".into()));
        }
        if !(MIN_BRIGHTNESS..=MAX_BRIGHTNESS).contains(&self.initial_brightness) {
            return Err(Error::InvalidConfig(format!(
                "initial_brightness must be in [{MIN_BRIGHTNESS}, {MAX_BRIGHTNESS}]"
            )));
        }
        crate::types::PlaybackRate::try_new(self.initial_playback_rate)
            .map_err(|_| Error::InvalidConfig("initial_playback_rate is not a supported rate".into()))?;
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }

    pub fn indicator_linger(&self) -> Duration {
        Duration::from_millis(self.indicator_linger_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.idle_timeout(), Duration::from_secs(3));
        assert_eq!(config.double_tap_window(), Duration::from_millis(300));
        assert_eq!(config.drag_threshold_px, 20.0);
        assert_eq!(config.indicator_linger(), Duration::from_secs(1));
        assert!(config.autoplay);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = PlayerConfig::from_json(r#"{"idle_timeout_ms": 5000, "autoplay": false}"#).unwrap();
        assert_eq!(config.idle_timeout_ms, 5000);
        assert!(!config.autoplay);
        assert_eq!(config.double_tap_window_ms, 300);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(
            PlayerConfig::from_json(r#"{"initial_playback_rate": 3.0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json(r#"{"initial_brightness": 5.0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json(r#"{"idle_timeout_ms": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(PlayerConfig::from_json("{"), Err(Error::Json(_))));
    }
}
