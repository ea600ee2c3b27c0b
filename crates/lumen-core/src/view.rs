//! Render model
//!
//! A serializable snapshot of everything the host draws: labels, percentages,
//! overlays and menu contents. Hosts render from this instead of reading
//! controller internals.

use crate::{
    controller::PlayerController,
    gesture::Indicators,
    settings::SettingsMenu,
    state::{DisplayMode, PlaybackState},
    types::{AspectRatioMode, InputMode, PlaybackRate, SettingsTab},
};
use serde::Serialize;

/// Keyboard help shown on pointer devices while the controls are visible
pub const SHORTCUT_HINT: &str = "Space: Play/Pause | ↑↓: Volume | F: Fullscreen | M: Mute";

pub const ERROR_TITLE: &str = "Video Error";
pub const CLOSE_ACTION: &str = "Close Player";

/// Volume icon variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            VolumeLevel::Muted
        } else if volume <= 0.33 {
            VolumeLevel::Low
        } else {
            VolumeLevel::High
        }
    }
}

/// Shown while loading near the start of the media
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadingOverlay {
    Logo { url: String },
    Text { heading: String, detail: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPanel {
    pub title: &'static str,
    pub message: String,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub tab: SettingsTab,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedOption {
    pub rate: f64,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AspectRatioOption {
    pub mode: AspectRatioMode,
    pub label: &'static str,
    pub selected: bool,
}

/// Contents of the open settings menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsView {
    pub tabs: Vec<TabView>,
    pub speeds: Vec<SpeedOption>,
    pub aspect_ratios: Vec<AspectRatioOption>,
}

impl SettingsView {
    fn build(menu: &SettingsMenu) -> Self {
        Self {
            tabs: SettingsTab::ALL
                .iter()
                .map(|&tab| TabView {
                    tab,
                    label: tab.label(),
                    active: tab == menu.active_tab(),
                })
                .collect(),
            speeds: PlaybackRate::all()
                .map(|rate| SpeedOption {
                    rate: rate.value(),
                    label: rate.label(),
                    selected: rate == menu.selected_speed(),
                })
                .collect(),
            aspect_ratios: AspectRatioMode::ALL
                .iter()
                .map(|&mode| AspectRatioOption {
                    mode,
                    label: mode.label(),
                    selected: mode == menu.selected_aspect_ratio(),
                })
                .collect(),
        }
    }
}

/// Everything the host renders for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub status: String,
    pub display_mode: DisplayMode,
    pub is_playing: bool,
    pub current_time: String,
    pub duration: String,
    pub progress_percent: f64,
    pub buffer_percent: f64,
    pub volume_percent: u32,
    pub volume_level: VolumeLevel,
    pub brightness_percent: u32,
    /// CSS filter applied to the video surface
    pub brightness_filter: String,
    pub playback_rate: String,
    pub aspect_ratio: AspectRatioMode,
    pub aspect_ratio_label: &'static str,
    pub is_fullscreen: bool,
    pub controls_visible: bool,
    pub loading_overlay: Option<LoadingOverlay>,
    pub error_panel: Option<ErrorPanel>,
    pub settings: Option<SettingsView>,
    pub shortcut_hint: Option<&'static str>,
    pub indicators: Indicators,
    pub quality: Option<String>,
    pub input_mode: InputMode,
}

impl PlayerView {
    pub fn build(controller: &PlayerController) -> Self {
        let state = controller.state();
        let source = controller.source();

        let loading_overlay = show_loading_overlay(
            state,
            controller.config().loading_overlay_max_time_secs,
        )
        .then(|| match source.and_then(|s| s.logo_url.as_ref()) {
            Some(logo) => LoadingOverlay::Logo {
                url: logo.to_string(),
            },
            None => LoadingOverlay::Text {
                heading: source
                    .and_then(|s| s.title.clone())
                    .unwrap_or_else(|| "Loading...".to_string()),
                detail: "Buffering...",
            },
        });

        let error_panel = state.error_message().map(|message| ErrorPanel {
            title: ERROR_TITLE,
            message: message.to_string(),
            action: CLOSE_ACTION,
        });

        let shortcut_hint = (controller.input_mode() == InputMode::Pointer
            && state.controls_visible())
        .then_some(SHORTCUT_HINT);

        Self {
            status: state.status().to_string(),
            display_mode: state.display_mode(),
            is_playing: state.is_playing(),
            current_time: format_time(state.current_time()),
            duration: format_time(state.duration()),
            progress_percent: state.progress_fraction() * 100.0,
            buffer_percent: state.buffered_fraction() * 100.0,
            volume_percent: (state.volume() * 100.0).round() as u32,
            volume_level: VolumeLevel::from_volume(state.volume()),
            brightness_percent: state.brightness().round() as u32,
            brightness_filter: format!("brightness({}%)", state.brightness()),
            playback_rate: state.playback_rate().label(),
            aspect_ratio: state.aspect_ratio(),
            aspect_ratio_label: state.aspect_ratio().label(),
            is_fullscreen: state.is_fullscreen(),
            controls_visible: state.controls_visible(),
            loading_overlay,
            error_panel,
            settings: controller.settings_menu().map(SettingsView::build),
            shortcut_hint,
            indicators: controller.indicators(),
            quality: source.and_then(|s| s.quality.clone()),
            input_mode: controller.input_mode(),
        }
    }
}

fn show_loading_overlay(state: &PlaybackState, max_time_secs: f64) -> bool {
    state.is_loading() && state.current_time() < max_time_secs
}

/// Format seconds as `m:ss`; non-finite input renders as `0:00`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        engine::{EngineEvent, RecordingFactory, SessionEventReceiver},
        host::RecordingHost,
        source::MediaSource,
        PlayerConfig,
    };
    use std::sync::Arc;
    use url::Url;

    fn controller() -> (PlayerController, RecordingFactory, SessionEventReceiver) {
        let factory = RecordingFactory::new();
        let (controller, events) = PlayerController::with_channel(
            PlayerConfig::default(),
            Box::new(factory.clone()),
            Box::new(RecordingHost::new()),
            Arc::new(ManualClock::new()),
        )
        .unwrap();
        (controller, factory, events)
    }

    fn source() -> MediaSource {
        MediaSource::new(Url::parse("https://media.example.com/film.mp4").unwrap())
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.9), "0:09");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_volume_level() {
        assert_eq!(VolumeLevel::from_volume(0.0), VolumeLevel::Muted);
        assert_eq!(VolumeLevel::from_volume(0.33), VolumeLevel::Low);
        assert_eq!(VolumeLevel::from_volume(0.34), VolumeLevel::High);
    }

    #[test]
    fn test_loading_overlay_uses_title() {
        let (mut controller, _, _) = controller();
        controller.load(source().with_title("Night Drive"));

        let view = controller.view();
        assert_eq!(
            view.loading_overlay,
            Some(LoadingOverlay::Text {
                heading: "Night Drive".to_string(),
                detail: "Buffering...",
            })
        );
        assert!(view.error_panel.is_none());
    }

    #[test]
    fn test_loading_overlay_hidden_past_start() {
        let (mut controller, factory, mut events) = controller();
        controller.load(source());
        factory.emit_latest(EngineEvent::MetadataLoaded { duration: 60.0 });
        factory.emit_latest(EngineEvent::TimeUpdate { current_time: 10.0 });
        factory.emit_latest(EngineEvent::Waiting);
        while let Ok(event) = events.try_recv() {
            controller.handle_session_event(event);
        }

        let view = controller.view();
        assert_eq!(view.display_mode, DisplayMode::Loading);
        assert!(view.loading_overlay.is_none());
        assert_eq!(view.current_time, "0:10");
        assert_eq!(view.duration, "1:00");
    }

    #[test]
    fn test_error_panel() {
        let (mut controller, factory, _) = controller();
        factory.fail_next_create("boom");
        controller.load(source());

        let panel = controller.view().error_panel.unwrap();
        assert_eq!(panel.title, "Video Error");
        assert_eq!(panel.message, "Failed to initialize video player.");
        assert_eq!(panel.action, "Close Player");
    }

    #[test]
    fn test_settings_view_marks_selection() {
        let (mut controller, _, _) = controller();
        controller.load(source());
        controller.open_settings();

        let settings = controller.view().settings.unwrap();
        let active: Vec<_> = settings.tabs.iter().filter(|t| t.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Settings");

        let selected: Vec<_> = settings.speeds.iter().filter(|s| s.selected).collect();
        assert_eq!(selected[0].label, "Normal");
        assert_eq!(settings.speeds.len(), 6);
        assert_eq!(settings.aspect_ratios[0].label, "Best Fit");
    }

    #[test]
    fn test_shortcut_hint_pointer_only() {
        let (mut controller, _, _) = controller();
        controller.load(source());
        controller.pointer_move();
        assert_eq!(controller.view().shortcut_hint, Some(SHORTCUT_HINT));

        controller.set_input_mode(InputMode::Touch);
        assert_eq!(controller.view().shortcut_hint, None);
    }
}
