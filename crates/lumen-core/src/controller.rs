//! Player Controller - owns playback state and routes every input
//!
//! Coordinates:
//! - Source binding through the media session adapter
//! - Engine events into the playback state reducer
//! - Touch gestures, pointer idle timer and keyboard shortcuts
//! - Settings menu and fullscreen requests to the host
//!
//! The controller never sleeps. Timers are deadlines that the owner drives
//! through [`PlayerController::poll_timers`] and
//! [`PlayerController::next_deadline`].

use crate::{
    adapter::{AttachOutcome, Autoplay, EnginePreferences, MediaSessionAdapter, MediaUpdate},
    clock::Clock,
    engine::{EngineFactory, SessionEvent, SessionEventReceiver},
    gesture::{GestureContext, GestureIntent, GestureRecognizer, Indicators},
    host::PlayerHost,
    idle::IdleTimer,
    input::{ClickTarget, Intent, Key},
    settings::{MenuChoice, SettingsMenu},
    source::MediaSource,
    state::PlaybackState,
    timer::earliest,
    types::{AspectRatioMode, InputMode, PlaybackRate, Point, SettingsTab, Viewport},
    view::PlayerView,
    PlayerConfig, Result,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Interactive playback controller for a single player instance
pub struct PlayerController {
    config: PlayerConfig,
    clock: Arc<dyn Clock>,
    adapter: MediaSessionAdapter,
    state: PlaybackState,
    gestures: GestureRecognizer,
    idle: IdleTimer,
    /// Present only while the settings menu is open
    menu: Option<SettingsMenu>,
    mode: InputMode,
    host: Box<dyn PlayerHost>,
    /// Last source supplied by the host, bound or not
    bound: Option<MediaSource>,
    closed: bool,
}

impl PlayerController {
    /// Create a controller. Engine events are delivered to `events`; feed
    /// them back through [`PlayerController::handle_session_event`].
    pub fn new(
        config: PlayerConfig,
        factory: Box<dyn EngineFactory>,
        host: Box<dyn PlayerHost>,
        clock: Arc<dyn Clock>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            adapter: MediaSessionAdapter::new(factory, events, &config),
            state: PlaybackState::new(&config),
            gestures: GestureRecognizer::new(&config),
            idle: IdleTimer::new(config.idle_timeout()),
            menu: None,
            mode: InputMode::default(),
            host,
            clock,
            bound: None,
            closed: false,
            config,
        })
    }

    /// Create a controller together with its engine event channel
    pub fn with_channel(
        config: PlayerConfig,
        factory: Box<dyn EngineFactory>,
        host: Box<dyn PlayerHost>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, SessionEventReceiver)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self::new(config, factory, host, clock, tx)?;
        Ok((controller, rx))
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.bound.as_ref()
    }

    pub fn settings_menu(&self) -> Option<&SettingsMenu> {
        self.menu.as_ref()
    }

    pub fn is_settings_open(&self) -> bool {
        self.menu.is_some()
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    pub fn indicators(&self) -> Indicators {
        self.gestures.indicators()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Render model for the current state
    pub fn view(&self) -> PlayerView {
        PlayerView::build(self)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Bind a source. Re-supplying the same media and subtitle URLs is a no-op.
    pub fn load(&mut self, source: MediaSource) {
        if self.closed {
            debug!(url = %source.url, "Player closed; load ignored");
            return;
        }
        if let Some(current) = &self.bound {
            if current.same_binding(&source) {
                debug!(url = %source.url, "Source unchanged; keeping current session");
                self.bound = Some(source);
                return;
            }
        }

        self.cancel_timers();
        self.menu = None;
        self.state.reset_for_session();

        let prefs = EnginePreferences {
            volume: self.state.volume(),
            playback_rate: self.state.playback_rate().value(),
        };
        let outcome = self.adapter.attach(source.clone(), prefs);
        self.bound = Some(source);

        match outcome {
            AttachOutcome::Attached {
                autoplay: Autoplay::Rejected(reason),
                ..
            } => {
                self.state.apply(MediaUpdate::PlayRejected { reason });
            }
            AttachOutcome::Attached { generation, .. } => {
                debug!(generation, "Session attached");
            }
            AttachOutcome::Failed(failure) => self.state.fail(failure),
        }
    }

    /// Release the engine and return to idle
    pub fn unload(&mut self) {
        self.teardown();
        self.bound = None;
        self.state.reset_to_idle();
    }

    /// Feed one engine event. Returns true if playback state changed.
    pub fn handle_session_event(&mut self, event: SessionEvent) -> bool {
        match self.adapter.translate(event) {
            Some(update) => self.state.apply(update),
            None => false,
        }
    }

    /// Cancel timers, close the menu and dispose the engine
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.menu = None;
        self.adapter.detach();
    }

    /// Tear down and ask the host to unmount. The host hears about it once.
    pub fn close(&mut self) {
        self.teardown();
        if self.closed {
            return;
        }
        self.closed = true;
        info!("Player closed");
        self.host.close();
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Apply an intent from any input source
    pub fn dispatch(&mut self, intent: Intent) -> Result<()> {
        debug!(?intent, "Dispatching intent");
        match intent {
            Intent::TogglePlay => self.toggle_play(),
            Intent::SeekRelative(delta) => self.seek_relative(delta),
            Intent::SkipForward => self.seek_relative(self.config.seek_step_secs),
            Intent::SkipBack => self.seek_relative(-self.config.seek_step_secs),
            Intent::SeekToFraction(fraction) => self.seek_to_fraction(fraction),
            Intent::SetVolume(volume) => self.set_volume(volume),
            Intent::StepVolume(delta) => self.step_volume(delta),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::SetBrightness(brightness) => self.set_brightness(brightness),
            Intent::SetPlaybackRate(rate) => self.set_playback_rate(rate)?,
            Intent::SetAspectRatio(mode) => self.set_aspect_ratio(mode),
            Intent::ToggleFullscreen => self.toggle_fullscreen(),
            Intent::ToggleSettings => self.toggle_settings(),
            Intent::SelectSettingsTab(tab) => self.select_settings_tab(tab),
            Intent::CloseSettings => {
                self.close_settings();
            }
            Intent::ToggleControls => self.toggle_controls(),
            Intent::Dismiss => self.dismiss(),
            Intent::Close => self.close(),
        }
        Ok(())
    }

    /// Intents act only on a live, non-failed session
    fn accepts_intents(&self) -> bool {
        if !self.adapter.has_session() {
            debug!("No active session; intent ignored");
            return false;
        }
        if self.state.has_error() {
            debug!("Playback failed; intent ignored");
            return false;
        }
        true
    }

    pub fn toggle_play(&mut self) {
        if !self.accepts_intents() {
            return;
        }

        if self.state.is_playing_or_will_resume() {
            if let Err(e) = self.adapter.pause() {
                warn!(error = %e, "Pause command failed");
            }
            return;
        }

        if let Err(e) = self.adapter.play() {
            self.state.apply(MediaUpdate::PlayRejected {
                reason: e.to_string(),
            });
        }
    }

    /// Seek by `delta` seconds, clamped to the media. The position updates
    /// when the engine reports it.
    pub fn seek_relative(&mut self, delta: f64) {
        if !self.accepts_intents() || !delta.is_finite() {
            return;
        }
        let target = self.state.clamp_time(self.state.current_time() + delta);
        self.seek_to(target);
    }

    /// Seek to a fraction of the duration (progress bar)
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if !self.accepts_intents() || !fraction.is_finite() {
            return;
        }
        if self.state.duration() <= 0.0 {
            debug!("Duration unknown; seek ignored");
            return;
        }
        let target = self
            .state
            .clamp_time(fraction.clamp(0.0, 1.0) * self.state.duration());
        self.seek_to(target);
    }

    fn seek_to(&mut self, position: f64) {
        debug!(position, "Seeking");
        if let Err(e) = self.adapter.seek(position) {
            warn!(error = %e, "Seek command failed");
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !self.accepts_intents() || volume.is_nan() {
            return;
        }
        let applied = self.state.set_volume(volume);
        self.push_volume(applied);
    }

    pub fn step_volume(&mut self, delta: f64) {
        self.set_volume(self.state.volume() + delta);
    }

    pub fn toggle_mute(&mut self) {
        if !self.accepts_intents() {
            return;
        }
        let applied = self.state.toggle_mute();
        self.push_volume(applied);
    }

    fn push_volume(&mut self, volume: f64) {
        if let Err(e) = self.adapter.set_volume(volume) {
            warn!(error = %e, "Volume command failed");
        }
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        if !self.accepts_intents() || brightness.is_nan() {
            return;
        }
        self.state.set_brightness(brightness);
    }

    /// Rates outside the supported set are rejected before anything else
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        let rate = PlaybackRate::try_new(rate).inspect_err(|e| {
            warn!(error = %e, "Rejected playback rate");
        })?;
        if self.accepts_intents() {
            self.apply_playback_rate(rate);
        }
        Ok(())
    }

    fn apply_playback_rate(&mut self, rate: PlaybackRate) {
        if let Err(e) = self.adapter.set_playback_rate(rate.value()) {
            warn!(error = %e, "Playback rate command failed");
            return;
        }
        self.state.set_playback_rate(rate);
    }

    pub fn set_aspect_ratio(&mut self, mode: AspectRatioMode) {
        if !self.accepts_intents() {
            return;
        }
        self.state.set_aspect_ratio(mode);
    }

    /// Ask the host to enter or leave fullscreen. State follows the
    /// platform's notification, not the request.
    pub fn toggle_fullscreen(&mut self) {
        if !self.accepts_intents() {
            return;
        }
        self.request_fullscreen(!self.state.is_fullscreen());
    }

    fn request_fullscreen(&mut self, enter: bool) {
        let result = if enter {
            self.host.request_fullscreen()
        } else {
            self.host.exit_fullscreen()
        };
        if let Err(e) = result {
            warn!(error = %e, enter, "Fullscreen request failed");
        }
    }

    /// Platform fullscreen notification; applies even in the error state
    pub fn fullscreen_changed(&mut self, active: bool) {
        if self.state.is_fullscreen() != active {
            info!(fullscreen = active, "Fullscreen changed");
        }
        self.state.set_fullscreen(active);
    }

    pub fn toggle_controls(&mut self) {
        if !self.accepts_intents() {
            return;
        }
        let visible = !self.state.controls_visible();
        self.state.set_controls_visible(visible);
    }

    /// Escape: leave fullscreen, otherwise close the settings menu
    pub fn dismiss(&mut self) {
        if self.state.is_fullscreen() {
            self.request_fullscreen(false);
        } else {
            self.close_settings();
        }
    }

    // ------------------------------------------------------------------
    // Settings menu
    // ------------------------------------------------------------------

    pub fn toggle_settings(&mut self) {
        if self.menu.is_some() {
            self.close_settings();
        } else {
            self.open_settings();
        }
    }

    /// Opens on the default tab with the applied values highlighted
    pub fn open_settings(&mut self) {
        if !self.accepts_intents() {
            return;
        }
        self.menu = Some(SettingsMenu::open(
            self.state.playback_rate(),
            self.state.aspect_ratio(),
        ));
        debug!("Settings menu opened");
    }

    /// Returns true if a menu was open
    pub fn close_settings(&mut self) -> bool {
        let was_open = self.menu.take().is_some();
        if was_open {
            debug!("Settings menu closed");
        }
        was_open
    }

    pub fn select_settings_tab(&mut self, tab: SettingsTab) {
        if let Some(menu) = self.menu.as_mut() {
            menu.select_tab(tab);
        }
    }

    /// Apply a speed from the menu and close it
    pub fn select_speed(&mut self, rate: f64) -> Result<()> {
        let rate = PlaybackRate::try_new(rate)?;
        if !self.accepts_intents() {
            return Ok(());
        }
        self.commit_menu_choice(MenuChoice::Speed(rate));
        Ok(())
    }

    /// Apply an aspect ratio from the menu and close it
    pub fn select_aspect_ratio(&mut self, mode: AspectRatioMode) {
        if !self.accepts_intents() {
            return;
        }
        self.commit_menu_choice(MenuChoice::AspectRatio(mode));
    }

    /// Close the menu and apply the committed choice
    fn commit_menu_choice(&mut self, choice: MenuChoice) {
        let choice = match self.menu.take() {
            Some(menu) => menu.choose(choice),
            None => choice,
        };
        match choice {
            MenuChoice::Speed(rate) => self.apply_playback_rate(rate),
            MenuChoice::AspectRatio(mode) => self.state.set_aspect_ratio(mode),
        }
    }

    // ------------------------------------------------------------------
    // Raw input
    // ------------------------------------------------------------------

    /// Switch input mode. Timers of the mode being left are cancelled.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.mode == mode {
            return;
        }
        match mode {
            InputMode::Touch => self.idle.cancel(),
            InputMode::Pointer => self.gestures.cancel(),
        }
        info!(from = %self.mode, to = %mode, "Input mode changed");
        self.mode = mode;
    }

    pub fn touch_start(&mut self, at: Point, viewport: Viewport) {
        if self.mode != InputMode::Touch {
            return;
        }
        let now = self.clock.now();
        if let Some(intent) = self.gestures.touch_start(at, viewport, now) {
            self.apply_gesture(intent);
        }
    }

    pub fn touch_move(&mut self, at: Point, viewport: Viewport) {
        if self.mode != InputMode::Touch {
            return;
        }
        let ctx = GestureContext {
            volume: self.state.volume(),
            brightness: self.state.brightness(),
        };
        if let Some(intent) = self.gestures.touch_move(at, viewport, ctx) {
            self.apply_gesture(intent);
        }
    }

    pub fn touch_end(&mut self) {
        if self.mode != InputMode::Touch {
            return;
        }
        let now = self.clock.now();
        self.gestures.touch_end(now);
    }

    fn apply_gesture(&mut self, intent: GestureIntent) {
        match intent {
            GestureIntent::TogglePlay => self.toggle_play(),
            GestureIntent::ToggleControls => self.toggle_controls(),
            GestureIntent::SetVolume(volume) => self.set_volume(volume),
            GestureIntent::SetBrightness(brightness) => self.set_brightness(brightness),
        }
    }

    /// Pointer moved over the container: show controls, restart the idle countdown
    pub fn pointer_move(&mut self) {
        if self.mode != InputMode::Pointer {
            return;
        }
        self.state.set_controls_visible(true);
        let now = self.clock.now();
        self.idle.pointer_moved(now);
    }

    pub fn pointer_leave(&mut self) {
        if self.mode != InputMode::Pointer {
            return;
        }
        if self.idle.pointer_left(self.menu.is_some()) {
            self.state.set_controls_visible(false);
        }
    }

    /// A click on the surface closes an open menu; otherwise it toggles playback
    pub fn click(&mut self, target: ClickTarget) {
        if self.mode != InputMode::Pointer {
            return;
        }
        match target {
            ClickTarget::Surface => {
                if !self.close_settings() {
                    self.toggle_play();
                }
            }
            ClickTarget::SettingsButton => self.toggle_settings(),
            ClickTarget::SettingsMenu => {}
        }
    }

    pub fn double_click(&mut self) {
        if self.mode != InputMode::Pointer {
            return;
        }
        self.toggle_fullscreen();
    }

    /// Handle a key press. Returns true if the host should suppress the
    /// platform default for it.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.mode != InputMode::Pointer {
            return false;
        }
        if let Some(intent) = key.intent(self.config.keyboard_volume_step) {
            if let Err(e) = self.dispatch(intent) {
                warn!(error = %e, ?key, "Key binding failed");
            }
        }
        key.prevents_default()
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Fire every timer whose deadline has passed
    pub fn poll_timers(&mut self) {
        let now = self.clock.now();
        if let Some(intent) = self.gestures.poll(now) {
            self.apply_gesture(intent);
        }
        if self.idle.poll(now, self.menu.is_some()) {
            self.state.set_controls_visible(false);
        }
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.gestures.next_deadline(), self.idle.deadline()])
    }

    fn cancel_timers(&mut self) {
        self.gestures.cancel();
        self.idle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        engine::{EngineCommand, EngineEvent, RecordingFactory},
        host::{HostCall, RecordingHost},
        state::PlaybackStatus,
    };
    use std::time::Duration;
    use url::Url;

    struct Harness {
        controller: PlayerController,
        events: SessionEventReceiver,
        factory: RecordingFactory,
        host: RecordingHost,
        clock: ManualClock,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_config(PlayerConfig::default())
        }

        fn with_config(config: PlayerConfig) -> Self {
            let factory = RecordingFactory::new();
            let host = RecordingHost::new();
            let clock = ManualClock::new();
            let (controller, events) = PlayerController::with_channel(
                config,
                Box::new(factory.clone()),
                Box::new(host.clone()),
                Arc::new(clock.clone()),
            )
            .unwrap();
            Self {
                controller,
                events,
                factory,
                host,
                clock,
            }
        }

        fn emit(&mut self, event: EngineEvent) {
            self.factory.emit_latest(event);
            self.drain();
        }

        fn drain(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                self.controller.handle_session_event(event);
            }
        }

        fn advance(&mut self, ms: u64) {
            self.clock.advance(Duration::from_millis(ms));
            self.controller.poll_timers();
        }

        fn playing(&mut self) {
            self.controller.load(source("movie.mp4"));
            self.emit(EngineEvent::MetadataLoaded { duration: 120.0 });
            self.emit(EngineEvent::CanPlay);
            self.emit(EngineEvent::Playing);
        }
    }

    fn source(path: &str) -> MediaSource {
        MediaSource::new(Url::parse("https://media.example.com/").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PlayerConfig {
            idle_timeout_ms: 0,
            ..Default::default()
        };
        let result = PlayerController::with_channel(
            config,
            Box::new(RecordingFactory::new()),
            Box::new(RecordingHost::new()),
            Arc::new(ManualClock::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reaches_playing() {
        let mut h = Harness::new();
        h.playing();
        assert_eq!(h.controller.state().status(), &PlaybackStatus::Playing);
        assert_eq!(h.controller.state().duration(), 120.0);
        assert_eq!(
            h.factory.commands(0),
            vec![
                EngineCommand::SetVolume { volume: 1.0 },
                EngineCommand::SetPlaybackRate { rate: 1.0 },
                EngineCommand::Play,
            ]
        );
    }

    #[test]
    fn test_same_source_is_noop() {
        let mut h = Harness::new();
        h.playing();
        h.controller.load(source("movie.mp4"));
        assert_eq!(h.factory.session_count(), 1);
        assert!(h.controller.state().is_playing());
    }

    #[test]
    fn test_source_change_disposes_first() {
        let mut h = Harness::new();
        h.playing();
        h.controller.load(source("other.webm"));

        assert_eq!(h.factory.session_count(), 2);
        assert!(h.factory.is_disposed(0));
        assert!(!h.factory.is_disposed(1));
        assert!(h.controller.state().is_loading());

        // Late event from the disposed engine
        h.factory.emit(0, EngineEvent::Error { code: 2 });
        h.drain();
        assert!(!h.controller.state().has_error());
    }

    #[test]
    fn test_init_failure_is_terminal() {
        let mut h = Harness::new();
        h.factory.fail_next_create("no surface");
        h.controller.load(source("movie.mp4"));

        assert!(h.controller.state().has_error());
        assert_eq!(
            h.controller.state().error_message(),
            Some("Failed to initialize video player.")
        );

        h.controller.toggle_play();
        h.controller.set_volume(0.2);
        assert_eq!(h.controller.state().volume(), 1.0);
    }

    #[test]
    fn test_autoplay_rejection_degrades_to_ready() {
        let mut h = Harness::new();
        h.factory.reject_play(true);
        h.controller.load(source("movie.mp4"));
        assert_eq!(h.controller.state().status(), &PlaybackStatus::Ready);
    }

    #[test]
    fn test_toggle_play_pauses_when_playing() {
        let mut h = Harness::new();
        h.playing();
        h.controller.toggle_play();
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Pause));
        assert!(h.controller.state().is_playing());

        h.emit(EngineEvent::Paused);
        assert_eq!(h.controller.state().status(), &PlaybackStatus::Paused);
    }

    #[test]
    fn test_seek_is_clamped_and_not_optimistic() {
        let mut h = Harness::new();
        h.playing();
        h.emit(EngineEvent::TimeUpdate { current_time: 115.0 });

        h.controller.seek_relative(10.0);
        assert_eq!(
            h.factory.commands(0).last(),
            Some(&EngineCommand::Seek { position: 120.0 })
        );
        assert_eq!(h.controller.state().current_time(), 115.0);

        h.controller.seek_relative(-500.0);
        assert_eq!(
            h.factory.commands(0).last(),
            Some(&EngineCommand::Seek { position: 0.0 })
        );

        h.controller.seek_to_fraction(0.5);
        assert_eq!(
            h.factory.commands(0).last(),
            Some(&EngineCommand::Seek { position: 60.0 })
        );
    }

    #[test]
    fn test_mute_round_trip() {
        let mut h = Harness::new();
        h.playing();
        h.controller.set_volume(0.6);
        h.controller.toggle_mute();
        assert_eq!(h.controller.state().volume(), 0.0);
        h.controller.toggle_mute();
        assert_eq!(h.controller.state().volume(), 0.6);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let mut h = Harness::new();
        h.playing();
        assert!(h.controller.set_playback_rate(3.0).is_err());
        assert_eq!(h.controller.state().playback_rate(), PlaybackRate::NORMAL);

        h.controller.set_playback_rate(1.5).unwrap();
        assert_eq!(h.controller.state().playback_rate().value(), 1.5);
    }

    #[test]
    fn test_fullscreen_follows_notification() {
        let mut h = Harness::new();
        h.playing();
        h.controller.toggle_fullscreen();
        assert_eq!(h.host.calls(), vec![HostCall::RequestFullscreen]);
        assert!(!h.controller.state().is_fullscreen());

        h.controller.fullscreen_changed(true);
        assert!(h.controller.state().is_fullscreen());

        h.controller.dismiss();
        assert_eq!(h.host.calls().last(), Some(&HostCall::ExitFullscreen));
    }

    #[test]
    fn test_fullscreen_denied_keeps_state() {
        let mut h = Harness::new();
        h.playing();
        h.host.deny_fullscreen(true);
        h.controller.toggle_fullscreen();
        assert!(!h.controller.state().is_fullscreen());
    }

    #[test]
    fn test_settings_choice_closes_menu() {
        let mut h = Harness::new();
        h.playing();
        h.controller.toggle_settings();
        assert_eq!(
            h.controller.settings_menu().map(|m| m.active_tab()),
            Some(SettingsTab::AspectRatio)
        );

        h.controller.select_settings_tab(SettingsTab::Speed);
        assert!(h.controller.is_settings_open());

        h.controller.select_speed(0.5).unwrap();
        assert!(!h.controller.is_settings_open());
        assert_eq!(h.controller.state().playback_rate().value(), 0.5);
    }

    #[test]
    fn test_surface_click_closes_menu_before_toggling() {
        let mut h = Harness::new();
        h.playing();
        h.controller.click(ClickTarget::SettingsButton);
        h.controller.click(ClickTarget::Surface);
        assert!(!h.controller.is_settings_open());
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Play));

        h.controller.click(ClickTarget::Surface);
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Pause));
    }

    #[test]
    fn test_pointer_idle_hides_controls() {
        let mut h = Harness::new();
        h.playing();
        h.controller.pointer_move();
        assert!(h.controller.state().controls_visible());

        h.advance(2999);
        assert!(h.controller.state().controls_visible());
        h.advance(1);
        assert!(!h.controller.state().controls_visible());
        assert_eq!(h.controller.next_deadline(), None);
    }

    #[test]
    fn test_idle_respects_open_menu() {
        let mut h = Harness::new();
        h.playing();
        h.controller.pointer_move();
        h.controller.open_settings();
        h.advance(5000);
        assert!(h.controller.state().controls_visible());
        h.controller.pointer_leave();
        assert!(h.controller.state().controls_visible());
    }

    #[test]
    fn test_touch_double_tap_toggles_once() {
        let mut h = Harness::new();
        h.playing();
        h.controller.set_input_mode(InputMode::Touch);
        let viewport = Viewport::new(400.0, 800.0);
        let at = Point::new(100.0, 400.0);

        h.controller.touch_start(at, viewport);
        h.controller.touch_end();
        h.clock.advance(Duration::from_millis(100));
        h.controller.touch_start(at, viewport);
        h.controller.touch_end();

        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Pause));
        let visible = h.controller.state().controls_visible();
        h.advance(1000);
        assert_eq!(h.controller.state().controls_visible(), visible);
    }

    #[test]
    fn test_touch_single_tap_toggles_controls() {
        let mut h = Harness::new();
        h.playing();
        h.controller.set_input_mode(InputMode::Touch);
        let visible = h.controller.state().controls_visible();

        h.controller
            .touch_start(Point::new(100.0, 400.0), Viewport::new(400.0, 800.0));
        h.controller.touch_end();
        h.advance(300);

        assert_eq!(h.controller.state().controls_visible(), !visible);
    }

    #[test]
    fn test_keys_ignored_in_touch_mode() {
        let mut h = Harness::new();
        h.playing();
        assert!(h.controller.key_down(Key::ArrowDown));
        assert!((h.controller.state().volume() - 0.9).abs() < 1e-9);

        h.controller.set_input_mode(InputMode::Touch);
        assert!(!h.controller.key_down(Key::ArrowDown));
        assert!((h.controller.state().volume() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_close_notifies_host_once() {
        let mut h = Harness::new();
        h.playing();
        h.controller.close();
        h.controller.dispatch(Intent::Close).unwrap();

        assert_eq!(h.host.close_count(), 1);
        assert!(h.factory.is_disposed(0));
        assert!(h.controller.is_closed());
    }

    #[test]
    fn test_load_after_close_ignored() {
        let mut h = Harness::new();
        h.playing();
        h.controller.close();
        h.controller.load(source("other.mp4"));

        assert_eq!(h.factory.session_count(), 1);
        assert_eq!(h.factory.active_count(), 0);
        assert_eq!(
            h.controller.source().map(|s| s.url.path()),
            Some("/movie.mp4")
        );
        assert_eq!(h.host.close_count(), 1);
    }

    #[test]
    fn test_skip_uses_configured_step() {
        let mut h = Harness::new();
        h.playing();
        h.emit(EngineEvent::TimeUpdate { current_time: 30.0 });

        h.controller.dispatch(Intent::SkipForward).unwrap();
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Seek { position: 40.0 }));

        h.controller.dispatch(Intent::SkipBack).unwrap();
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Seek { position: 20.0 }));

        h.emit(EngineEvent::TimeUpdate { current_time: 115.0 });
        h.controller.dispatch(Intent::SkipForward).unwrap();
        assert_eq!(h.factory.commands(0).last(), Some(&EngineCommand::Seek { position: 120.0 }));
    }

    #[test]
    fn test_aspect_ratio_choice_closes_menu() {
        let mut h = Harness::new();
        h.playing();
        h.controller.open_settings();
        h.controller.select_aspect_ratio(AspectRatioMode::Ratio4x3);

        assert!(!h.controller.is_settings_open());
        assert_eq!(h.controller.state().aspect_ratio(), AspectRatioMode::Ratio4x3);
    }
}
