//! Media Session Adapter
//!
//! Owns the single engine instance attached to the rendering surface:
//! - Synchronous disposal of the previous engine before a new one is built
//! - Generation tagging so events from disposed engines are dropped
//! - Autoplay issue and rejection handling
//! - Classification of terminal engine errors

use crate::{
    engine::{EngineEvent, EngineFactory, EngineOptions, EventSink, MediaEngine, SessionEvent, TextTrack},
    error::{classify_media_error, MediaFailure},
    source::MediaSource,
    types::{Generation, SessionId},
    Error, PlayerConfig, Result,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Preferences re-applied to every new engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnginePreferences {
    pub volume: f64,
    pub playback_rate: f64,
}

/// Result of issuing the autoplay command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Autoplay {
    /// Play requested; the outcome arrives as an engine event
    Issued,
    /// The engine refused synchronously
    Rejected(String),
    Disabled,
}

/// Result of binding a source
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    Attached {
        generation: Generation,
        autoplay: Autoplay,
    },
    Failed(MediaFailure),
}

/// Normalized media update, already filtered and classified
#[derive(Debug, Clone, PartialEq)]
pub enum MediaUpdate {
    LoadStarted,
    MetadataLoaded { duration: f64 },
    CanPlay,
    Waiting,
    Playing,
    Paused,
    TimeUpdate { current_time: f64 },
    Buffered { end: f64 },
    Ended,
    PlayStarted,
    PlayRejected { reason: String },
    Failed(MediaFailure),
}

struct ActiveSession {
    id: SessionId,
    generation: Generation,
    source: MediaSource,
    engine: Box<dyn MediaEngine>,
}

/// Sole owner and commander of the media engine
pub struct MediaSessionAdapter {
    factory: Box<dyn EngineFactory>,
    events: mpsc::UnboundedSender<SessionEvent>,
    generation: Generation,
    active: Option<ActiveSession>,
    autoplay: bool,
    subtitle_language: String,
    subtitle_label: String,
}

impl MediaSessionAdapter {
    pub fn new(
        factory: Box<dyn EngineFactory>,
        events: mpsc::UnboundedSender<SessionEvent>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            factory,
            events,
            generation: 0,
            active: None,
            autoplay: config.autoplay,
            subtitle_language: config.subtitle_language.clone(),
            subtitle_label: config.subtitle_label.clone(),
        }
    }

    /// Generation of the attached session, if any
    pub fn generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|s| s.generation)
    }

    pub fn has_session(&self) -> bool {
        self.active.is_some()
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.active.as_ref().map(|s| &s.source)
    }

    /// Bind `source`, disposing any previous engine first
    pub fn attach(&mut self, source: MediaSource, prefs: EnginePreferences) -> AttachOutcome {
        self.detach();

        self.generation += 1;
        let generation = self.generation;
        let id = SessionId::new();
        let options = EngineOptions {
            source: source.url.clone(),
            mime_type: source.mime_type(),
            preload: true,
        };

        info!(
            session_id = %id,
            generation,
            url = %source.url,
            mime_type = options.mime_type,
            "Attaching media session"
        );

        let sink = EventSink::new(generation, self.events.clone());
        let mut engine = match self.factory.create(&options, sink) {
            Ok(engine) => engine,
            Err(e) => {
                error!(session_id = %id, error = %e, "Media engine initialization failed");
                return AttachOutcome::Failed(MediaFailure::initialization(e));
            }
        };

        if let Err(e) = engine.set_volume(prefs.volume) {
            warn!(error = %e, "Failed to apply initial volume");
        }
        if let Err(e) = engine.set_playback_rate(prefs.playback_rate) {
            warn!(error = %e, "Failed to apply initial playback rate");
        }

        if let Some(src) = source.subtitle_url.clone() {
            let track = TextTrack {
                src,
                language: self.subtitle_language.clone(),
                label: self.subtitle_label.clone(),
                default: true,
            };
            if let Err(e) = engine.add_text_track(&track) {
                warn!(error = %e, src = %track.src, "Failed to register subtitle track");
            }
        }

        let autoplay = if self.autoplay {
            match engine.play() {
                Ok(()) => Autoplay::Issued,
                Err(e) => {
                    warn!(session_id = %id, error = %e, "Autoplay rejected");
                    Autoplay::Rejected(e.to_string())
                }
            }
        } else {
            Autoplay::Disabled
        };

        self.active = Some(ActiveSession {
            id,
            generation,
            source,
            engine,
        });

        AttachOutcome::Attached {
            generation,
            autoplay,
        }
    }

    /// Dispose the attached engine; disposal failures are logged, never raised
    pub fn detach(&mut self) -> bool {
        let Some(mut session) = self.active.take() else {
            return false;
        };

        match session.engine.dispose() {
            Ok(()) => info!(
                session_id = %session.id,
                generation = session.generation,
                "Media session disposed"
            ),
            Err(e) => error!(
                session_id = %session.id,
                generation = session.generation,
                error = %e,
                "Error disposing media engine"
            ),
        }
        true
    }

    /// Drop stale events and translate the rest into media updates
    pub fn translate(&self, event: SessionEvent) -> Option<MediaUpdate> {
        let session = match &self.active {
            Some(session) if session.generation == event.generation => session,
            _ => {
                debug!(
                    generation = event.generation,
                    current = ?self.generation(),
                    event = ?event.event,
                    "Dropping event from stale media session"
                );
                return None;
            }
        };

        let update = match event.event {
            EngineEvent::LoadStart => MediaUpdate::LoadStarted,
            EngineEvent::MetadataLoaded { duration } => MediaUpdate::MetadataLoaded { duration },
            EngineEvent::CanPlay | EngineEvent::CanPlayThrough => MediaUpdate::CanPlay,
            EngineEvent::Waiting => MediaUpdate::Waiting,
            EngineEvent::Playing => MediaUpdate::Playing,
            EngineEvent::Paused => MediaUpdate::Paused,
            EngineEvent::TimeUpdate { current_time } => MediaUpdate::TimeUpdate { current_time },
            EngineEvent::Progress { buffered_end } => MediaUpdate::Buffered { end: buffered_end },
            EngineEvent::Ended => MediaUpdate::Ended,
            EngineEvent::PlayStarted => MediaUpdate::PlayStarted,
            EngineEvent::PlayRejected { reason } => MediaUpdate::PlayRejected { reason },
            EngineEvent::Error { code } => {
                let failure = classify_media_error(code, session.source.url.as_str());
                error!(
                    session_id = %session.id,
                    code,
                    kind = %failure.kind,
                    message = %failure.message,
                    "Media error"
                );
                MediaUpdate::Failed(failure)
            }
        };

        Some(update)
    }

    fn engine(&mut self) -> Result<&mut Box<dyn MediaEngine>> {
        self.active
            .as_mut()
            .map(|s| &mut s.engine)
            .ok_or(Error::NoActiveSession)
    }

    pub fn play(&mut self) -> Result<()> {
        self.engine()?.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.engine()?.pause()
    }

    pub fn seek(&mut self, position: f64) -> Result<()> {
        self.engine()?.seek(position)
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        self.engine()?.set_playback_rate(rate)
    }

    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.engine()?.set_volume(volume)
    }
}

impl Drop for MediaSessionAdapter {
    fn drop(&mut self) {
        self.detach();
    }
}
