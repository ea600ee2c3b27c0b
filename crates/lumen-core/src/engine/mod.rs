//! Media engine abstraction
//!
//! The player never decodes media itself. A host plugs in an
//! [`EngineFactory`] that constructs one [`MediaEngine`] per media session
//! and reports that engine's asynchronous lifecycle through an [`EventSink`].

pub mod recording;

pub use recording::{EngineCommand, RecordingFactory};

use crate::{types::Generation, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

/// Raw events emitted by a media engine, in engine order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    LoadStart,
    MetadataLoaded { duration: f64 },
    CanPlay,
    CanPlayThrough,
    /// Playback stalled waiting for data
    Waiting,
    Playing,
    Paused,
    TimeUpdate { current_time: f64 },
    /// End of the last buffered range
    Progress { buffered_end: f64 },
    Ended,
    /// Terminal media error with the engine's numeric code
    Error { code: u16 },
    /// A play request resolved
    PlayStarted,
    /// A play request was refused (autoplay policy, codec)
    PlayRejected { reason: String },
}

impl EngineEvent {
    /// High-frequency events that overwrite rather than accumulate
    pub fn is_high_frequency(&self) -> bool {
        matches!(
            self,
            EngineEvent::TimeUpdate { .. } | EngineEvent::Progress { .. }
        )
    }
}

/// An engine event tagged with the generation of the session that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub generation: Generation,
    pub event: EngineEvent,
}

/// Keep only the newest time and buffer update within each run of
/// high-frequency events. Any other event ends the run, so lifecycle order
/// is preserved.
pub fn coalesce_events(batch: Vec<SessionEvent>) -> Vec<SessionEvent> {
    let mut out: Vec<SessionEvent> = Vec::with_capacity(batch.len());
    let mut run_start = 0;

    for event in batch {
        if event.event.is_high_frequency() {
            let kind = std::mem::discriminant(&event.event);
            if let Some(pos) = out[run_start..].iter().position(|e| {
                e.generation == event.generation && std::mem::discriminant(&e.event) == kind
            }) {
                out.remove(run_start + pos);
            }
            out.push(event);
        } else {
            out.push(event);
            run_start = out.len();
        }
    }
    out
}

/// Receiving end of the engine event channel, owned by the player
pub type SessionEventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Sending half handed to an engine at construction
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(generation: Generation, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deliver an event; returns false once the player is gone
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx
            .send(SessionEvent {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Text track registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTrack {
    pub src: Url,
    pub language: String,
    pub label: String,
    pub default: bool,
}

/// Everything an engine needs to bind a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub source: Url,
    pub mime_type: &'static str,
    pub preload: bool,
}

/// One engine instance bound to one source
pub trait MediaEngine: Send {
    /// Request playback; the outcome arrives as `PlayStarted` or `PlayRejected`
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Seek to an absolute position in seconds
    fn seek(&mut self, position: f64) -> Result<()>;

    fn set_playback_rate(&mut self, rate: f64) -> Result<()>;

    fn set_volume(&mut self, volume: f64) -> Result<()>;

    fn add_text_track(&mut self, track: &TextTrack) -> Result<()>;

    /// Detach from the rendering surface and drop event subscriptions
    fn dispose(&mut self) -> Result<()>;
}

/// Constructs engines attached to the player's single rendering surface
pub trait EngineFactory: Send {
    fn create(&mut self, options: &EngineOptions, sink: EventSink) -> Result<Box<dyn MediaEngine>>;
}
