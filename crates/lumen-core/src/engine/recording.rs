//! Scripted engine that records commands instead of decoding
//!
//! Used by tests and the CLI replay harness. Clones of a
//! [`RecordingFactory`] share one ledger, so a caller can keep a handle after
//! moving a clone into the player and then push events into any session it
//! created, including sessions that have already been disposed.

use super::{EngineEvent, EngineFactory, EngineOptions, EventSink, MediaEngine, TextTrack};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

/// A command the player issued to an engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EngineCommand {
    Play,
    Pause,
    Seek { position: f64 },
    SetPlaybackRate { rate: f64 },
    SetVolume { volume: f64 },
    AddTextTrack { src: Url },
    Dispose,
}

#[derive(Debug)]
struct RecordedSession {
    options: EngineOptions,
    sink: EventSink,
    commands: Vec<EngineCommand>,
    disposed: bool,
}

#[derive(Debug, Default)]
struct Ledger {
    sessions: Vec<RecordedSession>,
    fail_next_create: Option<String>,
    fail_dispose: bool,
    reject_play: bool,
}

/// Factory producing [`RecordingEngine`]s
#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    ledger: Arc<Mutex<Ledger>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `create` call fail with `reason`
    pub fn fail_next_create(&self, reason: impl Into<String>) {
        self.ledger().fail_next_create = Some(reason.into());
    }

    /// Make every `dispose` call report an error (after recording it)
    pub fn fail_dispose(&self, fail: bool) {
        self.ledger().fail_dispose = fail;
    }

    /// Make `play` return an error synchronously
    pub fn reject_play(&self, reject: bool) {
        self.ledger().reject_play = reject;
    }

    /// Number of engines ever constructed
    pub fn session_count(&self) -> usize {
        self.ledger().sessions.len()
    }

    /// Number of engines constructed and not yet disposed
    pub fn active_count(&self) -> usize {
        self.ledger().sessions.iter().filter(|s| !s.disposed).count()
    }

    pub fn is_disposed(&self, index: usize) -> bool {
        self.ledger()
            .sessions
            .get(index)
            .map(|s| s.disposed)
            .unwrap_or(false)
    }

    /// Commands received by the engine at `index`
    pub fn commands(&self, index: usize) -> Vec<EngineCommand> {
        self.ledger()
            .sessions
            .get(index)
            .map(|s| s.commands.clone())
            .unwrap_or_default()
    }

    pub fn options(&self, index: usize) -> Option<EngineOptions> {
        self.ledger().sessions.get(index).map(|s| s.options.clone())
    }

    /// Index of the most recently constructed engine
    pub fn latest(&self) -> Option<usize> {
        self.ledger().sessions.len().checked_sub(1)
    }

    /// Emit an event from the engine at `index`, as its real counterpart would
    pub fn emit(&self, index: usize, event: EngineEvent) -> bool {
        let sink = self.ledger().sessions.get(index).map(|s| s.sink.clone());
        sink.map(|sink| sink.emit(event)).unwrap_or(false)
    }

    /// Emit from the most recently constructed engine
    pub fn emit_latest(&self, event: EngineEvent) -> bool {
        match self.latest() {
            Some(index) => self.emit(index, event),
            None => false,
        }
    }
}

impl EngineFactory for RecordingFactory {
    fn create(&mut self, options: &EngineOptions, sink: EventSink) -> Result<Box<dyn MediaEngine>> {
        let mut ledger = self.ledger();
        if let Some(reason) = ledger.fail_next_create.take() {
            return Err(Error::EngineInit(reason));
        }

        ledger.sessions.push(RecordedSession {
            options: options.clone(),
            sink,
            commands: Vec::new(),
            disposed: false,
        });
        let index = ledger.sessions.len() - 1;

        Ok(Box::new(RecordingEngine {
            index,
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

/// Engine handle that appends every command to the shared ledger
#[derive(Debug)]
pub struct RecordingEngine {
    index: usize,
    ledger: Arc<Mutex<Ledger>>,
}

impl RecordingEngine {
    fn record(&self, command: EngineCommand) -> MutexGuard<'_, Ledger> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = ledger.sessions.get_mut(self.index) {
            session.commands.push(command);
        }
        ledger
    }
}

impl MediaEngine for RecordingEngine {
    fn play(&mut self) -> Result<()> {
        let ledger = self.record(EngineCommand::Play);
        if ledger.reject_play {
            return Err(Error::command("play", "play request rejected"));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(EngineCommand::Pause);
        Ok(())
    }

    fn seek(&mut self, position: f64) -> Result<()> {
        self.record(EngineCommand::Seek { position });
        Ok(())
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        self.record(EngineCommand::SetPlaybackRate { rate });
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.record(EngineCommand::SetVolume { volume });
        Ok(())
    }

    fn add_text_track(&mut self, track: &TextTrack) -> Result<()> {
        self.record(EngineCommand::AddTextTrack {
            src: track.src.clone(),
        });
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        let mut ledger = self.record(EngineCommand::Dispose);
        if let Some(session) = ledger.sessions.get_mut(self.index) {
            session.disposed = true;
        }
        if ledger.fail_dispose {
            return Err(Error::Disposal("surface already detached".to_string()));
        }
        Ok(())
    }
}
