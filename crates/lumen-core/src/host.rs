//! Host platform integration
//!
//! The host owns the container element. The player asks it to enter or
//! leave fullscreen and to unmount; the host reports the actual fullscreen
//! state back through `PlayerController::fullscreen_changed`.

use crate::{Error, Result};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub trait PlayerHost: Send {
    /// Ask the platform to make the container fullscreen
    fn request_fullscreen(&mut self) -> Result<()>;

    fn exit_fullscreen(&mut self) -> Result<()>;

    /// The player wants to be unmounted
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCall {
    RequestFullscreen,
    ExitFullscreen,
    Close,
}

#[derive(Debug, Default)]
struct HostLog {
    calls: Vec<HostCall>,
    deny_fullscreen: bool,
}

/// Host that records calls; clones share one log
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    log: Arc<Mutex<HostLog>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, HostLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make fullscreen requests fail synchronously
    pub fn deny_fullscreen(&self, deny: bool) {
        self.log().deny_fullscreen = deny;
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.log().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.log()
            .calls
            .iter()
            .filter(|c| **c == HostCall::Close)
            .count()
    }
}

impl PlayerHost for RecordingHost {
    fn request_fullscreen(&mut self) -> Result<()> {
        let mut log = self.log();
        log.calls.push(HostCall::RequestFullscreen);
        if log.deny_fullscreen {
            return Err(Error::Fullscreen("permission denied".to_string()));
        }
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        self.log().calls.push(HostCall::ExitFullscreen);
        Ok(())
    }

    fn close(&mut self) {
        self.log().calls.push(HostCall::Close);
    }
}
