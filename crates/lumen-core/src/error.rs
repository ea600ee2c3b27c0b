//! Error types for Lumen Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::source_extension;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Intent errors
    #[error("Unsupported playback rate: {rate}")]
    InvalidPlaybackRate { rate: f64 },

    #[error("No active media session")]
    NoActiveSession,

    // Engine errors
    #[error("Failed to initialize media engine: {0}")]
    EngineInit(String),

    #[error("Media engine rejected {command}: {reason}")]
    EngineCommand { command: &'static str, reason: String },

    #[error("Failed to dispose media engine: {0}")]
    Disposal(String),

    // Source errors
    #[error("Invalid media source: {0}")]
    InvalidSource(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Platform errors
    #[error("Fullscreen request failed: {0}")]
    Fullscreen(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Runtime errors
    #[error("Player runtime has shut down")]
    RuntimeClosed,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an engine command error
    pub fn command(command: &'static str, reason: impl Into<String>) -> Self {
        Error::EngineCommand {
            command,
            reason: reason.into(),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InvalidPlaybackRate { .. }
                | Error::NoActiveSession
                | Error::EngineCommand { .. }
                | Error::Fullscreen(_)
        )
    }

    /// Returns the error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidPlaybackRate { .. } => "INVALID_RATE",
            Error::NoActiveSession => "NO_SESSION",
            Error::EngineInit(_) => "ENGINE_INIT",
            Error::EngineCommand { .. } => "ENGINE_COMMAND",
            Error::Disposal(_) => "DISPOSAL",
            Error::InvalidSource(_) => "INVALID_SOURCE",
            Error::Url(_) => "INVALID_URL",
            Error::Fullscreen(_) => "FULLSCREEN",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::RuntimeClosed => "RUNTIME_CLOSED",
            Error::Internal(_) => "INTERNAL",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}

/// Classified media failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaErrorKind {
    Aborted,
    Network,
    Decode,
    UnsupportedFormat,
    InitializationFailure,
}

impl MediaErrorKind {
    /// Static mapping from the engine's numeric media error code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(MediaErrorKind::Aborted),
            2 => Some(MediaErrorKind::Network),
            3 => Some(MediaErrorKind::Decode),
            4 => Some(MediaErrorKind::UnsupportedFormat),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaErrorKind::Aborted => write!(f, "aborted"),
            MediaErrorKind::Network => write!(f, "network"),
            MediaErrorKind::Decode => write!(f, "decode"),
            MediaErrorKind::UnsupportedFormat => write!(f, "unsupported-format"),
            MediaErrorKind::InitializationFailure => write!(f, "initialization-failure"),
        }
    }
}

/// Containers that browsers commonly refuse even though the engine only
/// reports a generic decode or source error.
const INCOMPATIBLE_CONTAINERS: &[&str] = &["mkv", "avi", "wmv", "flv"];

/// A terminal media failure, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFailure {
    pub kind: MediaErrorKind,
    /// Raw engine code, absent for initialization failures
    pub code: Option<u16>,
    pub message: String,
}

impl MediaFailure {
    /// Engine construction failed before any media event was observed
    pub fn initialization(reason: impl std::fmt::Display) -> Self {
        tracing::debug!(%reason, "Engine initialization failure");
        Self {
            kind: MediaErrorKind::InitializationFailure,
            code: None,
            message: "Failed to initialize video player.".to_string(),
        }
    }
}

/// Message for a container extension known to fail in browsers
fn incompatible_container_message(extension: &str) -> String {
    if extension == "mkv" {
        "MKV files are not supported by web browsers. Please use MP4, WebM, or other web-compatible formats."
            .to_string()
    } else {
        format!(
            "{} files are not supported by web browsers. Please use MP4, WebM, or other web-compatible formats.",
            extension.to_uppercase()
        )
    }
}

/// Classify an engine error code reported for `source_url`.
///
/// Decode and source-not-supported codes on a container known to be
/// browser-incompatible are reported as a contextual unsupported-format
/// failure instead of a generic one.
pub fn classify_media_error(code: u16, source_url: &str) -> MediaFailure {
    let extension = source_extension(source_url);
    let incompatible = extension
        .as_deref()
        .filter(|ext| INCOMPATIBLE_CONTAINERS.contains(ext));

    let (kind, message) = match (MediaErrorKind::from_code(code), incompatible) {
        (Some(MediaErrorKind::Aborted), _) => (
            MediaErrorKind::Aborted,
            "Video playback was aborted.".to_string(),
        ),
        (Some(MediaErrorKind::Network), _) => (
            MediaErrorKind::Network,
            "Network error occurred while loading the video.".to_string(),
        ),
        (Some(MediaErrorKind::Decode | MediaErrorKind::UnsupportedFormat), Some(ext)) => (
            MediaErrorKind::UnsupportedFormat,
            incompatible_container_message(ext),
        ),
        (Some(MediaErrorKind::Decode), None) => (
            MediaErrorKind::Decode,
            "Video format is not supported or corrupted.".to_string(),
        ),
        (Some(MediaErrorKind::UnsupportedFormat), None) => (
            MediaErrorKind::UnsupportedFormat,
            "Video format is not supported by your browser.".to_string(),
        ),
        (Some(MediaErrorKind::InitializationFailure), _) | (None, _) => (
            MediaErrorKind::Decode,
            "Unable to load this video.".to_string(),
        ),
    };

    MediaFailure {
        kind,
        code: Some(code),
        message,
    }
}
