//! Lumen Core - Interactive playback control for a single media player
//!
//! This crate provides the control logic that sits between user input and a
//! media decoding engine:
//! - Touch gesture recognition (tap, double tap, vertical drag)
//! - Pointer idle timer for the control overlay
//! - Media session adapter with generation-tagged engine events
//! - Playback state reducer and settings menu
//! - Render model for the host UI
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Lumen Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐          │
//! │  │   Gesture    │  │  Idle Timer  │  │   Keyboard   │          │
//! │  │  Recognizer  │  │              │  │   Bindings   │          │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘          │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │ Intent                              │
//! │                    ┌──────┴──────┐                              │
//! │                    │   Player    │───── Settings Menu           │
//! │                    │ Controller  │───── Host (fullscreen/close) │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐           │
//! │  │  Playback    │◄─│   Session   │──│    Media     │           │
//! │  │    State     │  │   Adapter   │  │    Engine    │           │
//! │  └──────────────┘  └─────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod host;
pub mod idle;
pub mod input;
pub mod runtime;
pub mod settings;
pub mod source;
pub mod state;
pub mod timer;
pub mod types;
pub mod view;

pub use adapter::{MediaSessionAdapter, MediaUpdate};
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use config::PlayerConfig;
pub use controller::PlayerController;
pub use engine::{
    EngineEvent, EngineFactory, MediaEngine, RecordingFactory, SessionEvent, SessionEventReceiver,
};
pub use error::{classify_media_error, Error, MediaErrorKind, MediaFailure, Result};
pub use gesture::GestureRecognizer;
pub use host::{PlayerHost, RecordingHost};
pub use input::{ClickTarget, Intent, Key};
pub use runtime::{PlayerHandle, PlayerInput, PlayerRuntime, PlayerSnapshot};
pub use source::MediaSource;
pub use state::{DisplayMode, PlaybackState, PlaybackStatus};
pub use types::*;
pub use view::PlayerView;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Lumen Core initialized");
}
