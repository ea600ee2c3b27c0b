//! Replay script format
//!
//! ```json
//! {
//!   "config": { "idle_timeout_ms": 2000 },
//!   "steps": [
//!     { "at_ms": 0, "input": { "load": { "url": "https://cdn.example.com/a.mp4" } } },
//!     { "at_ms": 40, "engine": { "event": "metadata_loaded", "duration": 95.0 } },
//!     { "at_ms": 900, "engine_for": { "session": 0, "event": { "event": "error", "code": 2 } } }
//!   ]
//! }
//! ```

use anyhow::{bail, Context};
use lumen_core::{EngineEvent, PlayerConfig, PlayerInput};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: PlayerConfig,
    pub steps: Vec<Step>,
}

/// One timestamped action
#[derive(Debug, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the replay
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Host input routed to the controller
    Input(PlayerInput),
    /// Event from the most recent engine
    Engine(EngineEvent),
    /// Event from a specific engine, including disposed ones
    EngineFor { session: usize, event: EngineEvent },
}

impl Action {
    pub fn label(&self) -> String {
        match self {
            Action::Input(input) => format!("input {}", compact(input)),
            Action::Engine(event) => format!("engine {}", compact(event)),
            Action::EngineFor { session, event } => {
                format!("engine#{session} {}", compact(event))
            }
        }
    }
}

fn compact<T: std::fmt::Debug>(value: &T) -> String {
    let text = format!("{value:?}");
    if text.chars().count() > 60 {
        format!("{}...", text.chars().take(57).collect::<String>())
    } else {
        text
    }
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let script: Script = serde_json::from_str(&text)
            .with_context(|| format!("parsing script {}", path.display()))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        for pair in self.steps.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                bail!(
                    "steps must be in time order: {}ms follows {}ms",
                    pair[1].at_ms,
                    pair[0].at_ms
                );
            }
        }
        Ok(())
    }
}
