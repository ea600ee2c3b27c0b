//! CLI command implementations

use crate::output::{emit, OutputFormat};
use crate::script::{Action, Script};
use anyhow::Context;
use lumen_core::{
    classify_media_error,
    engine::EngineCommand,
    host::HostCall,
    source::{infer_mime_type, source_extension},
    Clock, ManualClock, MediaFailure, PlayerConfig, PlayerController, PlayerView,
    RecordingFactory, RecordingHost, SessionEventReceiver,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Controller state after one replay step or timer firing
#[derive(Debug, Serialize)]
pub struct Frame {
    pub at_ms: u64,
    pub action: String,
    pub view: PlayerView,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub frames: Vec<Frame>,
    /// Commands received by each engine, in construction order
    pub engine_commands: Vec<Vec<EngineCommand>>,
    pub host_calls: Vec<HostCall>,
}

struct Replay {
    controller: PlayerController,
    events: SessionEventReceiver,
    clock: ManualClock,
    start: Instant,
    frames: Vec<Frame>,
}

impl Replay {
    fn elapsed_ms(&self) -> u64 {
        self.clock.now().duration_since(self.start).as_millis() as u64
    }

    fn record(&mut self, action: String) {
        self.frames.push(Frame {
            at_ms: self.elapsed_ms(),
            action,
            view: self.controller.view(),
        });
    }

    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.controller.handle_session_event(event);
        }
    }

    /// Fire every timer due at or before `until`, in deadline order
    fn run_timers(&mut self, until: Option<Instant>) {
        while let Some(deadline) = self.controller.next_deadline() {
            if until.is_some_and(|until| deadline > until) {
                break;
            }
            self.clock.set(deadline);
            self.controller.poll_timers();
            self.record("timer".to_string());
        }
    }
}

/// Replay a script against a recording engine
pub fn replay(path: &Path, settle: bool, format: OutputFormat) -> anyhow::Result<()> {
    let report = run_replay(path, settle)?;
    emit(&report, format, render_report)
}

fn run_replay(path: &Path, settle: bool) -> anyhow::Result<ReplayReport> {
    let script = Script::load(path)?;
    info!(steps = script.steps.len(), "Replaying script");

    let factory = RecordingFactory::new();
    let host = RecordingHost::new();
    let clock = ManualClock::new();
    let (controller, events) = PlayerController::with_channel(
        script.config,
        Box::new(factory.clone()),
        Box::new(host.clone()),
        Arc::new(clock.clone()),
    )
    .context("creating controller")?;

    let mut replay = Replay {
        controller,
        events,
        start: clock.now(),
        clock,
        frames: Vec::new(),
    };

    for step in script.steps {
        let at = replay.start + Duration::from_millis(step.at_ms);
        replay.run_timers(Some(at));
        replay.clock.set(at);

        let mut label = step.action.label();
        match step.action {
            Action::Input(input) => {
                if let Err(e) = input.apply(&mut replay.controller) {
                    warn!(error = %e, "Input rejected");
                    label = format!("{label} (rejected: {e})");
                }
            }
            Action::Engine(event) => {
                if !factory.emit_latest(event) {
                    label = format!("{label} (no engine)");
                }
            }
            Action::EngineFor { session, event } => {
                if !factory.emit(session, event) {
                    label = format!("{label} (no engine)");
                }
            }
        }
        replay.drain();
        debug!(at_ms = step.at_ms, %label, "Step applied");
        replay.record(label);

        if replay.controller.is_closed() {
            info!("Player closed; ending replay");
            break;
        }
    }

    if settle {
        replay.run_timers(None);
    }

    Ok(ReplayReport {
        frames: replay.frames,
        engine_commands: (0..factory.session_count())
            .map(|i| factory.commands(i))
            .collect(),
        host_calls: host.calls(),
    })
}

fn render_report(report: &ReplayReport) -> String {
    let mut out = String::new();
    for frame in &report.frames {
        let view = &frame.view;
        out.push_str(&format!(
            "[{:>6}ms] {:<40} {:<10} {}/{} vol={}% rate={} controls={}{}{}\n",
            frame.at_ms,
            frame.action,
            view.status,
            view.current_time,
            view.duration,
            view.volume_percent,
            view.playback_rate,
            if view.controls_visible { "on" } else { "off" },
            if view.settings.is_some() { " menu" } else { "" },
            if view.is_fullscreen { " fullscreen" } else { "" },
        ));
        if let Some(panel) = &view.error_panel {
            out.push_str(&format!("           {}: {}\n", panel.title, panel.message));
        }
    }

    for (i, commands) in report.engine_commands.iter().enumerate() {
        out.push_str(&format!("\nEngine #{i}:\n"));
        for command in commands {
            out.push_str(&format!("  {command:?}\n"));
        }
    }

    if !report.host_calls.is_empty() {
        out.push_str("\nHost calls:\n");
        for call in &report.host_calls {
            out.push_str(&format!("  {call:?}\n"));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct MimeReport<'a> {
    url: &'a str,
    extension: Option<String>,
    mime_type: &'static str,
}

/// Print the MIME type inferred from a media URL
pub fn mime(url: &str, format: OutputFormat) -> anyhow::Result<()> {
    let report = MimeReport {
        url,
        extension: source_extension(url),
        mime_type: infer_mime_type(url),
    };
    emit(&report, format, |r| r.mime_type.to_string())
}

/// Print how an engine error code is classified for a source URL
pub fn classify(url: &str, code: u16, format: OutputFormat) -> anyhow::Result<()> {
    let failure = classify_media_error(code, url);
    emit(&failure, format, |f: &MediaFailure| {
        format!("{} ({}): {}", f.kind, code, f.message)
    })
}

/// Print the default configuration, or validate a configuration file
pub fn config(check: Option<&Path>) -> anyhow::Result<()> {
    match check {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config = PlayerConfig::from_json(&text)?;
            println!("{} is valid", path.display());
            println!("{}", crate::output::to_json(&config)?);
        }
        None => println!("{}", crate::output::to_json(&PlayerConfig::default())?),
    }
    Ok(())
}
