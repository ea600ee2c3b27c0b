//! Async host for a [`PlayerController`]
//!
//! Runs the controller on a tokio task. Host input arrives over a bounded
//! channel, engine events over the session channel, and timer deadlines are
//! awaited with `sleep_until`. Every change is published on a watch channel.

use crate::{
    clock::TokioClock,
    controller::PlayerController,
    engine::{coalesce_events, EngineFactory, SessionEvent},
    host::PlayerHost,
    input::{ClickTarget, Intent, Key},
    source::MediaSource,
    state::PlaybackState,
    types::{AspectRatioMode, InputMode, Point, Viewport},
    view::PlayerView,
    Error, PlayerConfig, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

const INPUT_CAPACITY: usize = 64;

/// Input from the host platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerInput {
    Load(MediaSource),
    Unload,
    Intent(Intent),
    /// Key press. Hosts decide default-prevention with [`Key::prevents_default`].
    Key(Key),
    TouchStart { at: Point, viewport: Viewport },
    TouchMove { at: Point, viewport: Viewport },
    TouchEnd,
    PointerMove,
    PointerLeave,
    Click(ClickTarget),
    DoubleClick,
    SetInputMode(InputMode),
    FullscreenChanged(bool),
    SelectSpeed(f64),
    SelectAspectRatio(AspectRatioMode),
}

impl PlayerInput {
    /// Route this input to the controller
    pub fn apply(self, controller: &mut PlayerController) -> Result<()> {
        match self {
            PlayerInput::Load(source) => controller.load(source),
            PlayerInput::Unload => controller.unload(),
            PlayerInput::Intent(intent) => controller.dispatch(intent)?,
            PlayerInput::Key(key) => {
                controller.key_down(key);
            }
            PlayerInput::TouchStart { at, viewport } => controller.touch_start(at, viewport),
            PlayerInput::TouchMove { at, viewport } => controller.touch_move(at, viewport),
            PlayerInput::TouchEnd => controller.touch_end(),
            PlayerInput::PointerMove => controller.pointer_move(),
            PlayerInput::PointerLeave => controller.pointer_leave(),
            PlayerInput::Click(target) => controller.click(target),
            PlayerInput::DoubleClick => controller.double_click(),
            PlayerInput::SetInputMode(mode) => controller.set_input_mode(mode),
            PlayerInput::FullscreenChanged(active) => controller.fullscreen_changed(active),
            PlayerInput::SelectSpeed(rate) => controller.select_speed(rate)?,
            PlayerInput::SelectAspectRatio(mode) => controller.select_aspect_ratio(mode),
        }
        Ok(())
    }
}

/// Published after every input, engine event or timer firing that changed something
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub view: PlayerView,
}

impl PlayerSnapshot {
    fn capture(controller: &PlayerController) -> Self {
        Self {
            state: controller.state().clone(),
            view: controller.view(),
        }
    }
}

pub struct PlayerRuntime;

impl PlayerRuntime {
    /// Spawn a controller on the current tokio runtime
    #[instrument(skip_all)]
    pub fn spawn(
        config: PlayerConfig,
        factory: Box<dyn EngineFactory>,
        host: Box<dyn PlayerHost>,
    ) -> Result<PlayerHandle> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller =
            PlayerController::new(config, factory, host, Arc::new(TokioClock), events_tx)?;

        let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(PlayerSnapshot::capture(&controller));

        let task = tokio::spawn(run(controller, inputs_rx, events_rx, snapshot_tx));
        info!("Player runtime started");

        Ok(PlayerHandle {
            inputs: inputs_tx,
            snapshot: snapshot_rx,
            task,
        })
    }
}

/// Handle to a running player
pub struct PlayerHandle {
    inputs: mpsc::Sender<PlayerInput>,
    snapshot: watch::Receiver<PlayerSnapshot>,
    task: JoinHandle<()>,
}

impl PlayerHandle {
    pub async fn send(&self, input: PlayerInput) -> Result<()> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| Error::RuntimeClosed)
    }

    /// Latest published playback state
    pub fn state(&self) -> PlaybackState {
        self.snapshot.borrow().state.clone()
    }

    pub fn view(&self) -> PlayerView {
        self.snapshot.borrow().view.clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.clone()
    }

    /// True once the player has closed or shut down
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the runtime. Timers are cancelled and the session disposed.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<()> {
        drop(self.inputs);
        self.task
            .await
            .map_err(|e| Error::Internal(format!("player task failed: {e}")))?;
        info!("Player runtime stopped");
        Ok(())
    }
}

async fn run(
    mut controller: PlayerController,
    mut inputs: mpsc::Receiver<PlayerInput>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    snapshot: watch::Sender<PlayerSnapshot>,
) {
    loop {
        let deadline = controller.next_deadline();

        tokio::select! {
            input = inputs.recv() => {
                let Some(input) = input else {
                    debug!("Input channel closed");
                    break;
                };
                if let Err(e) = input.apply(&mut controller) {
                    warn!(error = %e, code = e.error_code(), "Input rejected");
                }
            }
            Some(event) = events.recv() => {
                let mut batch = vec![event];
                while let Ok(event) = events.try_recv() {
                    batch.push(event);
                }
                let received = batch.len();
                let batch = coalesce_events(batch);
                if batch.len() < received {
                    trace!(received, applied = batch.len(), "Coalesced engine events");
                }
                for event in batch {
                    controller.handle_session_event(event);
                }
            }
            _ = wait_until(deadline) => {
                controller.poll_timers();
            }
        }

        let next = PlayerSnapshot::capture(&controller);
        snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });

        if controller.is_closed() {
            break;
        }
    }

    controller.teardown();
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending::<()>().await,
    }
}
