//! Headless player example
//!
//! Drives a player runtime with a recording engine and prints the view after
//! each step.
//!
//! Run with: cargo run -p lumen-core --example headless

use lumen_core::{
    EngineEvent, Intent, MediaSource, PlayerConfig, PlayerInput, PlayerRuntime,
    RecordingFactory, RecordingHost,
};
use std::time::Duration;
use url::Url;

#[tokio::main]
async fn main() -> lumen_core::Result<()> {
    println!("Lumen Core - Headless Player Example");
    println!("====================================\n");

    let factory = RecordingFactory::new();
    let handle = PlayerRuntime::spawn(
        PlayerConfig::default(),
        Box::new(factory.clone()),
        Box::new(RecordingHost::new()),
    )?;

    let origin = Url::parse("https://media.example.com/")?;
    let source = MediaSource::resolve("films/arrival.mp4", &origin)?.with_title("Arrival");
    handle.send(PlayerInput::Load(source)).await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    print_view("after load", &handle);

    factory.emit_latest(EngineEvent::MetadataLoaded { duration: 6960.0 });
    factory.emit_latest(EngineEvent::Playing);
    factory.emit_latest(EngineEvent::TimeUpdate { current_time: 125.0 });
    tokio::time::sleep(Duration::from_millis(10)).await;
    print_view("playing", &handle);

    handle
        .send(PlayerInput::Intent(Intent::SetPlaybackRate(1.5)))
        .await?;
    handle.send(PlayerInput::Intent(Intent::ToggleMute)).await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    print_view("muted at 1.5x", &handle);

    handle.shutdown().await?;
    println!("\nEngine commands:");
    for command in factory.commands(0) {
        println!("  {command:?}");
    }

    Ok(())
}

fn print_view(label: &str, handle: &lumen_core::PlayerHandle) {
    let view = handle.view();
    println!(
        "[{label}] {} {} / {}  rate={}  volume={}%",
        view.status, view.current_time, view.duration, view.playback_rate, view.volume_percent
    );
}
