//! Benchmark tests for lumen-core operations
//!
//! Run with: cargo bench -p lumen-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use lumen_core::engine::EngineEvent;
use lumen_core::error::classify_media_error;
use lumen_core::gesture::{GestureContext, GestureRecognizer};
use lumen_core::source::infer_mime_type;
use lumen_core::view::format_time;
use lumen_core::{
    ManualClock, MediaSource, PlayerConfig, PlayerController, Point, RecordingFactory,
    RecordingHost, SessionEventReceiver, Viewport,
};

// ============================================================================
// Helpers
// ============================================================================

fn playing_controller() -> (
    PlayerController,
    RecordingFactory,
    SessionEventReceiver,
) {
    let factory = RecordingFactory::new();
    let (mut controller, mut events) = PlayerController::with_channel(
        PlayerConfig::default(),
        Box::new(factory.clone()),
        Box::new(RecordingHost::new()),
        Arc::new(ManualClock::new()),
    )
    .unwrap();

    controller.load(MediaSource::new(
        Url::parse("https://cdn.example.com/title/main.mp4").unwrap(),
    ));
    factory.emit_latest(EngineEvent::MetadataLoaded { duration: 5400.0 });
    factory.emit_latest(EngineEvent::Playing);
    while let Ok(event) = events.try_recv() {
        controller.handle_session_event(event);
    }
    (controller, factory, events)
}

// ============================================================================
// Gesture Benchmarks
// ============================================================================

fn bench_gesture_drag(c: &mut Criterion) {
    let config = PlayerConfig::default();
    let viewport = Viewport::new(1080.0, 1920.0);
    let ctx = GestureContext {
        volume: 0.5,
        brightness: 100.0,
    };

    let mut group = c.benchmark_group("Gesture Drag");

    for moves in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(moves), &moves, |b, &moves| {
            b.iter(|| {
                let mut recognizer = GestureRecognizer::new(&config);
                let t0 = Instant::now();
                recognizer.touch_start(Point::new(900.0, 960.0), viewport, t0);
                for i in 0..moves {
                    let y = 960.0 - (i as f64 % 800.0);
                    black_box(recognizer.touch_move(Point::new(900.0, y), viewport, ctx));
                }
                recognizer.touch_end(t0 + Duration::from_millis(500));
            });
        });
    }

    group.finish();
}

fn bench_gesture_taps(c: &mut Criterion) {
    let config = PlayerConfig::default();
    let viewport = Viewport::new(1080.0, 1920.0);

    c.bench_function("gesture_tap_sequence", |b| {
        b.iter(|| {
            let mut recognizer = GestureRecognizer::new(&config);
            let mut now = Instant::now();
            for _ in 0..50 {
                black_box(recognizer.touch_start(Point::new(200.0, 400.0), viewport, now));
                recognizer.touch_end(now);
                now += Duration::from_millis(150);
                black_box(recognizer.poll(now));
            }
        });
    });
}

// ============================================================================
// Reducer Benchmarks
// ============================================================================

fn bench_time_updates(c: &mut Criterion) {
    let (mut controller, factory, mut events) = playing_controller();

    c.bench_function("time_update_reduce", |b| {
        let mut t = 0.0;
        b.iter(|| {
            t = (t + 0.25) % 5400.0;
            factory.emit_latest(EngineEvent::TimeUpdate { current_time: t });
            while let Ok(event) = events.try_recv() {
                black_box(controller.handle_session_event(event));
            }
        });
    });
}

fn bench_stale_events(c: &mut Criterion) {
    let (mut controller, factory, mut events) = playing_controller();
    controller.load(MediaSource::new(
        Url::parse("https://cdn.example.com/title/other.webm").unwrap(),
    ));

    c.bench_function("stale_event_drop", |b| {
        b.iter(|| {
            factory.emit(0, EngineEvent::Progress { buffered_end: 60.0 });
            while let Ok(event) = events.try_recv() {
                black_box(controller.handle_session_event(event));
            }
        });
    });
}

fn bench_view(c: &mut Criterion) {
    let (controller, _factory, _events) = playing_controller();

    c.bench_function("view_build", |b| b.iter(|| black_box(controller.view())));
    c.bench_function("format_time", |b| b.iter(|| format_time(black_box(3725.4))));
}

// ============================================================================
// Classification Benchmarks
// ============================================================================

fn bench_classification(c: &mut Criterion) {
    let urls = [
        "https://cdn.example.com/a.mp4",
        "https://cdn.example.com/b.mkv?token=abc",
        "https://cdn.example.com/c.m3u8",
        "https://cdn.example.com/d",
    ];

    let mut group = c.benchmark_group("Classification");

    group.bench_function("infer_mime_type", |b| {
        b.iter(|| {
            for url in &urls {
                black_box(infer_mime_type(url));
            }
        })
    });

    group.bench_function("classify_media_error", |b| {
        b.iter(|| {
            for url in &urls {
                for code in 1..=4 {
                    black_box(classify_media_error(code, url));
                }
            }
        })
    });

    group.finish();
}

criterion_group!(gesture_benches, bench_gesture_drag, bench_gesture_taps);

criterion_group!(
    reducer_benches,
    bench_time_updates,
    bench_stale_events,
    bench_view,
);

criterion_group!(classification_benches, bench_classification);

criterion_main!(gesture_benches, reducer_benches, classification_benches);
