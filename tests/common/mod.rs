//! Shared helpers for integration tests

#![allow(dead_code)]

use std::time::{Duration, Instant};

use quizstack_rs::config::EngineConfig;
use quizstack_rs::engine::{EngineEvent, EngineHandle, StackEngine};
use quizstack_rs::ingest::{ChunkSource, PerCharSource};

/// One well-formed record element
pub fn record_json(id: &str) -> String {
    format!(
        r#"{{"id":"{id}","question":"Question {id}?","options":["first","second","third"],"answer":"second"}}"#
    )
}

/// A full stream payload wrapping the given record ids
pub fn quiz_payload(ids: &[&str]) -> String {
    let records: Vec<String> = ids.iter().map(|id| record_json(id)).collect();
    format!(r#"{{"quizzes":[{}]}}"#, records.join(","))
}

/// Unpaced, autoplay-off config for deterministic ingestion tests
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        chunk_pace_ms: 0,
        autoplay: false,
        ..EngineConfig::default()
    }
}

/// Build an engine over a per-character source and spawn its worker thread
pub fn spawn_engine(
    payload: String,
    config: EngineConfig,
) -> (EngineHandle, std::thread::JoinHandle<()>) {
    let source: Box<dyn ChunkSource> = Box::new(PerCharSource::new(payload));
    let (engine, handle) = StackEngine::new(config, source).expect("engine creation");
    let worker = std::thread::spawn(move || engine.run());
    (handle, worker)
}

/// Poll `cond` until it holds or `timeout` elapses
pub fn wait_for(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Collect events until one matches `stop`, returning everything received
/// and whether the stop event arrived in time
pub fn drain_until(
    handle: &EngineHandle,
    timeout: Duration,
    stop: impl Fn(&EngineEvent) -> bool,
) -> (Vec<EngineEvent>, bool) {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::new();
    loop {
        let now = Instant::now();
        if now >= deadline {
            return (events, false);
        }
        match handle.recv_event_timeout(deadline - now) {
            Ok(event) => {
                let done = stop(&event);
                events.push(event);
                if done {
                    return (events, true);
                }
            }
            Err(_) => return (events, false),
        }
    }
}

/// Ids of every `RecordLoaded` event in `events`, in order
pub fn loaded_ids(events: &[EngineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::RecordLoaded(record) => Some(record.id.clone()),
            _ => None,
        })
        .collect()
}
