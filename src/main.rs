//! QuizStack demo - Main Entry Point
//!
//! Streams a built-in quiz payload through the engine one character at a
//! time, prints cards as they load, then walks the deck with a few cycle
//! commands before shutting down.

use std::time::Duration;

use quizstack_rs::{
    config::EngineConfig,
    engine::{EngineEvent, StackEngine},
    ingest::PerCharSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn demo_payload() -> String {
    serde_json::json!({
        "quizzes": [
            {
                "id": "1",
                "question": "What does stationarity mean?",
                "options": [
                    "Explosive growth over time",
                    "Data trends with time",
                    "Only seasonal patterns exist",
                    "Mean and variance stay constant"
                ],
                "answer": "Mean and variance stay constant"
            },
            {
                "id": "2",
                "question": "What is the main purpose of a time series model?",
                "options": [
                    "To predict future values",
                    "To store historical data",
                    "To visualize trends",
                    "To calculate averages"
                ],
                "answer": "To predict future values"
            },
            {
                "id": "3",
                "question": "What is autocorrelation?",
                "options": [
                    "Correlation between different variables",
                    "Correlation of a variable with itself at different times",
                    "No correlation at all",
                    "Correlation with external factors"
                ],
                "answer": "Correlation of a variable with itself at different times"
            },
            {
                "id": "4",
                "question": "What is the ARIMA model used for?",
                "options": [
                    "Classification tasks",
                    "Forecasting time series data",
                    "Image processing",
                    "Text analysis"
                ],
                "answer": "Forecasting time series data"
            }
        ]
    })
    .to_string()
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,quizstack_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuizStack demo");

    let config = EngineConfig::default();
    let source = Box::new(PerCharSource::new(demo_payload()));
    let (engine, handle) = StackEngine::new(config, source)?;

    let worker_handle = std::thread::spawn(move || engine.run());

    handle.start_ingestion()?;

    // Drain events until the stream is fully consumed.
    loop {
        match handle.recv_event_timeout(Duration::from_secs(10))? {
            EngineEvent::RecordLoaded(record) => {
                tracing::info!(id = %record.id, "Loaded: {}", record.question);
            }
            EngineEvent::DeckChanged(order) => {
                tracing::debug!(?order, "Deck order changed");
            }
            EngineEvent::IngestionComplete => {
                tracing::info!(cards = handle.deck_len(), "Stream complete");
                break;
            }
            EngineEvent::IngestionFailed(reason) => {
                anyhow::bail!("ingestion failed: {reason}");
            }
            EngineEvent::Shutdown => {
                anyhow::bail!("engine stopped before the stream completed");
            }
        }
    }

    let progress = handle.ingestion_progress();
    tracing::info!(
        bytes = progress.bytes_consumed,
        "Progress {:.0}%",
        progress.fraction().unwrap_or(0.0) * 100.0
    );

    // Walk the cycle: two steps forward, one back.
    handle.next()?;
    handle.next()?;
    handle.prev()?;
    std::thread::sleep(Duration::from_millis(100));
    if let Some(id) = handle.topmost_id() {
        let record = handle.record(&id);
        tracing::info!(
            %id,
            "Topmost card: {}",
            record.map(|r| r.question).unwrap_or_default()
        );
    }

    handle.shutdown()?;
    worker_handle
        .join()
        .map_err(|_| anyhow::anyhow!("engine worker panicked"))?;
    tracing::info!("Done");
    Ok(())
}
