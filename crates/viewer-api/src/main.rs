//! Telemetry Viewer - Main Entry Point
//!
//! Runs the MQTT ingestor and the dashboard HTTP server against one shared
//! in-memory series store.

use anyhow::Result;
use mqtt_ingestor::{ConsumerConfig, Ingestor};
use mqtt_link::MqttTransport;
use series_store::SeriesStore;
use std::sync::Arc;
use telemetry_types::SystemClock;
use tokio::sync::watch;
use tracing::info;
use viewer_api::{create_router, init_logging, AppState, ViewerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = ViewerConfig::from_env()?;
    let consumer = ConsumerConfig::from_env()?;
    info!("Starting telemetry viewer on {}", config.addr);
    info!(
        "Ingesting {} from {}:{}",
        consumer.topic, consumer.broker_host, consumer.broker_port
    );

    let store = Arc::new(SeriesStore::new(config.retention));

    let transport = MqttTransport::new(consumer.mqtt("viewer-ingestor"));
    let ingestor = Ingestor::new(
        transport,
        SystemClock::new(),
        consumer.topic.clone(),
        Arc::clone(&store),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ingest_task = tokio::spawn(ingestor.run(shutdown_rx));

    let state = Arc::new(AppState::new(store));
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Interrupt received; shutting down");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    ingest_task.await?;
    info!("Viewer stopped");
    Ok(())
}
