//! Demo OBD-II Data Publisher
//!
//! Publishes simulated sensor data (RPM, speed, throttle, engine and oil
//! temperature) to a public MQTT broker at a fixed cadence until
//! interrupted.

use anyhow::Result;
use mqtt_link::MqttTransport;
use obd_publisher::{init_logging, PublisherConfig, PublisherLoop, SimSampler};
use telemetry_types::SystemClock;
use tokio::sync::watch;
use tracing::info;

const DEFAULT_INTERVAL_SECS: f64 = 0.2;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = PublisherConfig::from_env(DEFAULT_INTERVAL_SECS)?;
    info!("Starting demo publisher");
    info!(
        "Broker: {}:{}  Topic: {}  Interval: {:?}",
        config.broker_host, config.broker_port, config.topic, config.interval
    );

    let transport = MqttTransport::new(config.mqtt("demo-publisher"));
    let publisher = PublisherLoop::new(
        SimSampler::default(),
        transport,
        SystemClock::new(),
        config.topic.clone(),
        config.interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    publisher.run(shutdown_rx).await;
    info!("Publisher stopped");
    Ok(())
}
