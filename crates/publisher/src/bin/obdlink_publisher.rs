//! OBDLink Hardware Publisher
//!
//! Reads a small set of OBD-II PIDs through an OBDLink SX (ELM327-
//! compatible) adapter on USB serial and publishes whatever datapoints the
//! vehicle answers. Survives USB disconnects and car power cycles; a PID
//! with no response is omitted from that tick rather than failing it.

use anyhow::Result;
use mqtt_link::MqttTransport;
use obd_adapter::ElmClient;
use obd_publisher::{init_logging, ObdLinkConfig, ObdSampler, PublisherConfig, PublisherLoop};
use telemetry_types::SystemClock;
use tokio::sync::watch;
use tracing::info;

const DEFAULT_INTERVAL_SECS: f64 = 1.0;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = PublisherConfig::from_env(DEFAULT_INTERVAL_SECS)?;
    let obd = ObdLinkConfig::from_env()?;
    info!("Starting OBDLink publisher");
    info!(
        "Broker: {}:{}  Topic: {}  Port: {} @ {} baud  Interval: {:?}",
        config.broker_host, config.broker_port, config.topic, obd.port, obd.baud, config.interval
    );

    let transport = MqttTransport::new(config.mqtt("obdlink-publisher"));
    let sampler = ObdSampler::new(ElmClient::serial(&obd.port, obd.baud));
    let publisher = PublisherLoop::new(
        sampler,
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
