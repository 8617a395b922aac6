//! Simple MQTT Subscriber
//!
//! Subscribes to the telemetry topic filter on the public broker and prints
//! incoming messages to the terminal, re-indenting JSON payloads when
//! possible. Debug tool; runs until interrupted.

use anyhow::Result;
use mqtt_link::{Backoff, MqttConfig, MqttTransport, Transport};
use telemetry_types::{env_parse, env_string};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn render(payload: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_default(),
        Err(_) => String::from_utf8_lossy(payload).into_owned(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let host = env_string("MQTT_BROKER_HOST", "broker.hivemq.com");
    let port: u16 = env_parse("MQTT_BROKER_PORT", 1883)?;
    let topic = env_string("MQTT_TOPIC", "bilprojekt72439/obd/#");

    info!("Starting simple MQTT subscriber");
    info!("Broker: {}:{}  Topic: {}", host, port, topic);

    let mut transport = MqttTransport::new(MqttConfig {
        host,
        port,
        client_id: "obd-subscriber".to_string(),
    });

    let mut backoff = Backoff::new();
    loop {
        match transport.connect().await {
            Ok(()) => break,
            Err(e) => {
                let delay = backoff.next_delay();
                warn!("Connect failed: {}; retrying in {:?}", e, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
    transport.subscribe(&topic).await?;

    loop {
        tokio::select! {
            result = transport.next_message() => match result {
                Ok(message) => {
                    println!("\nTopic: {}\n{}", message.topic, render(&message.payload));
                }
                Err(e) => {
                    warn!("Subscriber stream lost: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; exiting");
                break;
            }
        }
    }

    transport.disconnect().await;
    Ok(())
}
