//! Consumer-Side Configuration
//!
//! Consumers default to the wildcard topic filter so every publisher under
//! the project prefix is picked up.

use mqtt_link::MqttConfig;
use telemetry_types::{env_parse, env_string, ConfigError};

const DEFAULT_BROKER_HOST: &str = "broker.hivemq.com";
const DEFAULT_BROKER_PORT: u16 = 1883;
const DEFAULT_TOPIC_FILTER: &str = "bilprojekt72439/obd/#";

/// Broker and topic settings for subscribing processes
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            broker_host: env_string("MQTT_BROKER_HOST", DEFAULT_BROKER_HOST),
            broker_port: env_parse("MQTT_BROKER_PORT", DEFAULT_BROKER_PORT)?,
            topic: env_string("MQTT_TOPIC", DEFAULT_TOPIC_FILTER),
        })
    }

    /// Broker settings for the transport layer
    pub fn mqtt(&self, client_id: &str) -> MqttConfig {
        MqttConfig {
            host: self.broker_host.clone(),
            port: self.broker_port,
            client_id: client_id.to_string(),
        }
    }
}
