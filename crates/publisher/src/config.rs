//! Publisher Configuration

use mqtt_link::MqttConfig;
use std::time::Duration;
use telemetry_types::{env_parse, env_string, ConfigError};

const DEFAULT_BROKER_HOST: &str = "broker.hivemq.com";
const DEFAULT_BROKER_PORT: u16 = 1883;
const DEFAULT_TOPIC: &str = "bilprojekt72439/obd/data";

/// Settings shared by both publisher binaries
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub interval: Duration,
}

impl PublisherConfig {
    /// Load from the environment
    ///
    /// `default_interval_secs` differs per variant: 0.2s for the simulator,
    /// 1.0s for the hardware reader.
    pub fn from_env(default_interval_secs: f64) -> Result<Self, ConfigError> {
        let interval_secs: f64 = env_parse("PUBLISH_INTERVAL", default_interval_secs)?;
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(ConfigError {
                key: "PUBLISH_INTERVAL".to_string(),
                value: interval_secs.to_string(),
                reason: "must be a positive number of seconds".to_string(),
            });
        }

        Ok(Self {
            broker_host: env_string("MQTT_BROKER_HOST", DEFAULT_BROKER_HOST),
            broker_port: env_parse("MQTT_BROKER_PORT", DEFAULT_BROKER_PORT)?,
            topic: env_string("MQTT_TOPIC", DEFAULT_TOPIC),
            interval: Duration::from_secs_f64(interval_secs),
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

/// Serial adapter settings for the hardware variant
#[derive(Debug, Clone)]
pub struct ObdLinkConfig {
    pub port: String,
    pub baud: u32,
}

impl ObdLinkConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_string("OBD_PORT", "/dev/ttyUSB0"),
            baud: env_parse("OBD_BAUD", 115_200)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: these cases share the PUBLISH_INTERVAL variable and the
    // test harness runs #[test] functions in parallel.
    #[test]
    fn test_interval_defaults_and_validation() {
        let config = PublisherConfig::from_env(0.2).unwrap();
        assert_eq!(config.broker_host, "broker.hivemq.com");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.topic, "bilprojekt72439/obd/data");
        assert_eq!(config.interval, Duration::from_millis(200));

        std::env::set_var("PUBLISH_INTERVAL", "0");
        let err = PublisherConfig::from_env(0.2).unwrap_err();
        assert_eq!(err.key, "PUBLISH_INTERVAL");
        std::env::remove_var("PUBLISH_INTERVAL");
    }
}
