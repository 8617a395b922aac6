//! Sensor Sample Entity and Payload Codec
//!
//! One `SensorSample` is built per publish tick, serialized to a flat JSON
//! object and handed to the transport. Absent channels (hardware variant
//! with a silent PID) are omitted from the payload entirely.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payload encode/decode errors
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single telemetry reading, timestamped with wall-clock seconds.
///
/// The simulated generator fills all five core channels on every tick; the
/// hardware reader fills whatever the vehicle answered. `None` fields never
/// appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Seconds since the Unix epoch
    pub timestamp: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle_percent: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_temp_c: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub oil_temp_c: Option<i64>,

    /// Intake air temperature, hardware variant only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_temp_c: Option<i64>,

    /// Short-term fuel trim bank 1, hardware variant only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_term_fuel_trim_percent: Option<i64>,

    /// Long-term fuel trim bank 1, hardware variant only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_term_fuel_trim_percent: Option<i64>,

    /// OBD adapter supply voltage, hardware variant only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_voltage_v: Option<f64>,
}

impl SensorSample {
    /// Create an empty sample at the given timestamp
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    /// Number of channels carrying a value (timestamp excluded)
    pub fn channel_count(&self) -> usize {
        [
            self.rpm.is_some(),
            self.speed_kmh.is_some(),
            self.throttle_percent.is_some(),
            self.engine_temp_c.is_some(),
            self.oil_temp_c.is_some(),
            self.air_temp_c.is_some(),
            self.short_term_fuel_trim_percent.is_some(),
            self.long_term_fuel_trim_percent.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count()
            + usize::from(self.adapter_voltage_v.is_some())
    }

    /// True when the sample carries at least one channel besides the timestamp
    pub fn has_data(&self) -> bool {
        self.channel_count() > 0
    }

    /// Serialize to the wire payload (compact JSON)
    pub fn to_payload(&self) -> Result<Vec<u8>, PayloadError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a wire payload back into a sample
    pub fn from_payload(payload: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_omits_absent_channels() {
        let sample = SensorSample {
            timestamp: 1_700_000_000,
            speed_kmh: Some(80),
            engine_temp_c: Some(91),
            ..Default::default()
        };

        let payload = sample.to_payload().unwrap();
        let text = std::str::from_utf8(&payload).unwrap();

        assert!(text.contains("\"speed_kmh\":80"));
        assert!(text.contains("\"engine_temp_c\":91"));
        assert!(!text.contains("rpm"));
        assert!(!text.contains("throttle_percent"));
    }

    #[test]
    fn test_payload_round_trip() {
        let sample = SensorSample {
            timestamp: 1_700_000_123,
            rpm: Some(4500),
            speed_kmh: Some(70),
            throttle_percent: Some(50),
            engine_temp_c: Some(95),
            oil_temp_c: Some(130),
            ..Default::default()
        };

        let decoded = SensorSample::from_payload(&sample.to_payload().unwrap()).unwrap();
        assert_eq!(decoded, sample);
        assert_eq!(decoded.channel_count(), 5);
    }

    #[test]
    fn test_timestamp_only_sample_has_no_data() {
        assert!(!SensorSample::new(0).has_data());
        assert!(SensorSample {
            adapter_voltage_v: Some(12.4),
            ..SensorSample::new(0)
        }
        .has_data());
    }
}
