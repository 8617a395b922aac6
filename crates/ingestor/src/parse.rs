//! Payload Fan-Out
//!
//! One inbound message becomes one point per data field. The payload's
//! `timestamp` (epoch seconds) stamps every point; a payload without one is
//! stamped with the receive time instead.

use serde_json::Value;
use tracing::debug;

/// One field of one payload, ready for the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub key: String,
    pub timestamp_ms: i64,
    pub value: i64,
}

/// Explode a payload into store points
///
/// Returns `None` when the payload is not a JSON object. Fields that are not
/// numeric are skipped individually; floats are truncated the way the
/// dashboard expects integers.
pub fn explode_payload(payload: &[u8], fallback_epoch_secs: i64) -> Option<Vec<SeriesPoint>> {
    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(e) => {
            debug!("Skipping unparseable payload: {}", e);
            return None;
        }
    };
    let object = value.as_object()?;

    let timestamp_secs = object
        .get("timestamp")
        .and_then(Value::as_i64)
        .unwrap_or(fallback_epoch_secs);
    let timestamp_ms = timestamp_secs * 1000;

    let mut points = Vec::with_capacity(object.len().saturating_sub(1));
    for (key, field) in object {
        if key == "timestamp" {
            continue;
        }
        let value = match field {
            Value::Number(n) => match n.as_i64() {
                Some(v) => v,
                None => match n.as_f64() {
                    Some(f) => f as i64,
                    None => continue,
                },
            },
            _ => {
                debug!("Skipping non-numeric field {}", key);
                continue;
            }
        };
        points.push(SeriesPoint {
            key: key.clone(),
            timestamp_ms,
            value,
        });
    }

    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sample_fans_out() {
        let payload = br#"{"timestamp": 1700000000, "rpm": 4500, "speed_kmh": 70,
                           "throttle_percent": 50, "engine_temp_c": 95, "oil_temp_c": 130}"#;
        let mut points = explode_payload(payload, 0).unwrap();
        points.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.timestamp_ms == 1_700_000_000_000));
        assert_eq!(points[3].key, "speed_kmh");
        assert_eq!(points[3].value, 70);
    }

    #[test]
    fn test_missing_timestamp_uses_receive_time() {
        let points = explode_payload(br#"{"rpm": 3000}"#, 1_700_000_999).unwrap();
        assert_eq!(points[0].timestamp_ms, 1_700_000_999_000);
    }

    #[test]
    fn test_non_numeric_fields_are_skipped() {
        let payload = br#"{"timestamp": 1, "rpm": 3000, "vin": "WVWZZZ", "flag": true}"#;
        let points = explode_payload(payload, 0).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].key, "rpm");
    }

    #[test]
    fn test_floats_are_truncated() {
        let points = explode_payload(br#"{"timestamp": 1, "adapter_voltage_v": 12.6}"#, 0).unwrap();
        assert_eq!(points[0].value, 12);
    }

    #[test]
    fn test_malformed_payloads_are_rejected() {
        assert!(explode_payload(b"not json", 0).is_none());
        assert!(explode_payload(b"[1, 2, 3]", 0).is_none());
    }
}
