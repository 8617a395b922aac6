//! Signal Bank: The Full Simulated Sensor Set
//!
//! Frequencies and phases follow the demo vehicle profile: RPM sweeps once
//! per minute, speed twice, throttle three times, engine temperature 1.5
//! times, each shifted by a third of a half-turn so no two channels peak at
//! the same instant.

use crate::oscillator::Oscillator;
use std::f64::consts::PI;
use telemetry_types::SensorSample;

/// Oil temperature is modeled as already warmed up and stable.
pub const OIL_TEMP_C: i64 = 130;

/// The four oscillating channels plus the constant oil temperature
#[derive(Debug, Clone, Copy)]
pub struct SignalBank {
    pub rpm: Oscillator,
    pub speed_kmh: Oscillator,
    pub throttle_percent: Oscillator,
    pub engine_temp_c: Oscillator,
}

impl Default for SignalBank {
    fn default() -> Self {
        Self {
            rpm: Oscillator::new(2000.0, 7000.0, 1.0, 0.0),
            speed_kmh: Oscillator::new(20.0, 120.0, 2.0, PI / 3.0),
            throttle_percent: Oscillator::new(0.0, 100.0, 3.0, 2.0 * PI / 3.0),
            engine_temp_c: Oscillator::new(70.0, 120.0, 1.5, PI),
        }
    }
}

impl SignalBank {
    /// Build the complete sample for one tick
    ///
    /// Pure: the same `(elapsed_secs, timestamp)` pair always yields the same
    /// sample. Throttle is clamped after rounding so float edges can never
    /// leave the percent range.
    pub fn sample(&self, elapsed_secs: f64, timestamp: i64) -> SensorSample {
        SensorSample {
            timestamp,
            rpm: Some(self.rpm.sample(elapsed_secs)),
            speed_kmh: Some(self.speed_kmh.sample(elapsed_secs)),
            throttle_percent: Some(self.throttle_percent.sample(elapsed_secs).clamp(0, 100)),
            engine_temp_c: Some(self.engine_temp_c.sample(elapsed_secs)),
            oil_temp_c: Some(OIL_TEMP_C),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rpm_quarter_period_marks() {
        // RPM has a 60s period: midpoint, max, midpoint, min
        let bank = SignalBank::default();
        let rpm_at = |t: f64| bank.sample(t, 0).rpm.unwrap();

        assert_eq!(rpm_at(0.0), 4500);
        assert!((rpm_at(15.0) - 7000).abs() <= 1);
        assert_eq!(rpm_at(30.0), 4500);
        assert!((rpm_at(45.0) - 2000).abs() <= 1);
    }

    #[test]
    fn test_oil_temp_constant() {
        let bank = SignalBank::default();
        for t in 0..3600 {
            assert_eq!(bank.sample(t as f64, 0).oil_temp_c, Some(OIL_TEMP_C));
        }
    }

    #[test]
    fn test_phase_offsets_pairwise_distinct() {
        let bank = SignalBank::default();
        let phases = [
            bank.rpm.phase_rad(),
            bank.speed_kmh.phase_rad(),
            bank.throttle_percent.phase_rad(),
            bank.engine_temp_c.phase_rad(),
        ];

        for i in 0..phases.len() {
            for j in (i + 1)..phases.len() {
                assert!(
                    (phases[i] - phases[j]).abs() > 1e-6,
                    "channels {i} and {j} share a phase offset"
                );
            }
        }
    }

    #[test]
    fn test_all_channels_present_and_timestamped() {
        let sample = SignalBank::default().sample(12.3, 1_700_000_042);
        assert_eq!(sample.timestamp, 1_700_000_042);
        assert_eq!(sample.channel_count(), 5);
    }

    proptest! {
        #[test]
        fn channels_stay_in_declared_ranges(t in 0.0f64..86_400.0) {
            let sample = SignalBank::default().sample(t, 0);

            prop_assert!((2000..=7000).contains(&sample.rpm.unwrap()));
            prop_assert!((20..=120).contains(&sample.speed_kmh.unwrap()));
            prop_assert!((0..=100).contains(&sample.throttle_percent.unwrap()));
            prop_assert!((70..=120).contains(&sample.engine_temp_c.unwrap()));
            prop_assert_eq!(sample.oil_temp_c.unwrap(), OIL_TEMP_C);
        }

        #[test]
        fn sampling_is_deterministic(t in 0.0f64..3600.0, ts in 0i64..2_000_000_000) {
            let bank = SignalBank::default();
            prop_assert_eq!(bank.sample(t, ts), bank.sample(t, ts));
        }
    }
}
