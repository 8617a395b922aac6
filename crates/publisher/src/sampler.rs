//! Sample Sources
//!
//! The loop pulls each tick's reading through the `Sampler` seam so the same
//! state machine serves both the simulator and the hardware reader.

use async_trait::async_trait;
use obd_adapter::{ElmClient, Pid};
use signal_sim::SignalBank;
use telemetry_types::SensorSample;
use tracing::debug;

/// Source of one sample per tick
#[async_trait]
pub trait Sampler: Send {
    /// Build the sample for a tick at `elapsed_secs` since loop start,
    /// stamped with `timestamp` epoch seconds
    async fn sample(&mut self, elapsed_secs: f64, timestamp: i64) -> SensorSample;
}

/// Simulated sampler: every channel present on every tick
#[derive(Debug, Default)]
pub struct SimSampler {
    bank: SignalBank,
}

#[async_trait]
impl Sampler for SimSampler {
    async fn sample(&mut self, elapsed_secs: f64, timestamp: i64) -> SensorSample {
        self.bank.sample(elapsed_secs, timestamp)
    }
}

/// Hardware sampler: queries the OBD adapter, omitting silent channels
///
/// A tick never fails; a PID with no response simply leaves its field out of
/// the sample, and a dead adapter yields a timestamp-only sample the loop
/// declines to publish.
pub struct ObdSampler {
    client: ElmClient,
}

impl ObdSampler {
    pub fn new(client: ElmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Sampler for ObdSampler {
    async fn sample(&mut self, _elapsed_secs: f64, timestamp: i64) -> SensorSample {
        let mut sample = SensorSample::new(timestamp);

        if self.client.ensure_connected().await.is_err() {
            return sample;
        }

        for pid in Pid::TICK_SET {
            let reading = match self.client.query(pid).await {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("PID {:02X} unavailable: {}", pid.as_hex(), e);
                    None
                }
            };

            match pid {
                Pid::Speed => sample.speed_kmh = reading,
                Pid::ThrottlePosition => sample.throttle_percent = reading,
                Pid::CoolantTemp => sample.engine_temp_c = reading,
                Pid::IntakeAirTemp => sample.air_temp_c = reading,
                Pid::ShortFuelTrim => sample.short_term_fuel_trim_percent = reading,
                Pid::LongFuelTrim => sample.long_term_fuel_trim_percent = reading,
            }
        }

        match self.client.read_voltage().await {
            Ok(volts) => sample.adapter_voltage_v = Some(volts),
            Err(e) => debug!("Adapter voltage unavailable: {}", e),
        }

        sample
    }
}
