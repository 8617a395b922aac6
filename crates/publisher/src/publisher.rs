//! Publisher Loop State Machine
//!
//! Two states: connecting and publishing. The loop starts connecting, ticks
//! at a fixed period while publishing, and falls back to connecting (with
//! bounded backoff) whenever delivery fails. A failed tick's sample is
//! dropped, never queued. The loop only ends on the shutdown signal, at
//! which point it releases the transport before returning.

use crate::sampler::Sampler;
use mqtt_link::{Backoff, Transport};
use std::time::Duration;
use telemetry_types::Clock;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Connecting,
    Publishing,
}

/// Fixed-cadence publisher over an injected transport, sampler and clock
pub struct PublisherLoop<S, T, C> {
    sampler: S,
    transport: T,
    clock: C,
    topic: String,
    interval: Duration,
    state: LoopState,
}

impl<S, T, C> PublisherLoop<S, T, C>
where
    S: Sampler,
    T: Transport,
    C: Clock,
{
    pub fn new(sampler: S, transport: T, clock: C, topic: String, interval: Duration) -> Self {
        Self {
            sampler,
            transport,
            clock,
            topic,
            interval,
            state: LoopState::Connecting,
        }
    }

    /// Run until `shutdown` fires
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            match self.state {
                LoopState::Connecting => {
                    tokio::select! {
                        result = self.transport.connect() => match result {
                            Ok(()) => {
                                info!(
                                    "Transport connected; publishing to {} every {:?}",
                                    self.topic, self.interval
                                );
                                backoff.reset();
                                self.state = LoopState::Publishing;
                            }
                            Err(e) => {
                                let delay = backoff.next_delay();
                                warn!("Connect failed: {}; retrying in {:?}", e, delay);
                                tokio::select! {
                                    _ = tokio::time::sleep(delay) => {}
                                    _ = shutdown.changed() => break,
                                }
                            }
                        },
                        _ = shutdown.changed() => break,
                    }
                }
                LoopState::Publishing => {
                    tokio::select! {
                        _ = ticker.tick() => self.tick().await,
                        _ = shutdown.changed() => break,
                    }
                }
            }
        }

        info!("Shutdown requested; releasing transport");
        self.transport.disconnect().await;
    }

    /// One tick: sample, serialize, deliver
    async fn tick(&mut self) {
        let elapsed = self.clock.elapsed_secs();
        let timestamp = self.clock.epoch_secs();
        let sample = self.sampler.sample(elapsed, timestamp).await;

        if !sample.has_data() {
            info!("No sensor data this tick; nothing to publish");
            return;
        }

        let payload = match sample.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode sample: {}", e);
                return;
            }
        };

        match self.transport.publish(&self.topic, &payload).await {
            Ok(()) => debug!("Published {:?}", sample),
            Err(e) => {
                warn!("Publish failed: {}; dropping sample and reconnecting", e);
                self.transport.disconnect().await;
                self.state = LoopState::Connecting;
            }
        }
    }
}
