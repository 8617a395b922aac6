//! Ingestion Loop
//!
//! Mirrors the publisher's two-state shape on the consuming side: connect
//! and subscribe with backoff, then drain messages into the store until
//! shutdown.

use crate::parse::explode_payload;
use mqtt_link::{Backoff, Transport, TransportError};
use series_store::SeriesStore;
use std::sync::Arc;
use telemetry_types::Clock;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// MQTT → series-store pump
pub struct Ingestor<T, C> {
    transport: T,
    clock: C,
    topic: String,
    store: Arc<SeriesStore>,
}

impl<T, C> Ingestor<T, C>
where
    T: Transport,
    C: Clock,
{
    pub fn new(transport: T, clock: C, topic: String, store: Arc<SeriesStore>) -> Self {
        Self {
            transport,
            clock,
            topic,
            store,
        }
    }

    /// Run until `shutdown` fires
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = Backoff::new();

        'outer: loop {
            // Connect and subscribe, backing off on failure
            match self.establish().await {
                Ok(()) => backoff.reset(),
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!("Ingestor connect failed: {}; retrying in {:?}", e, delay);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue 'outer,
                        _ = shutdown.changed() => break 'outer,
                    }
                }
            }

            info!("Ingesting from {}", self.topic);
            loop {
                tokio::select! {
                    result = self.transport.next_message() => match result {
                        Ok(message) => self.ingest(&message.payload),
                        Err(e) => {
                            warn!("Ingestor stream lost: {}; reconnecting", e);
                            self.transport.disconnect().await;
                            continue 'outer;
                        }
                    },
                    _ = shutdown.changed() => break 'outer,
                }
            }
        }

        info!("Ingestor shutting down");
        self.transport.disconnect().await;
    }

    async fn establish(&mut self) -> Result<(), TransportError> {
        self.transport.connect().await?;
        self.transport.subscribe(&self.topic).await?;
        Ok(())
    }

    fn ingest(&self, payload: &[u8]) {
        let Some(points) = explode_payload(payload, self.clock.epoch_secs()) else {
            return;
        };

        for point in &points {
            if let Err(e) = self.store.insert(&point.key, point.timestamp_ms, point.value) {
                error!("Store insert failed for {}: {}", point.key, e);
            }
        }
        debug!("Ingested {} points", points.len());
    }
}
