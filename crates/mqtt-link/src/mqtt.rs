//! rumqttc-Backed Transport
//!
//! The rumqttc event loop runs in a spawned task that tracks connection
//! state, forwards inbound publishes over a channel, and re-issues
//! subscriptions whenever the broker accepts a new session.

use crate::error::TransportError;
use crate::transport::{InboundMessage, Transport};
use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How long `connect` waits for the broker to accept the session
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Poll interval while waiting for the session to come up
const CONNECT_POLL: Duration = Duration::from_millis(100);
/// Pause after an event-loop error before polling again
const ERROR_PAUSE: Duration = Duration::from_secs(5);
/// Request queue depth for the async client
const REQUEST_CAP: usize = 10;
/// Inbound message channel depth
const INBOUND_CAP: usize = 64;

/// Broker endpoint settings
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    /// Stable prefix for the client id; a random suffix is appended so
    /// multiple processes can share a public broker
    pub client_id: String,
}

/// MQTT transport over rumqttc
pub struct MqttTransport {
    config: MqttConfig,
    client: Option<AsyncClient>,
    connected: Arc<AtomicBool>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: mpsc::Receiver<InboundMessage>,
    event_task: Option<JoinHandle<()>>,
}

impl MqttTransport {
    pub fn new(config: MqttConfig) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAP);
        Self {
            config,
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            inbound_tx,
            inbound_rx,
            event_task: None,
        }
    }

    fn start_event_loop(&mut self) {
        let client_id = format!("{}-{}", self.config.client_id, Uuid::new_v4().simple());
        let mut options =
            MqttOptions::new(client_id, self.config.host.as_str(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAP);

        let connected = Arc::clone(&self.connected);
        let subscriptions = Arc::clone(&self.subscriptions);
        let inbound_tx = self.inbound_tx.clone();
        let loop_client = client.clone();

        let task = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        if ack.code == ConnectReturnCode::Success {
                            connected.store(true, Ordering::SeqCst);
                            info!("Broker accepted session");
                            // The broker starts us from a clean session, so
                            // standing subscriptions must be replayed.
                            let topics = subscriptions.lock().unwrap().clone();
                            for topic in topics {
                                if let Err(e) =
                                    loop_client.try_subscribe(topic.clone(), QoS::AtMostOnce)
                                {
                                    warn!("Resubscribe to {} failed: {}", topic, e);
                                }
                            }
                        } else {
                            warn!("Broker refused session: {:?}", ack.code);
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let message = InboundMessage {
                            topic: publish.topic.clone(),
                            payload: publish.payload.to_vec(),
                        };
                        if inbound_tx.send(message).await.is_err() {
                            debug!("Inbound receiver dropped; stopping event loop");
                            break;
                        }
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        connected.store(false, Ordering::SeqCst);
                        warn!("Broker sent disconnect");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        connected.store(false, Ordering::SeqCst);
                        error!("MQTT event loop error: {}", e);
                        tokio::time::sleep(ERROR_PAUSE).await;
                    }
                }
            }
        });

        self.client = Some(client);
        self.event_task = Some(task);
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.client.is_none() {
            info!(
                "Connecting to MQTT broker {}:{}",
                self.config.host, self.config.port
            );
            self.start_event_loop();
        }

        // The event loop owns the handshake; wait here until it lands.
        let deadline = tokio::time::Instant::now() + CONNECT_TIMEOUT;
        while !self.connected.load(Ordering::SeqCst) {
            if tokio::time::Instant::now() >= deadline {
                return Err(TransportError::Connect(format!(
                    "no session within {}s",
                    CONNECT_TIMEOUT.as_secs()
                )));
            }
            tokio::time::sleep(CONNECT_POLL).await;
        }

        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let client = self.client.as_ref().ok_or(TransportError::NotConnected)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))?;

        debug!("Published {} bytes to {}", payload.len(), topic);
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::NotConnected)?;

        self.subscriptions.lock().unwrap().push(topic.to_string());
        client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))?;

        info!("Subscribed to topic: {}", topic);
        Ok(())
    }

    async fn next_message(&mut self) -> Result<InboundMessage, TransportError> {
        self.inbound_rx
            .recv()
            .await
            .ok_or(TransportError::ChannelClosed)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.disconnect().await {
                debug!("Disconnect request failed: {}", e);
            }
        }
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
        self.connected.store(false, Ordering::SeqCst);
        info!("Disconnected from MQTT broker");
    }
}
