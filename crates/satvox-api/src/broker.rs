//! MQTT broker link with a background event loop.
//!
//! Wraps a [`rumqttc::AsyncClient`] and drives its [`rumqttc::EventLoop`] on a
//! spawned task. The task owns keep-alive and low-level reconnection; it
//! reports handshake outcomes and drops as [`LinkEvent`]s over an
//! [`tokio::sync::mpsc`] channel. Nothing else is shared with the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use satvox_api::broker::{BrokerClient, BrokerOptions, LinkEvent};
//!
//! let client = BrokerClient::new(&BrokerOptions::new("localhost", 1883));
//! let mut events = client.start()?;
//!
//! if let Some(LinkEvent::Connected) = events.recv().await {
//!     client.publish("esp-ha/config/add_cmd", payload).await?;
//! }
//!
//! client.disconnect().await;
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

// ── Channel capacities ───────────────────────────────────────────────

const REQUEST_CHANNEL_CAPACITY: usize = 64;
const LINK_EVENT_CAPACITY: usize = 32;

const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

// ── LinkEvent ────────────────────────────────────────────────────────

/// Connection-level outcome reported by the background event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The broker accepted the handshake (CONNACK with success code).
    Connected,
    /// The broker answered the handshake with a refusal code.
    Refused { reason: String },
    /// Network-level failure (connect error, reset, keep-alive timeout).
    Failed { reason: String },
    /// The session ended (broker DISCONNECT or our own disconnect).
    Disconnected,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff between reconnection attempts of the event loop.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

// ── BrokerOptions ────────────────────────────────────────────────────

/// Everything needed to open an MQTT session.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub keep_alive: Duration,
    pub reconnect: ReconnectConfig,
}

impl BrokerOptions {
    /// Options for an anonymous session with default keep-alive.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: format!("satvox-{}", std::process::id()),
            username: None,
            password: None,
            keep_alive: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }

    fn to_mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        if let Some(ref username) = self.username {
            let password = self
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default();
            options.set_credentials(username, password);
        }
        options
    }
}

// ── BrokerClient ─────────────────────────────────────────────────────

/// Handle to an MQTT session.
///
/// Created disconnected; [`start`](Self::start) hands the event loop to a
/// background task which performs the handshake. Publishes are queued on the
/// client's request channel and written by that task.
pub struct BrokerClient {
    client: AsyncClient,
    eventloop: Mutex<Option<EventLoop>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BrokerClient {
    /// Build the client and its (not yet polled) event loop.
    pub fn new(options: &BrokerOptions) -> Self {
        let (client, eventloop) =
            AsyncClient::new(options.to_mqtt_options(), REQUEST_CHANNEL_CAPACITY);
        Self {
            client,
            eventloop: Mutex::new(Some(eventloop)),
            reconnect: options.reconnect.clone(),
            cancel: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    /// Spawn the background event loop and return its link event stream.
    ///
    /// Can be called once; the first handshake happens asynchronously.
    pub fn start(&self) -> Result<mpsc::Receiver<LinkEvent>, Error> {
        let eventloop = self
            .eventloop
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(Error::AlreadyStarted)?;

        let (event_tx, event_rx) = mpsc::channel(LINK_EVENT_CAPACITY);
        let reconnect = self.reconnect.clone();
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move {
            event_loop_task(eventloop, event_tx, reconnect, cancel).await;
        });

        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(event_rx)
    }

    /// Queue a QoS 0 publish. Returns once the request is handed to the
    /// event loop; there is no broker acknowledgement at this level.
    pub async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), Error> {
        self.client
            .publish_bytes(topic, QoS::AtMostOnce, false, payload)
            .await?;
        Ok(())
    }

    /// Send DISCONNECT after queued publishes and wait for the worker to stop.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!(error = %e, "disconnect request not delivered");
            self.cancel.cancel();
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if tokio::time::timeout(WORKER_JOIN_TIMEOUT, handle).await.is_err() {
                tracing::warn!("broker worker did not stop in time, cancelling");
                self.cancel.cancel();
            }
        }
    }

    /// Signal the background task to stop immediately.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for BrokerClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background event loop ────────────────────────────────────────────

/// Poll the event loop until cancelled or our own DISCONNECT goes out.
///
/// rumqttc reconnects on the next `poll()` after an error, so the backoff
/// sleep here is what paces reconnection attempts.
async fn event_loop_task(
    mut eventloop: EventLoop,
    event_tx: mpsc::Sender<LinkEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            polled = eventloop.poll() => {
                match polled {
                    Ok(event) => {
                        if is_own_disconnect(&event) {
                            tracing::info!("broker session closed");
                            let _ = event_tx.send(LinkEvent::Disconnected).await;
                            break;
                        }
                        if let Some(link) = link_event_from_packet(&event) {
                            if link == LinkEvent::Connected {
                                tracing::info!("connected to broker");
                                attempt = 0;
                            }
                            // No receiver just means nobody is watching the link anymore.
                            let _ = event_tx.send(link).await;
                        }
                    }
                    Err(e) => {
                        let link = link_event_from_error(&e);
                        tracing::warn!(error = %e, attempt, "broker link error");
                        let _ = event_tx.send(link).await;

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::debug!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }
    }

    tracing::debug!("broker event loop exiting");
}

// ── Event classification ─────────────────────────────────────────────

fn link_event_from_packet(event: &Event) -> Option<LinkEvent> {
    match event {
        Event::Incoming(Packet::ConnAck(ack)) => {
            if ack.code == ConnectReturnCode::Success {
                Some(LinkEvent::Connected)
            } else {
                Some(LinkEvent::Refused {
                    reason: refusal_reason(&ack.code),
                })
            }
        }
        Event::Incoming(Packet::Disconnect) => Some(LinkEvent::Disconnected),
        _ => None,
    }
}

fn link_event_from_error(err: &ConnectionError) -> LinkEvent {
    match err {
        ConnectionError::ConnectionRefused(code) => LinkEvent::Refused {
            reason: refusal_reason(code),
        },
        other => LinkEvent::Failed {
            reason: other.to_string(),
        },
    }
}

fn is_own_disconnect(event: &Event) -> bool {
    matches!(event, Event::Outgoing(Outgoing::Disconnect))
}

fn refusal_reason(code: &ConnectReturnCode) -> String {
    match code {
        ConnectReturnCode::Success => "accepted".into(),
        ConnectReturnCode::RefusedProtocolVersion => "unacceptable protocol version".into(),
        ConnectReturnCode::BadClientId => "client identifier rejected".into(),
        ConnectReturnCode::ServiceUnavailable => "server unavailable".into(),
        ConnectReturnCode::BadUserNamePassword => "bad user name or password".into(),
        ConnectReturnCode::NotAuthorized => "not authorized".into(),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`, jitter within +-25%.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(16)).unwrap_or(16);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
