// ── Broker publish pipeline ──
//
// Connects to the broker, waits for the handshake within a bounded poll
// budget, then drains site batches onto `{topic}/add_cmd` with a fixed
// delay after every message. The transport's background worker is the
// only writer of `ConnectionState`; this side only reads it.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use satvox_api::LinkEvent;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{CommandMessage, RemoveAllMessage, SiteBatch};

/// Topic suffix for adding one command.
pub const ADD_COMMAND_SUFFIX: &str = "add_cmd";
/// Topic suffix for clearing a site's commands.
pub const REMOVE_ALL_SUFFIX: &str = "rm_all";

// ── ConnectionState ──────────────────────────────────────────────

/// Broker connection state as seen by the publish pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Broker capability ────────────────────────────────────────────

/// Transport the pipeline publishes through.
///
/// `start` hands back the link event stream of a background worker that
/// owns the wire protocol; publishes do not wait for acknowledgement.
pub trait Broker: Send + Sync {
    fn start(&self) -> Result<mpsc::Receiver<LinkEvent>, CoreError>;

    fn publish(
        &self,
        topic: &str,
        payload: Bytes,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Graceful close of a live session.
    fn disconnect(&self) -> impl Future<Output = ()> + Send;

    /// Stop the transport without a handshake.
    fn shutdown(&self);
}

impl Broker for satvox_api::BrokerClient {
    fn start(&self) -> Result<mpsc::Receiver<LinkEvent>, CoreError> {
        Ok(satvox_api::BrokerClient::start(self)?)
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<(), CoreError> {
        satvox_api::BrokerClient::publish(self, topic, payload)
            .await
            .map_err(|e| CoreError::Publish {
                topic: topic.to_owned(),
                message: e.to_string(),
            })
    }

    async fn disconnect(&self) {
        satvox_api::BrokerClient::disconnect(self).await;
    }

    fn shutdown(&self) {
        satvox_api::BrokerClient::shutdown(self);
    }
}

// ── Configuration & report ───────────────────────────────────────

/// Pacing and retry policy for one publish run.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Base topic; messages go to `{topic}/add_cmd`.
    pub topic: String,
    /// Delay after every published message.
    pub throttle: Duration,
    /// How long one connection poll waits for a state change.
    pub connect_poll_interval: Duration,
    /// Polls allowed before giving up on the connection.
    pub connect_retries: u32,
    /// Publish `{topic}/rm_all` for every site before adding commands.
    pub reset_before_publish: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            topic: "esp-ha/config".into(),
            throttle: Duration::from_millis(500),
            connect_poll_interval: Duration::from_secs(3),
            connect_retries: 10,
            reset_before_publish: false,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub sites: usize,
    pub resets: usize,
    pub messages: usize,
}

/// One delivered message, handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct Sent<'a> {
    pub site_id: &'a str,
    /// 1-based position within the site batch, or among sites for a reset.
    pub index: usize,
    pub total: usize,
    /// Command text; empty for a reset.
    pub text: &'a str,
    /// `true` for an `rm_all` message.
    pub reset: bool,
}

// ── Publisher ────────────────────────────────────────────────────

/// The publish pipeline over a [`Broker`].
pub struct Publisher<B> {
    broker: B,
    config: PublisherConfig,
    state_tx: Option<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    monitor: Option<JoinHandle<()>>,
}

impl<B: Broker> Publisher<B> {
    pub fn new(broker: B, config: PublisherConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            broker,
            config,
            state_tx: Some(state_tx),
            state_rx,
            monitor: None,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Connect, publish every batch, disconnect.
    ///
    /// On a connect failure nothing is published.
    pub async fn run(
        mut self,
        batches: &[SiteBatch],
        on_sent: impl FnMut(Sent<'_>) + Send,
    ) -> Result<PublishReport, CoreError> {
        if let Err(e) = self.connect().await {
            self.close().await;
            return Err(e);
        }
        let result = self.publish_batches(batches, on_sent).await;
        self.close().await;
        result
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Start the transport and wait until the handshake succeeds or the
    /// poll budget runs out.
    pub async fn connect(&mut self) -> Result<(), CoreError> {
        let Some(state_tx) = self.state_tx.take() else {
            return Err(CoreError::Internal("publisher already connected".into()));
        };

        state_tx.send_replace(ConnectionState::Connecting);
        let events = self.broker.start()?;
        self.monitor = Some(tokio::spawn(link_monitor(events, state_tx)));

        self.await_connected().await
    }

    /// Poll the connection state until `Connected`.
    ///
    /// Each poll waits up to `connect_poll_interval` for a state change; a
    /// change that is not `Connected` (a refused or failed handshake) also
    /// uses up a poll.
    async fn await_connected(&self) -> Result<(), CoreError> {
        let mut state_rx = self.state_rx.clone();
        let mut attempts: u32 = 0;

        loop {
            let state = *state_rx.borrow_and_update();
            if state == ConnectionState::Connected {
                return Ok(());
            }
            if attempts >= self.config.connect_retries {
                warn!(attempts, %state, "could not connect to broker");
                return Err(CoreError::ConnectTimeout {
                    attempts,
                    last_state: state,
                });
            }

            attempts += 1;
            info!(
                attempt = attempts,
                max = self.config.connect_retries,
                %state,
                "waiting to connect..."
            );

            match tokio::time::timeout(self.config.connect_poll_interval, state_rx.changed()).await
            {
                Ok(Ok(())) | Err(_) => {}
                Ok(Err(_)) => {
                    return Err(CoreError::Broker {
                        message: "broker link closed before connecting".into(),
                    });
                }
            }
        }
    }

    /// Disconnect from the broker and stop the link monitor.
    pub async fn close(&mut self) {
        if self.state() == ConnectionState::Connected {
            self.broker.disconnect().await;
        } else {
            self.broker.shutdown();
        }
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
        debug!("publisher closed");
    }

    // ── Publishing ───────────────────────────────────────────────

    /// Publish every batch in order, pausing `throttle` after each message.
    ///
    /// `on_sent` fires once per delivered message, resets included.
    ///
    /// If the link drops between messages the pipeline waits for the
    /// background worker to reconnect, using the connect poll budget, and
    /// aborts with [`CoreError::ConnectionLost`] when that runs out.
    pub async fn publish_batches(
        &self,
        batches: &[SiteBatch],
        mut on_sent: impl FnMut(Sent<'_>) + Send,
    ) -> Result<PublishReport, CoreError> {
        let add_topic = format!("{}/{ADD_COMMAND_SUFFIX}", self.config.topic);
        let mut report = PublishReport {
            sites: batches.len(),
            ..PublishReport::default()
        };

        if self.config.reset_before_publish {
            let rm_topic = format!("{}/{REMOVE_ALL_SUFFIX}", self.config.topic);
            for (i, batch) in batches.iter().enumerate() {
                let payload = serde_json::to_vec(&RemoveAllMessage {
                    site_id: batch.site_id(),
                })?;
                self.send(&rm_topic, payload, report.resets).await?;
                report.resets += 1;

                info!(site = batch.site_id(), "cleared satellite commands");
                on_sent(Sent {
                    site_id: batch.site_id(),
                    index: i + 1,
                    total: batches.len(),
                    text: "",
                    reset: true,
                });
            }
        }

        for batch in batches {
            let total = batch.len();
            for (i, entry) in batch.entries().iter().enumerate() {
                let payload = serde_json::to_vec(&CommandMessage {
                    text: &entry.text,
                    phonetic: &entry.phonetic,
                    site_id: batch.site_id(),
                })?;
                let message = String::from_utf8_lossy(&payload).into_owned();

                self.send(&add_topic, payload, report.resets + report.messages)
                    .await?;
                report.messages += 1;

                info!(site = batch.site_id(), "Sent {}/{total}: {message}", i + 1);
                on_sent(Sent {
                    site_id: batch.site_id(),
                    index: i + 1,
                    total,
                    text: &entry.text,
                    reset: false,
                });
            }
        }

        Ok(report)
    }

    async fn send(&self, topic: &str, payload: Vec<u8>, sent: usize) -> Result<(), CoreError> {
        if self.state() != ConnectionState::Connected {
            warn!(state = %self.state(), sent, "broker link down, waiting for reconnect");
            self.await_connected()
                .await
                .map_err(|e| CoreError::ConnectionLost {
                    sent,
                    reason: e.to_string(),
                })?;
        }

        self.broker.publish(topic, Bytes::from(payload)).await?;
        tokio::time::sleep(self.config.throttle).await;
        Ok(())
    }
}

// ── Link monitor ─────────────────────────────────────────────────

/// Background writer of the connection state.
async fn link_monitor(
    mut events: mpsc::Receiver<LinkEvent>,
    state_tx: watch::Sender<ConnectionState>,
) {
    while let Some(event) = events.recv().await {
        let next = match event {
            LinkEvent::Connected => ConnectionState::Connected,
            LinkEvent::Refused { reason } => {
                warn!(%reason, "broker refused connection");
                ConnectionState::Failed
            }
            LinkEvent::Failed { reason } => {
                warn!(%reason, "failed to connect to broker");
                ConnectionState::Failed
            }
            LinkEvent::Disconnected => ConnectionState::Disconnected,
        };
        debug!(state = %next, "connection state changed");
        state_tx.send_replace(next);
    }
    debug!("link event stream ended");
}
