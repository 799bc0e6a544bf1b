use thiserror::Error;

/// Top-level error type for the `satvox-api` crate.
///
/// Covers the HTTP intent source and the MQTT broker link.
/// `satvox-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Intent source ───────────────────────────────────────────────
    /// The intent source answered with a non-success status.
    #[error("Fetching {document} failed (HTTP {status})")]
    FetchStatus { document: String, status: u16 },

    // ── Broker ──────────────────────────────────────────────────────
    /// The client request channel is closed; the event loop has stopped.
    #[error("Broker client error: {0}")]
    BrokerClient(#[from] rumqttc::ClientError),

    /// The event loop was already handed to a background worker.
    #[error("Broker event loop already started")]
    AlreadyStarted,
}
