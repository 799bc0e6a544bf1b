// ── Core error types ──
//
// Domain errors from satvox-core. Consumers never see reqwest or rumqttc
// errors directly; the `From<satvox_api::Error>` impl translates them.

use thiserror::Error;

use crate::publisher::ConnectionState;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Startup errors ───────────────────────────────────────────────
    #[error("Failed to fetch {document}: {reason}")]
    Fetch { document: String, reason: String },

    #[error("Invalid intent document {document}: {message}")]
    IntentParse { document: String, message: String },

    #[error("Invalid pronouncing dictionary: {message}")]
    Dictionary { message: String },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Site '{site_id}' has {phrases} phrases but {phonetics} phonetic strings")]
    CountMismatch {
        site_id: String,
        phrases: usize,
        phonetics: usize,
    },

    #[error("Site '{site_id}' produces {count} commands, more than the limit of {max}")]
    BatchTooLarge {
        site_id: String,
        count: usize,
        max: usize,
    },

    // ── Broker errors ────────────────────────────────────────────────
    #[error("Broker not connected after {attempts} attempts (last state: {last_state})")]
    ConnectTimeout {
        attempts: u32,
        last_state: ConnectionState,
    },

    #[error("Broker connection lost after {sent} messages: {reason}")]
    ConnectionLost { sent: usize, reason: String },

    #[error("Broker error: {message}")]
    Broker { message: String },

    #[error("Publishing to {topic} failed: {message}")]
    Publish { topic: String, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Wrapped errors ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<satvox_api::Error> for CoreError {
    fn from(err: satvox_api::Error) -> Self {
        match err {
            satvox_api::Error::FetchStatus { document, status } => CoreError::Fetch {
                document,
                reason: format!("HTTP {status}"),
            },
            satvox_api::Error::Transport(e) => CoreError::Fetch {
                document: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            satvox_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            satvox_api::Error::Tls(message) => CoreError::Config {
                message: format!("TLS error: {message}"),
            },
            satvox_api::Error::BrokerClient(e) => CoreError::Broker {
                message: e.to_string(),
            },
            satvox_api::Error::AlreadyStarted => {
                CoreError::Internal("broker event loop started twice".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_status_maps_to_fetch() {
        let err: CoreError = satvox_api::Error::FetchStatus {
            document: "_common.yaml".into(),
            status: 500,
        }
        .into();
        assert_eq!(err.to_string(), "Failed to fetch _common.yaml: HTTP 500");
    }

    #[test]
    fn domain_error_display() {
        let too_large = CoreError::BatchTooLarge {
            site_id: "kitchen".into(),
            count: 201,
            max: 200,
        };
        assert_eq!(
            too_large.to_string(),
            "Site 'kitchen' produces 201 commands, more than the limit of 200"
        );

        let timeout = CoreError::ConnectTimeout {
            attempts: 10,
            last_state: ConnectionState::Failed,
        };
        assert_eq!(
            timeout.to_string(),
            "Broker not connected after 10 attempts (last state: failed)"
        );
    }
}
