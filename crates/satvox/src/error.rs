//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use satvox_config::ConfigError;
use satvox_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const FETCH: i32 = 4;
    pub const VALIDATION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file not found")]
    #[diagnostic(
        code(satvox::no_config),
        help(
            "Create a sites.yaml with `mqtt` and `sites` sections, or pass --config.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    #[diagnostic(code(satvox::invalid_config))]
    InvalidConfig { field: String, reason: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(satvox::config))]
    Config { message: String },

    #[error("Site '{site}' not found in configuration")]
    #[diagnostic(code(satvox::site_not_found), help("Configured sites: {available}"))]
    SiteNotFound { site: String, available: String },

    // ── Intent source ────────────────────────────────────────────────

    #[error("Could not fetch intent document {document}")]
    #[diagnostic(
        code(satvox::fetch_failed),
        help(
            "Reason: {reason}\n\
             Check intents.base_url, or set intents.enabled: false to skip the catalog."
        )
    )]
    Fetch { document: String, reason: String },

    #[error("Intent document {document} is not valid YAML: {message}")]
    #[diagnostic(code(satvox::intent_parse))]
    IntentParse { document: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Site '{site_id}' produces {count} commands; satellites accept at most {max}")]
    #[diagnostic(
        code(satvox::batch_too_large),
        help(
            "Every light yields one command per phrase template. Move some lights \
             to another site or remove entities. Nothing was published."
        )
    )]
    BatchTooLarge {
        site_id: String,
        count: usize,
        max: usize,
    },

    #[error("Site '{site_id}' has {phrases} phrases but {phonetics} phonetic strings")]
    #[diagnostic(code(satvox::count_mismatch), help("Nothing was published."))]
    CountMismatch {
        site_id: String,
        phrases: usize,
        phonetics: usize,
    },

    // ── Broker ───────────────────────────────────────────────────────

    #[error("Broker not connected after {attempts} attempts (last state: {state})")]
    #[diagnostic(
        code(satvox::connect_timeout),
        help(
            "Check mqtt.host, mqtt.port and credentials, or raise \
             publish.connect_retries. Nothing was published."
        )
    )]
    ConnectTimeout { attempts: u32, state: String },

    #[error("Broker connection lost after {sent} messages")]
    #[diagnostic(
        code(satvox::connection_lost),
        help("Reason: {reason}\nRe-run with --reset to republish from a clean slate.")
    )]
    ConnectionLost { sent: usize, reason: String },

    #[error("Broker error: {message}")]
    #[diagnostic(code(satvox::broker))]
    Broker { message: String },

    // ── Interrupt ────────────────────────────────────────────────────

    #[error("Interrupted")]
    #[diagnostic(code(satvox::interrupted))]
    Interrupted,

    // ── IO / Serialization / Internal ────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(satvox::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(satvox::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::InvalidConfig { .. } | Self::Config { .. } => {
                exit_code::CONFIG
            }
            Self::SiteNotFound { .. } => exit_code::USAGE,
            Self::Fetch { .. } | Self::IntentParse { .. } => exit_code::FETCH,
            Self::BatchTooLarge { .. } | Self::CountMismatch { .. } => exit_code::VALIDATION,
            Self::ConnectionLost { .. } | Self::Broker { .. } => exit_code::CONNECTION,
            Self::ConnectTimeout { .. } => exit_code::TIMEOUT,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { document, reason } => CliError::Fetch { document, reason },

            CoreError::IntentParse { document, message } => {
                CliError::IntentParse { document, message }
            }

            CoreError::Dictionary { message } => CliError::InvalidConfig {
                field: "g2p.dictionary".into(),
                reason: message,
            },

            CoreError::CountMismatch {
                site_id,
                phrases,
                phonetics,
            } => CliError::CountMismatch {
                site_id,
                phrases,
                phonetics,
            },

            CoreError::BatchTooLarge {
                site_id,
                count,
                max,
            } => CliError::BatchTooLarge {
                site_id,
                count,
                max,
            },

            CoreError::ConnectTimeout {
                attempts,
                last_state,
            } => CliError::ConnectTimeout {
                attempts,
                state: last_state.to_string(),
            },

            CoreError::ConnectionLost { sent, reason } => {
                CliError::ConnectionLost { sent, reason }
            }

            CoreError::Broker { message } => CliError::Broker { message },

            CoreError::Publish { topic, message } => CliError::Broker {
                message: format!("publish to {topic} failed: {message}"),
            },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Serialization(e) => CliError::Json(e),


            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::InvalidConfig { field, reason },
            other @ (ConfigError::Parse { .. } | ConfigError::Figment(_)) => CliError::Config {
                message: other.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
