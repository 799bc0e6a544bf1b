//! Shared configuration for the satvox CLI.
//!
//! One YAML file holds both the broker connection (`mqtt`) and the site
//! inventory (`sites`). Connection settings layer defaults, the file and
//! `SATVOX_` environment variables through figment; the site mapping is
//! read on its own so its order survives. This crate also translates the
//! file into `satvox_api` / `satvox_core` configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use satvox_api::{BrokerOptions, TlsMode, TransportConfig};
use satvox_core::{IntentDocuments, PublisherConfig, Site};

/// File name looked up in the working directory and the config dir.
pub const CONFIG_FILE_NAME: &str = "sites.yaml";

/// Base URL of the published English intent sentences.
pub const DEFAULT_INTENTS_URL: &str =
    "https://raw.githubusercontent.com/home-assistant/intents/main/sentences/en/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── YAML config structs ─────────────────────────────────────────────

/// Everything in the config file except `sites`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mqtt: MqttConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub intents: IntentsConfig,

    #[serde(default)]
    pub g2p: G2pConfig,
}

/// Broker connection settings.
#[derive(Debug, Deserialize, Serialize)]
pub struct MqttConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: Option<String>,

    /// Broker password (plaintext; `SATVOX_MQTT_PASSWORD` overrides).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Base topic; commands go to `{topic}/add_cmd`.
    #[serde(default)]
    pub topic: String,

    /// Defaults to `satvox-<pid>`.
    pub client_id: Option<String>,

    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            username: None,
            password: None,
            topic: String::new(),
            client_id: None,
            keep_alive_secs: default_keep_alive(),
        }
    }
}

fn default_port() -> u16 {
    1883
}
fn default_keep_alive() -> u64 {
    30
}

/// Publish pacing and connect budget.
#[derive(Debug, Deserialize, Serialize)]
pub struct PublishConfig {
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_connect_poll_secs")]
    pub connect_poll_secs: u64,

    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            connect_poll_secs: default_connect_poll_secs(),
            connect_retries: default_connect_retries(),
        }
    }
}

fn default_throttle_ms() -> u64 {
    500
}
fn default_connect_poll_secs() -> u64 {
    3
}
fn default_connect_retries() -> u32 {
    10
}

/// Remote intent source.
#[derive(Debug, Deserialize, Serialize)]
pub struct IntentsConfig {
    /// Fetch the intent catalog at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_intents_url")]
    pub base_url: String,

    #[serde(default = "default_scripts")]
    pub scripts: Vec<String>,

    #[serde(default = "default_common")]
    pub common: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Custom CA bundle for the intent source.
    pub ca_cert: Option<PathBuf>,
}

impl Default for IntentsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_intents_url(),
            scripts: default_scripts(),
            common: default_common(),
            timeout_secs: default_timeout(),
            ca_cert: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_intents_url() -> String {
    DEFAULT_INTENTS_URL.into()
}
fn default_scripts() -> Vec<String> {
    IntentDocuments::default().scripts
}
fn default_common() -> String {
    IntentDocuments::default().common
}
fn default_timeout() -> u64 {
    30
}

/// Grapheme-to-phoneme settings.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct G2pConfig {
    /// CMUdict-format file merged over the built-in lexicon.
    pub dictionary: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file: explicit path, then `./sites.yaml`, then the
/// platform config dir.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return local;
    }

    ProjectDirs::from("org", "satvox", "satvox").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(CONFIG_FILE_NAME);
            p
        },
        |dirs| dirs.config_dir().join(CONFIG_FILE_NAME),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("satvox");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load and validate connection settings from file + environment.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Yaml::file(path))
        .merge(
            Env::prefixed("SATVOX_")
                .ignore(&["config"])
                .map(|key| key.as_str().replacen('_', ".", 1).into()),
        );

    let config: Config = figment.extract()?;
    config.validate()?;
    debug!(path = %path.display(), host = %config.mqtt.host, "config loaded");
    Ok(config)
}

#[derive(Debug, Deserialize)]
struct SitesDoc {
    #[serde(default)]
    sites: IndexMap<String, Option<SiteDoc>>,
}

#[derive(Debug, Default, Deserialize)]
struct SiteDoc {
    #[serde(default)]
    lights: Vec<String>,

    #[serde(flatten)]
    other: IndexMap<String, serde_yaml::Value>,
}

/// Load the site inventory in file order.
///
/// Entity categories other than `lights` are skipped with a warning.
pub fn load_sites(path: &Path) -> Result<Vec<Site>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)?;
    parse_sites(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn parse_sites(text: &str) -> Result<Vec<Site>, serde_yaml::Error> {
    let doc: SitesDoc = serde_yaml::from_str(text)?;

    Ok(doc
        .sites
        .into_iter()
        .map(|(id, body)| {
            let body = body.unwrap_or_default();
            for category in body.other.keys() {
                warn!(site = %id, category = %category, "unsupported entity category, skipping");
            }
            Site::new(id, body.lights)
        })
        .collect())
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.host.trim().is_empty() {
            return Err(invalid("mqtt.host", "must not be empty"));
        }
        if self.mqtt.port == 0 {
            return Err(invalid("mqtt.port", "must be between 1 and 65535"));
        }
        if self.mqtt.topic.trim().is_empty() {
            return Err(invalid("mqtt.topic", "must not be empty"));
        }
        if self.mqtt.topic.ends_with('/') {
            return Err(invalid("mqtt.topic", "must not end with '/'"));
        }
        if self.publish.connect_poll_secs == 0 {
            return Err(invalid("publish.connect_poll_secs", "must be at least 1"));
        }
        if self.publish.connect_retries == 0 {
            return Err(invalid("publish.connect_retries", "must be at least 1"));
        }
        if self.intents.enabled {
            url::Url::parse(&self.intents.base_url).map_err(|e| ConfigError::Validation {
                field: "intents.base_url".into(),
                reason: format!("invalid URL '{}': {e}", self.intents.base_url),
            })?;
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Broker options for the MQTT transport.
    pub fn broker_options(&self) -> BrokerOptions {
        let mut opts = BrokerOptions::new(&self.mqtt.host, self.mqtt.port);
        if let Some(ref client_id) = self.mqtt.client_id {
            opts.client_id.clone_from(client_id);
        }
        opts.username.clone_from(&self.mqtt.username);
        opts.password = self
            .mqtt
            .password
            .as_ref()
            .map(|pw| SecretString::from(pw.clone()));
        opts.keep_alive = Duration::from_secs(self.mqtt.keep_alive_secs);
        opts
    }

    /// Pipeline pacing; `reset` comes from the command line.
    pub fn publisher_config(&self, reset: bool) -> PublisherConfig {
        PublisherConfig {
            topic: self.mqtt.topic.clone(),
            throttle: Duration::from_millis(self.publish.throttle_ms),
            connect_poll_interval: Duration::from_secs(self.publish.connect_poll_secs),
            connect_retries: self.publish.connect_retries,
            reset_before_publish: reset,
        }
    }

    pub fn intent_documents(&self) -> IntentDocuments {
        IntentDocuments {
            scripts: self.intents.scripts.clone(),
            common: self.intents.common.clone(),
        }
    }

    /// HTTP transport settings for the intent source.
    pub fn transport_config(&self) -> TransportConfig {
        let mut config = TransportConfig::default()
            .with_timeout(Duration::from_secs(self.intents.timeout_secs));
        if let Some(ref ca) = self.intents.ca_cert {
            config.tls = TlsMode::CustomCa(ca.clone());
        }
        config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r"
mqtt:
  host: broker.local
  port: 1884
  username: satellite
  password: hunter2
  topic: esp-ha/config
sites:
  kitchen:
    lights:
      - lamp
      - ceiling
  porch:
    lights: [spot]
  attic:
";

    #[test]
    fn loads_mqtt_section_with_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("sites.yaml", SAMPLE)?;
            let config = load_config(Path::new("sites.yaml")).unwrap();

            assert_eq!(config.mqtt.host, "broker.local");
            assert_eq!(config.mqtt.port, 1884);
            assert_eq!(config.mqtt.topic, "esp-ha/config");
            assert_eq!(config.mqtt.keep_alive_secs, 30);
            assert_eq!(config.publish.throttle_ms, 500);
            assert_eq!(config.publish.connect_poll_secs, 3);
            assert_eq!(config.publish.connect_retries, 10);
            assert!(config.intents.enabled);
            assert_eq!(config.intents.base_url, DEFAULT_INTENTS_URL);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("sites.yaml", SAMPLE)?;
            jail.set_env("SATVOX_MQTT_PASSWORD", "from-env");
            jail.set_env("SATVOX_MQTT_HOST", "10.0.0.2");
            jail.set_env("SATVOX_CONFIG", "ignored.yaml");

            let config = load_config(Path::new("sites.yaml")).unwrap();
            assert_eq!(config.mqtt.host, "10.0.0.2");
            assert_eq!(config.mqtt.password.as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_config(Path::new("/nonexistent/satvox/sites.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn empty_topic_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("sites.yaml", "mqtt:\n  host: broker.local\n")?;
            let err = load_config(Path::new("sites.yaml")).unwrap_err();
            assert!(
                matches!(err, ConfigError::Validation { ref field, .. } if field == "mqtt.topic"),
                "got {err:?}"
            );
            Ok(())
        });
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.mqtt.host = "broker.local".into();
        config.mqtt.topic = "t".into();
        config.publish.connect_poll_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "publish.connect_poll_secs"),
            "got {err:?}"
        );
    }

    #[test]
    fn zero_connect_retries_is_rejected() {
        let mut config = Config::default();
        config.mqtt.host = "broker.local".into();
        config.mqtt.topic = "t".into();
        config.publish.connect_retries = 0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "publish.connect_retries"),
            "got {err:?}"
        );
    }

    #[test]
    fn sites_keep_file_order() {
        let sites = parse_sites(SAMPLE).unwrap();
        assert_eq!(
            sites,
            vec![
                Site::new("kitchen", vec!["lamp".into(), "ceiling".into()]),
                Site::new("porch", vec!["spot".into()]),
                Site::new("attic", Vec::new()),
            ]
        );
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let sites = parse_sites(
            "sites:\n  garage:\n    lights: [door light]\n    switches: [heater]\n",
        )
        .unwrap();
        assert_eq!(sites, vec![Site::new("garage", vec!["door light".into()])]);
    }

    #[test]
    fn malformed_sites_report_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.yaml");
        std::fs::write(&path, "sites:\n  kitchen:\n    lights: lamp\n").unwrap();

        let err = load_sites(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/etc/satvox/custom.yaml")));
        assert_eq!(path, PathBuf::from("/etc/satvox/custom.yaml"));
    }

    #[test]
    fn local_file_is_preferred_over_config_dir() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, SAMPLE)?;
            assert_eq!(config_path(None), PathBuf::from(CONFIG_FILE_NAME));
            Ok(())
        });
    }

    #[test]
    fn translates_to_runtime_configs() {
        let mut config = Config::default();
        config.mqtt.host = "broker.local".into();
        config.mqtt.topic = "satellites".into();
        config.mqtt.password = Some("hunter2".into());
        config.mqtt.client_id = Some("satvox-test".into());
        config.publish.throttle_ms = 250;

        let broker = config.broker_options();
        assert_eq!(broker.host, "broker.local");
        assert_eq!(broker.port, 1883);
        assert_eq!(broker.client_id, "satvox-test");
        assert_eq!(
            broker.password.as_ref().map(|pw| pw.expose_secret()),
            Some("hunter2")
        );

        let publisher = config.publisher_config(true);
        assert_eq!(publisher.topic, "satellites");
        assert_eq!(publisher.throttle, Duration::from_millis(250));
        assert_eq!(publisher.connect_poll_interval, Duration::from_secs(3));
        assert!(publisher.reset_before_publish);

        assert_eq!(config.intent_documents(), IntentDocuments::default());
        assert_eq!(
            config.transport_config().timeout,
            Duration::from_secs(30)
        );
    }
}
