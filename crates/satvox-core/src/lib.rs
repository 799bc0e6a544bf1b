// satvox-core: Vocabulary generation and publishing between satvox-api and the CLI.

pub mod batch;
pub mod error;
pub mod intents;
pub mod model;
pub mod phonetic;
pub mod publisher;
pub mod template;

// ── Primary re-exports ──────────────────────────────────────────────
pub use batch::SiteBatchBuilder;
pub use error::CoreError;
pub use intents::{ConfigSource, IntentCatalog, IntentDocuments};
pub use model::{BatchEntry, MAX_BATCH_ENTRIES, Site, SiteBatch};
pub use phonetic::{GraphemeToPhoneme, PhoneticEncoder, PronouncingDictionary};
pub use publisher::{Broker, ConnectionState, PublishReport, Publisher, PublisherConfig, Sent};
pub use template::TEMPLATES;
