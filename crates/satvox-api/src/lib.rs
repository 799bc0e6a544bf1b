// satvox-api: Async transport clients for the remote intent source and the MQTT broker

pub mod broker;
pub mod error;
pub mod intents;
pub mod transport;

pub use broker::{BrokerClient, BrokerOptions, LinkEvent};
pub use error::Error;
pub use intents::IntentsClient;
pub use transport::{TlsMode, TransportConfig};
