//! Command dispatch: bridges CLI args -> config + core pipeline -> output.

pub mod intents;
pub mod preview;
pub mod publish;

use tracing::{debug, info};

use satvox_api::IntentsClient;
use satvox_config::Config;
use satvox_core::{
    IntentCatalog, PhoneticEncoder, PronouncingDictionary, Site, SiteBatch, SiteBatchBuilder,
};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Loaded configuration plus the site inventory.
pub struct Workspace {
    pub config: Config,
    pub sites: Vec<Site>,
}

impl Workspace {
    pub fn load(global: &GlobalOpts) -> Result<Self, CliError> {
        let path = satvox_config::config_path(global.config.as_deref());
        let config = satvox_config::load_config(&path)?;
        let sites = satvox_config::load_sites(&path)?;
        debug!(path = %path.display(), sites = sites.len(), "workspace loaded");
        Ok(Self { config, sites })
    }

    /// Built-in lexicon, with the configured dictionary file merged on top.
    pub fn encoder(&self) -> Result<PhoneticEncoder<PronouncingDictionary>, CliError> {
        let mut dictionary = PronouncingDictionary::builtin();
        if let Some(ref path) = self.config.g2p.dictionary {
            let extra = PronouncingDictionary::from_path(path)?;
            info!(path = %path.display(), words = extra.len(), "pronouncing dictionary loaded");
            dictionary.merge(extra);
        }
        Ok(PhoneticEncoder::new(dictionary))
    }

    /// Expand, encode and validate every site. Fails on the first bad site.
    pub fn build_batches(&self) -> Result<Vec<SiteBatch>, CliError> {
        let encoder = self.encoder()?;
        Ok(SiteBatchBuilder::new(&encoder).build_all(&self.sites)?)
    }

    /// Fetch the remote intent catalog.
    pub async fn fetch_catalog(&self) -> Result<IntentCatalog, CliError> {
        let intents = &self.config.intents;
        let client = IntentsClient::new(&intents.base_url, &self.config.transport_config())
            .map_err(satvox_core::CoreError::from)?;
        let catalog = IntentCatalog::load(&client, &self.config.intent_documents()).await?;
        Ok(catalog)
    }
}

/// Dispatch a workspace-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let workspace = Workspace::load(global)?;
    match cmd {
        Command::Publish(args) => publish::handle(&workspace, args, global).await,
        Command::Preview(args) => preview::handle(&workspace, &args, global),
        Command::Intents => intents::handle(&workspace, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => Err(CliError::Internal(
            "completions are not a workspace command".into(),
        )),
    }
}
