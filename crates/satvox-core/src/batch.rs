// ── Site batch building ──
//
// Expands and encodes every site up front. A single invalid site fails the
// whole build so nothing is published for a partially valid run.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{Site, SiteBatch};
use crate::phonetic::{GraphemeToPhoneme, PhoneticEncoder};
use crate::template;

/// Builds validated [`SiteBatch`]es from site configuration.
pub struct SiteBatchBuilder<'a, G> {
    encoder: &'a PhoneticEncoder<G>,
}

impl<'a, G: GraphemeToPhoneme> SiteBatchBuilder<'a, G> {
    pub fn new(encoder: &'a PhoneticEncoder<G>) -> Self {
        Self { encoder }
    }

    /// Expand, encode and validate one site.
    pub fn build_site(&self, site: &Site) -> Result<SiteBatch, CoreError> {
        let phrases = template::expand(site.switchable_entities());
        let phonetics = self.encoder.encode_all(&phrases);
        debug!(
            site = %site.id,
            entities = site.switchable_entities().len(),
            phrases = phrases.len(),
            "expanded site"
        );
        SiteBatch::from_parts(site.id.clone(), phrases, phonetics)
    }

    /// Build every site in order. Returns the first validation error and
    /// no batches if any site fails.
    pub fn build_all(&self, sites: &[Site]) -> Result<Vec<SiteBatch>, CoreError> {
        let batches = sites
            .iter()
            .map(|site| self.build_site(site))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            sites = batches.len(),
            commands = batches.iter().map(SiteBatch::len).sum::<usize>(),
            "all site batches validated"
        );
        Ok(batches)
    }
}
