// ── Intent catalog ──
//
// Intent scripts and the shared expansion rules are fetched once at startup
// through a `ConfigSource`. Any fetch or parse failure is fatal; there are
// no retries at this level.

use std::future::Future;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;

/// Something that can hand out named text documents.
pub trait ConfigSource {
    fn fetch(&self, document: &str) -> impl Future<Output = Result<String, CoreError>> + Send;
}

impl ConfigSource for satvox_api::IntentsClient {
    async fn fetch(&self, document: &str) -> Result<String, CoreError> {
        self.fetch_document(document)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::Fetch { reason, .. } => CoreError::Fetch {
                    document: document.to_owned(),
                    reason,
                },
                other => other,
            })
    }
}

/// Which documents make up the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDocuments {
    pub scripts: Vec<String>,
    pub common: String,
}

impl Default for IntentDocuments {
    fn default() -> Self {
        Self {
            scripts: vec![
                "homeassistant_HassTurnOff.yaml".into(),
                "homeassistant_HassTurnOn.yaml".into(),
            ],
            common: "_common.yaml".into(),
        }
    }
}

/// Example sentences per intent plus the expansion-rule alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentCatalog {
    pub intents: IndexMap<String, Vec<String>>,
    pub expansions: IndexMap<String, Vec<String>>,
}

// ── Document shapes ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct IntentScriptDoc {
    #[serde(default)]
    intents: IndexMap<String, IntentDoc>,
}

#[derive(Debug, Deserialize)]
struct IntentDoc {
    #[serde(default)]
    data: Vec<IntentDataDoc>,
}

#[derive(Debug, Deserialize)]
struct IntentDataDoc {
    #[serde(default)]
    sentences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CommonDoc {
    #[serde(default)]
    expansion_rules: IndexMap<String, String>,
}

impl IntentCatalog {
    /// Fetch and parse every document, in order. Fails on the first error.
    pub async fn load<S: ConfigSource>(
        source: &S,
        documents: &IntentDocuments,
    ) -> Result<Self, CoreError> {
        let mut catalog = Self::default();

        for script in &documents.scripts {
            let text = source.fetch(script).await?;
            catalog.add_intent_script(script, &text)?;
        }

        let text = source.fetch(&documents.common).await?;
        catalog.add_expansion_rules(&documents.common, &text)?;

        info!(
            intents = catalog.intents.len(),
            expansions = catalog.expansions.len(),
            "intent catalog loaded"
        );
        Ok(catalog)
    }

    /// Merge an intent script. Sentences come from the first data block of
    /// each intent.
    pub fn add_intent_script(&mut self, document: &str, yaml: &str) -> Result<(), CoreError> {
        let doc: IntentScriptDoc = parse_yaml(document, yaml)?;
        for (intent, body) in doc.intents {
            let sentences = body
                .data
                .into_iter()
                .next()
                .map(|d| d.sentences)
                .unwrap_or_default();
            debug!(document, intent = %intent, sentences = sentences.len(), "intent parsed");
            self.intents.insert(intent, sentences);
        }
        Ok(())
    }

    /// Merge the `expansion_rules` of a common document.
    pub fn add_expansion_rules(&mut self, document: &str, yaml: &str) -> Result<(), CoreError> {
        let doc: CommonDoc = parse_yaml(document, yaml)?;
        for (token, rule) in doc.expansion_rules {
            self.expansions.insert(token, split_alternatives(&rule));
        }
        Ok(())
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(document: &str, yaml: &str) -> Result<T, CoreError> {
    serde_yaml::from_str(yaml).map_err(|e| CoreError::IntentParse {
        document: document.to_owned(),
        message: e.to_string(),
    })
}

/// `"(on|off)"` → `["on", "off"]`. Rules without a surrounding group are a
/// single alternative. Alternatives keep their whitespace, so `"(the| )"`
/// yields a single-space option.
fn split_alternatives(rule: &str) -> Vec<String> {
    let rule = rule.trim();
    match rule.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => inner.split('|').map(str::to_owned).collect(),
        None => vec![rule.to_owned()],
    }
}
