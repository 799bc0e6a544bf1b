// ── Domain model ──
//
// Sites are loaded once and never mutated. Batches are derived per run and
// carry the validated (phrase, phonetic) pairs for one site.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound on commands a satellite accepts for one site.
pub const MAX_BATCH_ENTRIES: usize = 200;

/// A deployment location and the entities it controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    /// Light entity names, in configuration order.
    #[serde(default)]
    pub lights: Vec<String>,
}

impl Site {
    pub fn new(id: impl Into<String>, lights: Vec<String>) -> Self {
        Self {
            id: id.into(),
            lights,
        }
    }

    /// Entity names that get turn-on/turn-off phrasing.
    ///
    /// Only lights today; switches, locks etc. would be appended here.
    pub fn switchable_entities(&self) -> &[String] {
        &self.lights
    }
}

/// One phrase and its reduced-alphabet encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub text: String,
    pub phonetic: String,
}

/// The validated vocabulary of one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteBatch {
    site_id: String,
    entries: Vec<BatchEntry>,
}

impl SiteBatch {
    /// Zip phrases with their encodings, enforcing the batch invariants:
    /// equal lengths and at most [`MAX_BATCH_ENTRIES`] entries.
    pub fn from_parts(
        site_id: impl Into<String>,
        phrases: Vec<String>,
        phonetics: Vec<String>,
    ) -> Result<Self, CoreError> {
        let site_id = site_id.into();

        if phrases.len() != phonetics.len() {
            return Err(CoreError::CountMismatch {
                site_id,
                phrases: phrases.len(),
                phonetics: phonetics.len(),
            });
        }
        if phrases.len() > MAX_BATCH_ENTRIES {
            return Err(CoreError::BatchTooLarge {
                site_id,
                count: phrases.len(),
                max: MAX_BATCH_ENTRIES,
            });
        }

        let entries = phrases
            .into_iter()
            .zip(phonetics)
            .map(|(text, phonetic)| BatchEntry { text, phonetic })
            .collect();

        Ok(Self { site_id, entries })
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Wire messages ────────────────────────────────────────────────────

/// Payload published to `{topic}/add_cmd`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandMessage<'a> {
    pub text: &'a str,
    pub phonetic: &'a str,
    #[serde(rename = "siteId")]
    pub site_id: &'a str,
}

/// Payload published to `{topic}/rm_all`.
#[derive(Debug, Clone, Serialize)]
pub struct RemoveAllMessage<'a> {
    #[serde(rename = "siteId")]
    pub site_id: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix} {i}")).collect()
    }

    #[test]
    fn exactly_max_entries_passes() {
        let batch = SiteBatch::from_parts(
            "kitchen",
            numbered("turn on", MAX_BATCH_ENTRIES),
            numbered("tkN", MAX_BATCH_ENTRIES),
        )
        .unwrap();
        assert_eq!(batch.len(), 200);
        assert_eq!(batch.entries()[199].text, "turn on 199");
        assert_eq!(batch.entries()[199].phonetic, "tkN 199");
    }

    #[test]
    fn one_over_max_fails() {
        let err = SiteBatch::from_parts(
            "kitchen",
            numbered("turn on", MAX_BATCH_ENTRIES + 1),
            numbered("tkN", MAX_BATCH_ENTRIES + 1),
        )
        .unwrap_err();
        assert!(
            matches!(err, CoreError::BatchTooLarge { count: 201, max: 200, .. }),
            "got {err:?}"
        );
    }

    #[test]
    fn length_mismatch_fails() {
        let err = SiteBatch::from_parts("hall", numbered("a", 3), numbered("b", 2)).unwrap_err();
        assert!(
            matches!(
                err,
                CoreError::CountMismatch {
                    phrases: 3,
                    phonetics: 2,
                    ..
                }
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn empty_site_is_valid() {
        let batch = SiteBatch::from_parts("attic", Vec::new(), Vec::new()).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.site_id(), "attic");
    }

    #[test]
    fn command_message_wire_format() {
        let msg = CommandMessage {
            text: "turn on the lamp",
            phonetic: "TkN nN jc LaMP",
            site_id: "kitchen",
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"text":"turn on the lamp","phonetic":"TkN nN jc LaMP","siteId":"kitchen"}"#
        );
        assert_eq!(
            serde_json::to_string(&RemoveAllMessage { site_id: "kitchen" }).unwrap(),
            r#"{"siteId":"kitchen"}"#
        );
    }
}
