//! Phonetic encoding of phrases into the reduced alphabet.

pub mod alphabet;
pub mod g2p;
mod lexicon;

pub use alphabet::{REDUCTION_TABLE, WORD_SEPARATOR, reduce};
pub use g2p::{GraphemeToPhoneme, PronouncingDictionary};

use tracing::warn;

/// Clause delimiter in both the input phrase and the encoded output.
pub const CLAUSE_SEPARATOR: char = ',';

/// Turns phrases into reduced-alphabet phonetic strings.
///
/// Each comma-separated clause is converted independently and the results
/// are re-joined with commas. Labels missing from the reduction table are
/// dropped with a warning; they never abort encoding.
#[derive(Debug, Clone)]
pub struct PhoneticEncoder<G> {
    g2p: G,
}

impl<G: GraphemeToPhoneme> PhoneticEncoder<G> {
    pub fn new(g2p: G) -> Self {
        Self { g2p }
    }

    /// Encode a single phrase.
    pub fn encode(&self, phrase: &str) -> String {
        phrase
            .split(CLAUSE_SEPARATOR)
            .map(|clause| self.encode_clause(clause))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Encode phrases, preserving count and order.
    pub fn encode_all<S: AsRef<str>>(&self, phrases: &[S]) -> Vec<String> {
        phrases
            .iter()
            .map(|phrase| self.encode(phrase.as_ref()))
            .collect()
    }

    fn encode_clause(&self, clause: &str) -> String {
        let mut out = String::new();
        for label in self.g2p.phonemes(clause) {
            match reduce(&label) {
                Some(symbol) => out.push(symbol),
                None => warn!(label = %label, clause, "skip phoneme, not found in alphabet"),
            }
        }
        out
    }
}
