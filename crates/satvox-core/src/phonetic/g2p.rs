//! Grapheme-to-phoneme conversion.
//!
//! [`GraphemeToPhoneme`] is the narrow capability the encoder depends on.
//! [`PronouncingDictionary`] implements it with a CMUdict-style lexicon and
//! a small letter-to-sound fallback for words the lexicon does not know.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use super::alphabet::WORD_SEPARATOR;
use super::lexicon::{BUILTIN, DIGIT_WORDS};
use crate::error::CoreError;

/// Converts text into an ordered sequence of ARPAbet phoneme labels.
///
/// Words are separated by the [`WORD_SEPARATOR`] label.
pub trait GraphemeToPhoneme {
    fn phonemes(&self, text: &str) -> Vec<String>;
}

impl<T: GraphemeToPhoneme + ?Sized> GraphemeToPhoneme for &T {
    fn phonemes(&self, text: &str) -> Vec<String> {
        (**self).phonemes(text)
    }
}

// ── PronouncingDictionary ────────────────────────────────────────────

/// Word → phoneme lexicon keyed by upper-case spelling.
#[derive(Debug, Clone, Default)]
pub struct PronouncingDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl PronouncingDictionary {
    /// The compiled-in lexicon covering template words, digits and common
    /// room/fixture names.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(word, phones)| {
                (
                    (*word).to_owned(),
                    phones.split_whitespace().map(str::to_owned).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse CMUdict text: `WORD  PH1 PH2 ...` per line, `;;;` comment lines
    /// and trailing `# ...` comments.
    ///
    /// Alternate pronunciations (`WORD(1)`) are ignored; the first one wins.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut entries = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.split_once('#').map_or(line, |(entry, _)| entry).trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            if word.ends_with(')') {
                continue;
            }

            let phones: Vec<String> = fields.map(str::to_owned).collect();
            if phones.is_empty() {
                return Err(CoreError::Dictionary {
                    message: format!("line {}: '{word}' has no phonemes", index + 1),
                });
            }

            entries
                .entry(word.to_ascii_uppercase())
                .or_insert(phones);
        }

        Ok(Self { entries })
    }

    /// Read and parse a CMUdict-format file.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::Dictionary {
            message: format!("{}: {e}", path.display()),
        })?;
        let dictionary = Self::parse(&text)?;
        debug!(path = %path.display(), words = dictionary.len(), "loaded pronouncing dictionary");
        Ok(dictionary)
    }

    /// Add `other`'s entries, replacing existing ones.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    pub fn lookup(&self, word: &str) -> Option<&[String]> {
        self.entries
            .get(&word.to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn word_phonemes(&self, word: &str) -> Vec<String> {
        if let Some(phones) = self.lookup(word) {
            return phones.to_vec();
        }
        let cleaned: String = word.chars().filter(|c| *c != '\'').collect();
        if let Some(phones) = self.lookup(&cleaned) {
            return phones.to_vec();
        }
        debug!(word, "not in lexicon, using letter-to-sound rules");
        letter_to_sound(&cleaned)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

impl GraphemeToPhoneme for PronouncingDictionary {
    fn phonemes(&self, text: &str) -> Vec<String> {
        let mut labels = Vec::new();

        for word in spoken_words(text) {
            let phones = self.word_phonemes(&word);
            if phones.is_empty() {
                continue;
            }
            if !labels.is_empty() {
                labels.push(WORD_SEPARATOR.to_owned());
            }
            labels.extend(phones);
        }

        labels
    }
}

// ── Tokenization ─────────────────────────────────────────────────────

/// Split text into the words that are actually spoken: runs of ASCII
/// letters (apostrophes kept), with every digit read out on its own.
fn spoken_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_ascii_alphabetic() || (c == '\'' && !current.is_empty()) {
            current.push(c.to_ascii_uppercase());
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        if let Some(digit) = c.to_digit(10) {
            let index = usize::try_from(digit).unwrap_or_default();
            words.push(DIGIT_WORDS[index].to_owned());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

// ── Letter-to-sound fallback ─────────────────────────────────────────

/// Naive English spelling rules. Good enough to give unknown names a
/// stable, roughly pronounceable encoding.
fn letter_to_sound(word: &str) -> Vec<&'static str> {
    let letters: Vec<char> = word
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut phones = Vec::new();
    let mut i = 0;

    while let Some(&c) = letters.get(i) {
        let next = letters.get(i + 1).copied();

        let digraph: Option<&[&'static str]> = match (c, next) {
            ('c', Some('h')) => Some(&["CH"]),
            ('s', Some('h')) => Some(&["SH"]),
            ('t', Some('h')) => Some(&["TH"]),
            ('p', Some('h')) => Some(&["F"]),
            ('w', Some('h')) => Some(&["W"]),
            ('n', Some('g')) => Some(&["NG"]),
            ('c', Some('k')) => Some(&["K"]),
            ('q', Some('u')) => Some(&["K", "W"]),
            ('e', Some('e' | 'a')) => Some(&["IY1"]),
            ('o', Some('o')) => Some(&["UW1"]),
            ('o', Some('u' | 'w')) => Some(&["AW1"]),
            ('o', Some('a')) => Some(&["OW1"]),
            ('o', Some('i' | 'y')) => Some(&["OY1"]),
            ('a', Some('i' | 'y')) => Some(&["EY1"]),
            ('a', Some('u' | 'w')) => Some(&["AO1"]),
            _ => None,
        };
        if let Some(digraph) = digraph {
            phones.extend_from_slice(digraph);
            i += 2;
            continue;
        }

        // Doubled consonants are pronounced once.
        if i > 0 && letters.get(i - 1) == Some(&c) && !is_vowel(c) {
            i += 1;
            continue;
        }

        let is_last = i + 1 == letters.len();
        match c {
            'a' => phones.push("AE1"),
            'b' => phones.push("B"),
            'c' if matches!(next, Some('e' | 'i' | 'y')) => phones.push("S"),
            'c' | 'k' | 'q' => phones.push("K"),
            'd' => phones.push("D"),
            'e' if is_last && i > 0 => {}
            'e' => phones.push("EH1"),
            'f' => phones.push("F"),
            'g' => phones.push("G"),
            'h' => phones.push("HH"),
            'i' => phones.push("IH1"),
            'j' => phones.push("JH"),
            'l' => phones.push("L"),
            'm' => phones.push("M"),
            'n' => phones.push("N"),
            'o' => phones.push("AA1"),
            'p' => phones.push("P"),
            'r' => phones.push("R"),
            's' => phones.push("S"),
            't' => phones.push("T"),
            'u' => phones.push("AH1"),
            'v' => phones.push("V"),
            'w' => phones.push("W"),
            'x' => phones.extend_from_slice(&["K", "S"]),
            'y' if i == 0 => phones.push("Y"),
            'y' => phones.push("IY0"),
            'z' => phones.push("Z"),
            _ => {}
        }
        i += 1;
    }

    phones
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
