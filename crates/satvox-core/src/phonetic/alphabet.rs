// ── Reduced phoneme alphabet ──
//
// Maps ARPAbet labels onto the single-character alphabet the satellites'
// command recognizer expects. Consonants keep their own letter (upper case),
// every stress variant of a vowel folds onto one lower-case symbol, and the
// word separator stays a space.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Label the G2P emits between words.
pub const WORD_SEPARATOR: &str = " ";

#[rustfmt::skip]
pub const REDUCTION_TABLE: &[(&str, char)] = &[
    (WORD_SEPARATOR, ' '),
    // Vowels (stress 0/1/2 collapse)
    ("AA0", 'n'), ("AA1", 'n'), ("AA2", 'n'),
    ("AE0", 'a'), ("AE1", 'a'), ("AE2", 'a'),
    ("AH0", 'c'), ("AH1", 'c'), ("AH2", 'c'),
    ("AO0", 'e'), ("AO1", 'e'), ("AO2", 'e'),
    ("AW0", 't'), ("AW1", 't'), ("AW2", 't'),
    ("AY0", 'i'), ("AY1", 'i'), ("AY2", 'i'),
    ("EH0", 'f'), ("EH1", 'f'), ("EH2", 'f'),
    ("ER0", 'k'), ("ER1", 'k'), ("ER2", 'k'),
    ("EY0", 'd'), ("EY1", 'd'), ("EY2", 'd'),
    ("IH0", 'g'), ("IH1", 'g'), ("IH2", 'g'),
    ("IY0", 'm'), ("IY1", 'm'), ("IY2", 'm'),
    ("OW0", 'b'), ("OW1", 'b'), ("OW2", 'b'),
    ("OY0", 'u'), ("OY1", 'u'), ("OY2", 'u'),
    ("UH0", 'w'), ("UH1", 'w'), ("UH2", 'w'),
    ("UW0", 'o'), ("UW1", 'o'), ("UW2", 'o'),
    // Consonants
    ("B", 'B'), ("CH", 'p'), ("D", 'D'), ("DH", 'j'), ("F", 'F'), ("G", 'G'),
    ("HH", 'h'), ("JH", 'q'), ("K", 'K'), ("L", 'L'), ("M", 'M'), ("N", 'N'),
    ("NG", 'l'), ("P", 'P'), ("R", 'R'), ("S", 'S'), ("SH", 's'), ("T", 'T'),
    ("TH", 'v'), ("V", 'V'), ("W", 'W'), ("Y", 'Y'), ("Z", 'Z'), ("ZH", 'r'),
];

static TABLE: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| REDUCTION_TABLE.iter().copied().collect());

/// Reduced symbol for `label`, or `None` if the label is not in the table.
pub fn reduce(label: &str) -> Option<char> {
    TABLE.get(label).copied()
}
