// Built-in pronunciations (CMUdict, first variant) for the template words,
// digits and common room/fixture names. A full dictionary file can be merged
// on top via `PronouncingDictionary::merge`.

#[rustfmt::skip]
pub(crate) const BUILTIN: &[(&str, &str)] = &[
    // Template vocabulary
    ("TURN", "T ER1 N"),
    ("ON", "AA1 N"),
    ("OFF", "AO1 F"),
    ("THE", "DH AH0"),
    ("SWITCH", "S W IH1 CH"),
    ("ACTIVATE", "AE1 K T AH0 V EY2 T"),
    ("DEACTIVATE", "D IY0 AE1 K T AH0 V EY2 T"),
    // Digits
    ("ZERO", "Z IY1 R OW0"),
    ("ONE", "W AH1 N"),
    ("TWO", "T UW1"),
    ("THREE", "TH R IY1"),
    ("FOUR", "F AO1 R"),
    ("FIVE", "F AY1 V"),
    ("SIX", "S IH1 K S"),
    ("SEVEN", "S EH1 V AH0 N"),
    ("EIGHT", "EY1 T"),
    ("NINE", "N AY1 N"),
    // Fixtures
    ("LAMP", "L AE1 M P"),
    ("LAMPS", "L AE1 M P S"),
    ("LIGHT", "L AY1 T"),
    ("LIGHTS", "L AY1 T S"),
    ("CEILING", "S IY1 L IH0 NG"),
    ("DESK", "D EH1 S K"),
    ("FLOOR", "F L AO1 R"),
    ("TABLE", "T EY1 B AH0 L"),
    ("STRIP", "S T R IH1 P"),
    ("LED", "L EH1 D"),
    ("SPOT", "S P AA1 T"),
    ("SPOTS", "S P AA1 T S"),
    ("READING", "R IY1 D IH0 NG"),
    ("NIGHT", "N AY1 T"),
    ("WALL", "W AO1 L"),
    ("ALL", "AO1 L"),
    ("MAIN", "M EY1 N"),
    // Rooms
    ("KITCHEN", "K IH1 CH AH0 N"),
    ("BEDROOM", "B EH1 D R UW2 M"),
    ("BATHROOM", "B AE1 TH R UW2 M"),
    ("LIVING", "L IH1 V IH0 NG"),
    ("ROOM", "R UW1 M"),
    ("DINING", "D AY1 N IH0 NG"),
    ("HALL", "HH AO1 L"),
    ("HALLWAY", "HH AO1 L W EY2"),
    ("OFFICE", "AO1 F AH0 S"),
    ("PORCH", "P AO1 R CH"),
    ("GARDEN", "G AA1 R D AH0 N"),
    ("GARAGE", "G ER0 AA1 ZH"),
    ("STAIRS", "S T EH1 R Z"),
    ("FRONT", "F R AH1 N T"),
    ("BACK", "B AE1 K"),
    ("DOOR", "D AO1 R"),
    ("BED", "B EH1 D"),
];

/// Spelled-out digits, indexed by value.
pub(crate) const DIGIT_WORDS: [&str; 10] = [
    "ZERO", "ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE",
];
