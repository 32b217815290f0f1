//! Name shorthashes and the reserved-word tables
//!
//! A shorthash packs up to the first 8 bytes of a name into a `u64`
//! (little-endian). Symbol lookups compare shorthashes before doing a full
//! name comparison. Two names that share an 8-byte prefix have the same
//! shorthash, so the full comparison is always required on a match.

/// Pack up to the first 8 bytes of `name` into a number
#[must_use]
pub fn shorthash(name: &str) -> u64 {
    name.bytes()
        .take(8)
        .enumerate()
        .fold(0, |acc, (i, byte)| acc | (u64::from(byte) << (i * 8)))
}

/// A reserved word with its precomputed shorthash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry {
    pub name: &'static str,
    pub shorthash: u64,
}

const fn entry(name: &'static str, shorthash: u64) -> KeywordEntry {
    KeywordEntry { name, shorthash }
}

/// Words that evaluate to a value
pub const CONSTANTS: [KeywordEntry; 6] = [
    entry("true", 1_702_195_828),
    entry("self", 1_718_379_891),
    entry("false", 435_728_179_558),
    entry("__file__", 6_872_323_072_689_856_351),
    entry("__line__", 6_872_323_081_280_184_159),
    entry("__function__", 7_598_807_797_348_065_119),
];

pub const CONST_TRUE: usize = 0;
pub const CONST_SELF: usize = 1;
pub const CONST_FALSE: usize = 2;
pub const CONST_FILE: usize = 3;
pub const CONST_LINE: usize = 4;
pub const CONST_FUNCTION: usize = 5;

/// Statement keywords
pub const KEYWORDS: [KeywordEntry; 21] = [
    entry("if", 26_217),
    entry("do", 28_516),
    entry("var", 7_496_054),
    entry("for", 7_499_622),
    entry("try", 7_959_156),
    entry("case", 1_702_060_387),
    entry("else", 1_702_063_205),
    entry("elif", 1_718_185_061),
    entry("enum", 1_836_412_517),
    entry("while", 435_610_544_247),
    entry("raise", 435_727_982_962),
    entry("match", 448_345_170_285),
    entry("break", 461_195_539_042),
    entry("class", 495_857_003_619),
    entry("define", 111_524_889_126_244),
    entry("return", 121_437_875_889_522),
    entry("except", 128_026_086_176_869),
    entry("import", 128_034_844_732_777),
    entry("private", 28_556_934_595_048_048),
    entry("protected", 7_310_577_382_525_465_200),
    entry("continue", 7_310_870_969_309_884_259),
];

pub const KEY_IF: usize = 0;
pub const KEY_DO: usize = 1;
pub const KEY_VAR: usize = 2;
pub const KEY_FOR: usize = 3;
pub const KEY_TRY: usize = 4;
pub const KEY_CASE: usize = 5;
pub const KEY_ELSE: usize = 6;
pub const KEY_ELIF: usize = 7;
pub const KEY_ENUM: usize = 8;
pub const KEY_WHILE: usize = 9;
pub const KEY_RAISE: usize = 10;
pub const KEY_MATCH: usize = 11;
pub const KEY_BREAK: usize = 12;
pub const KEY_CLASS: usize = 13;
pub const KEY_DEFINE: usize = 14;
pub const KEY_RETURN: usize = 15;
pub const KEY_EXCEPT: usize = 16;
pub const KEY_IMPORT: usize = 17;
pub const KEY_PRIVATE: usize = 18;
pub const KEY_PROTECTED: usize = 19;
pub const KEY_CONTINUE: usize = 20;

fn find_in(table: &[KeywordEntry], name: &str) -> Option<usize> {
    let hash = shorthash(name);
    table
        .iter()
        .position(|entry| entry.shorthash == hash && entry.name == name)
}

/// Index of `name` in [`KEYWORDS`], if it is a keyword
#[must_use]
pub fn keyword_index(name: &str) -> Option<usize> {
    find_in(&KEYWORDS, name)
}

/// Index of `name` in [`CONSTANTS`], if it is a constant word
#[must_use]
pub fn constant_index(name: &str) -> Option<usize> {
    find_in(&CONSTANTS, name)
}
