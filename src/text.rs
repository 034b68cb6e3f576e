//! Text joining and normalization helpers.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Characters that end a sentence-like unit.
pub const TERMINATORS: [char; 5] = ['.', '!', '?', ':', ';'];

/// Word stems whose trailing hyphen belongs to a compound word.
const COMPOUND_PREFIXES: [&str; 9] = [
    "self", "non", "anti", "co", "semi", "quasi", "pseudo", "neo", "proto",
];

const LIGATURES: [(&str, &str); 7] = [
    ("\u{FB00}", "ff"),
    ("\u{FB01}", "fi"),
    ("\u{FB02}", "fl"),
    ("\u{FB03}", "ffi"),
    ("\u{FB04}", "ffl"),
    ("\u{FB05}", "st"),
    ("\u{FB06}", "st"),
];

/// Normalization applied to every text node on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextNormalizer {
    /// Compose to NFC
    pub normalize_unicode: bool,
    /// Expand typographic ligatures (ﬁ → fi)
    pub fix_ligatures: bool,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
        }
    }
}

impl TextNormalizer {
    pub fn apply(&self, text: &str) -> String {
        let mut result = if self.normalize_unicode {
            text.nfc().collect::<String>()
        } else {
            text.to_string()
        };
        if self.fix_ligatures {
            for (ligature, replacement) in LIGATURES {
                result = result.replace(ligature, replacement);
            }
        }
        collapse_whitespace(&result)
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last non-whitespace character is a sentence terminator.
pub fn ends_with_terminator(text: &str) -> bool {
    text.trim_end()
        .chars()
        .last()
        .map(|c| TERMINATORS.contains(&c))
        .unwrap_or(false)
}

/// Whether a space belongs between two adjacent runs on one line.
///
/// `gap` is the horizontal distance between them. No space goes between
/// two CJK characters or where either side already carries whitespace.
pub fn needs_space(prev: &str, curr: &str, gap: f32, font_size: f32) -> bool {
    if gap <= font_size * 0.15 {
        return false;
    }
    let prev_ws = prev.ends_with(char::is_whitespace);
    let curr_ws = curr.starts_with(char::is_whitespace);
    if prev_ws || curr_ws {
        return false;
    }
    let prev_cjk = prev.chars().last().map(is_spaceless_script_char).unwrap_or(false);
    let curr_cjk = curr.chars().next().map(is_spaceless_script_char).unwrap_or(false);
    !(prev_cjk && curr_cjk)
}

/// Join two pieces of running text split by a line or page break.
///
/// A trailing hyphen before a lowercase letter is a soft hyphen and is
/// dropped, unless the stem is a compound prefix or an acronym.
pub fn join_across_break(first: &str, second: &str) -> String {
    let first = first.trim_end();
    let second = second.trim_start();
    if first.is_empty() {
        return second.to_string();
    }
    if second.is_empty() {
        return first.to_string();
    }

    let starts_lower = second.chars().next().map(char::is_lowercase).unwrap_or(false);
    if let Some(stem_text) = first.strip_suffix('-') {
        if starts_lower {
            let stem: String = stem_text
                .chars()
                .rev()
                .take_while(|c| c.is_alphabetic())
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            if !stem.is_empty() {
                if keeps_hyphen(&stem) {
                    return format!("{}{}", first, second);
                }
                return format!("{}{}", stem_text, second);
            }
        }
    }
    format!("{} {}", first, second)
}

fn keeps_hyphen(stem: &str) -> bool {
    let lower = stem.to_lowercase();
    let is_acronym = stem.chars().count() >= 2 && stem.chars().all(|c| c.is_uppercase());
    is_acronym || COMPOUND_PREFIXES.contains(&lower.as_str())
}

/// Scripts written without spaces between words.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana, Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK symbols and punctuation
        || (0x3000..=0x303F).contains(&code)
}
