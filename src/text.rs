//! Question text normalization.
//!
//! Two question texts are "the same question" when their [`normalize`] output
//! is equal. Schema files may carry non-ASCII characters either as literal
//! UTF-8 or as `\uXXXX` escape text left behind by other tools, so decoding
//! those escapes is the first step of every comparison.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Punctuation ignored when comparing questions (Spanish opening/closing marks included).
const IGNORED_PUNCTUATION: [char; 4] = ['¿', '?', '¡', '!'];

fn escape_regex() -> &'static Regex {
    static ESCAPE: OnceLock<Regex> = OnceLock::new();
    ESCAPE.get_or_init(|| {
        Regex::new(
            r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})",
        )
        .unwrap()
    })
}

/// Decode every `\uXXXX` escape sequence in `text` into the character it names.
///
/// A high/low surrogate pair written as two escapes decodes to a single
/// character. A lone surrogate cannot be represented in a Rust string and is
/// left as it was written. Text without escapes is returned unchanged.
pub fn decode_unicode(text: &str) -> String {
    escape_regex()
        .replace_all(text, |caps: &Captures| {
            let decoded = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(high), Some(low), _) => {
                    let high = code_unit(high.as_str());
                    let low = code_unit(low.as_str());
                    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
                }
                (_, _, Some(unit)) => char::from_u32(code_unit(unit.as_str())),
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

fn code_unit(hex: &str) -> u32 {
    // the regex only matches four hex digits
    u32::from_str_radix(hex, 16).unwrap_or_default()
}

/// Normalize question text for identity comparison.
///
/// Applies, in order:
/// 1. `\uXXXX` decoding
/// 2. Lowercase
/// 3. Diacritic folding (NFD decomposition, combining marks dropped)
/// 4. Removal of `¿ ? ¡ !`
/// 5. Whitespace collapse and trim
///
/// The pipeline is repeated until the output stops changing, so the result is
/// always a fixed point: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut current = normalize_once(text);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    decode_unicode(text)
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !IGNORED_PUNCTUATION.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lighter comparison key: trim and decode only, case and punctuation kept.
///
/// Used by [`crate::session::MatchRule::Loose`].
pub fn comparison_key(text: &str) -> String {
    decode_unicode(text.trim()).trim().to_string()
}
