//! Canonical comparison form for free-text artist and title strings.
//!
//! Normalized strings are only ever compared, never displayed. The
//! transformation is total and idempotent: normalizing an already
//! normalized string returns it unchanged.

use unicode_normalization::UnicodeNormalization;

/// Punctuation kept in titles unless every special character is stripped.
const TITLE_PUNCTUATION: &[char] = &['.', ',', '\'', '-', '&', '#', '*', '=', '/'];

/// Options for [`normalize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub lowercase: bool,
    /// Drop everything except letters, digits and spaces.
    pub strip_all_special: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_all_special: false,
        }
    }
}

/// Normalize with the default options (lowercase, keep title punctuation).
#[must_use]
pub fn normalize(input: &str) -> String {
    normalize_with(input, NormalizeOptions::default())
}

/// Normalize a display string into its comparison form.
///
/// Typographic variants are folded to their ASCII equivalents first, then
/// the string is optionally lowercased and decomposed (NFD) so combining
/// marks survive the character filter as separate code points. Whitespace
/// runs collapse to a single space.
#[must_use]
pub fn normalize_with(input: &str, options: NormalizeOptions) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let mut folded = String::with_capacity(input.len());
    for c in input.chars() {
        fold_char(c, &mut folded);
    }

    let cased = if options.lowercase {
        folded.to_lowercase()
    } else {
        folded
    };

    let filtered: String = cased
        .nfd()
        .filter(|&c| is_kept(c, options.strip_all_special))
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fold_char(c: char, out: &mut String) {
    match c {
        // Single quotes, primes, angle quotes
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2039}'
        | '\u{203A}' | '\u{0060}' | '\u{00B4}' | '\u{02BC}' => out.push('\''),
        // Double quotes
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}'
        | '\u{00BB}' => out.push('"'),
        // Hyphens and dashes, including the figure dash and minus sign
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => out.push('-'),
        '\u{2026}' => out.push_str("..."),
        '\u{2044}' | '\u{2215}' => out.push('/'),
        '\u{FF3C}' => out.push('\\'),
        '\u{266F}' | '\u{FF03}' => out.push('#'),
        '\u{FF06}' => out.push('&'),
        c if c.is_whitespace() => out.push(' '),
        c => out.push(c),
    }
}

fn is_kept(c: char, strip_all_special: bool) -> bool {
    if c.is_ascii_alphanumeric() || c == ' ' {
        return true;
    }
    if matches!(c,
        '\u{00C0}'..='\u{024F}'   // Latin-1 supplement letters and Latin extended
        | '\u{0300}'..='\u{036F}' // combining diacritical marks
        | '\u{0370}'..='\u{03FF}' // Greek and Coptic
        | '\u{0400}'..='\u{04FF}' // Cyrillic
    ) {
        return true;
    }
    !strip_all_special && TITLE_PUNCTUATION.contains(&c)
}
