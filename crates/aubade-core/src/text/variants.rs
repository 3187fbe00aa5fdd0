//! Alternate renderings of artist and title strings.
//!
//! External catalogs disagree about collaboration credits and edition
//! subtitles, so lookups try a handful of variants. Each variant rule is a
//! plain function in an ordered table; adding a heuristic means adding a
//! row, not touching the generators.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::normalize;

/// A variant rule: raw input in, zero or more raw alternatives out.
type VariantRule = fn(&str) -> Vec<String>;

const ARTIST_RULES: &[(&str, VariantRule)] = &[("collaboration", split_collaboration)];

const TITLE_RULES: &[(&str, VariantRule)] = &[
    ("parenthetical", strip_parenthetical),
    ("colon subtitle", strip_colon_subtitle),
    ("dash subtitle", strip_dash_subtitle),
];

static COLLABORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:\band\b|/|&)\s*").expect("collaboration pattern is valid")
});

static TRAILING_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*[(\[][^()\[\]]*[)\]]\s*$").expect("parenthetical pattern is valid")
});

// Greedy prefixes so only the last separator is cut.
static COLON_SUBTITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):.*$").expect("colon pattern is valid"));

static DASH_SUBTITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+)\s+[-\u{2013}\u{2014}]\s+.*$").expect("dash pattern is valid")
});

/// Normalized artist variants, starting with the full credit.
///
/// `"Simon & Garfunkel"` yields `["simon & garfunkel", "simon", "garfunkel"]`.
#[must_use]
pub fn artist_variants(artist: &str) -> Vec<String> {
    apply_rules(artist, ARTIST_RULES)
}

/// Normalized title variants, starting with the full title.
///
/// `"Abbey Road (2019 Remix)"` yields `["abbey road 2019 remix", "abbey road"]`.
#[must_use]
pub fn title_variants(title: &str) -> Vec<String> {
    apply_rules(title, TITLE_RULES)
}

fn apply_rules(input: &str, rules: &[(&str, VariantRule)]) -> Vec<String> {
    let mut variants = Vec::new();
    push_unique(&mut variants, normalize(input));

    for (name, rule) in rules {
        for raw in rule(input) {
            let variant = normalize(&raw);
            if push_unique(&mut variants, variant) {
                log::trace!("Variant rule '{}' produced {:?}", name, raw);
            }
        }
    }

    variants
}

fn push_unique(variants: &mut Vec<String>, variant: String) -> bool {
    if variant.is_empty() || variants.contains(&variant) {
        return false;
    }
    variants.push(variant);
    true
}

fn split_collaboration(artist: &str) -> Vec<String> {
    let parts: Vec<String> = COLLABORATION
        .split(artist)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();

    if parts.len() > 1 {
        parts
    } else {
        Vec::new()
    }
}

fn strip_parenthetical(title: &str) -> Vec<String> {
    capture_prefix(&TRAILING_PARENTHETICAL, title)
}

fn strip_colon_subtitle(title: &str) -> Vec<String> {
    capture_prefix(&COLON_SUBTITLE, title)
}

fn strip_dash_subtitle(title: &str) -> Vec<String> {
    capture_prefix(&DASH_SUBTITLE, title)
}

fn capture_prefix(pattern: &Regex, input: &str) -> Vec<String> {
    pattern
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|prefix| !prefix.is_empty())
        .into_iter()
        .collect()
}
