//! Variant token patterns stripped from model names: colors, garment
//! sizes, sponge thickness, shoe sizes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Color words seen in variant suffixes across German, English and Czech
const COLOR_TOKENS: &[&str] = &[
    // German
    "schwarz", "rot", "blau", "grün", "gelb", "weiß", "weiss", "grau", "orange", "pink", "lila",
    "violett", "braun", "türkis", "anthrazit", "marine", "navy", "bordeaux",
    // English
    "black", "red", "blue", "green", "yellow", "white", "grey", "gray", "purple", "brown",
    "turquoise", "magenta", "cyan",
    // Czech
    "černá", "černý", "červená", "červený", "modrá", "modrý", "zelená", "zelený", "žlutá",
    "žlutý", "bílá", "bílý", "šedá", "šedý", "růžová", "růžový", "fialová", "fialový", "hnědá",
    "hnědý", "oranžová", "oranžový",
];

static COLOR_TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = COLOR_TOKENS
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).expect("valid color pattern")
});

static SIZE_TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Longest alternatives first so XXL is not split as X + XL
    Regex::new(r"(?i)\b(XXXXXXL|XXXXXL|XXXXL|XXXL|XXL|XXS|[3-7]XL|XS|XL|S|M|L)\b")
        .expect("valid size pattern")
});

static THICKNESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // 2.1 mm, 1,8mm
        Regex::new(r"(?i)\b\d+[,.]?\d*\s*mm\b").expect("valid thickness pattern"),
        // bare decimal thickness: 2.1, 1,5
        Regex::new(r"\b\d+[,.]\d+\b").expect("valid thickness pattern"),
        // hard-rubber thickness marker
        Regex::new(r"(?i)\bOX\b").expect("valid thickness pattern"),
        // blade angles: 45°
        Regex::new(r"\b\d+°").expect("valid thickness pattern"),
    ]
});

static US_SIZE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "42 / US 8.5", an EU size with its US conversion
        Regex::new(r"(?i)\s*\d+[,.]?\d*\s*/\s*US\s*\d+[,.]?\d*").expect("valid US size pattern"),
        // dangling "/ US 8" fragment
        Regex::new(r"(?i)\s*/\s*US\s*\d*[,.]?\d*").expect("valid US size pattern"),
    ]
});

// EU shoe sizes only: a bare 05 or 25 is a rubber model number, not a size
static EU_SHOE_SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(3[6-9]|4[0-9]|5[0-2])\b").expect("valid shoe size pattern"));

/// Whole-word color token alternation
pub fn color_token_pattern() -> &'static Regex {
    &COLOR_TOKEN_PATTERN
}

/// Garment size tokens (XS through XXXXXXL, 3XL-7XL)
pub fn size_token_pattern() -> &'static Regex {
    &SIZE_TOKEN_PATTERN
}

/// Sponge thickness and blade angle tokens, in strip order
pub fn thickness_patterns() -> &'static [Regex] {
    &THICKNESS_PATTERNS
}

/// US shoe size conversion fragments, in strip order
pub fn us_size_patterns() -> &'static [Regex] {
    &US_SIZE_PATTERNS
}

/// EU shoe sizes 36-52
pub fn eu_shoe_size_pattern() -> &'static Regex {
    &EU_SHOE_SIZE_PATTERN
}
