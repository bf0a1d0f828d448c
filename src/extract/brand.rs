//! Brand extraction: ordered first-match rules over the brand vocabulary.
//!
//! Never fails. A name with no recognizable manufacturer token resolves
//! to the house-brand sentinel, which is a valid answer, not an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::vocab::{BrandVocabulary, HOUSE_BRAND};

// "Dřevo Yasaka Sweden Extra", "Potahu Victas V>15"
static TYPE_PREFIX_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^dřev[oa]\s+(\p{L}+)").expect("valid brand prefix regex"),
        Regex::new(r"(?i)^potah[uůy]?\s+(\p{L}+)").expect("valid brand prefix regex"),
    ]
});

static HYPHEN_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{L}+)-").expect("valid hyphen prefix regex"));

static SLASH_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{L}+)\s*/\s*(\p{L}+)").expect("valid slash pair regex"));

/// Co-branded rackets carry both maker names; the blade maker listed
/// second is the one customers search for.
fn combined_brand_override(name: &str, matched: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    if matched.eq_ignore_ascii_case("gewo")
        && lower.contains("hallmark")
        && ["clutter", "combination", "aurora"]
            .iter()
            .any(|k| lower.contains(k))
    {
        return Some("Hallmark");
    }
    if matched.eq_ignore_ascii_case("hallmark")
        && lower.contains("gewo")
        && ["target", "neoflexx"].iter().any(|k| lower.contains(k))
    {
        return Some("Gewo");
    }
    None
}

/// Extract the manufacturer from a raw product name.
///
/// Rules in priority order:
/// 1. brand word right after a leading type noun ("Dřevo Yasaka ...")
/// 2. hyphenated brand prefix ("Joola-Rossi ...")
/// 3. slash-separated brand pair; LKT/KTL is the same maker renamed,
///    always reported as KTL
/// 4. name starts with a known brand (longest first), with co-branded
///    racket overrides
/// 5. known brand anywhere in the name (longest first)
/// 6. house-brand sentinel
pub fn extract_brand(name: &str, brands: &BrandVocabulary) -> String {
    let name = name.trim();

    for rule in TYPE_PREFIX_RULES.iter() {
        if let Some(caps) = rule.captures(name) {
            if let Some(canonical) = brands.canonical(&caps[1]) {
                return canonical.to_string();
            }
        }
    }

    if let Some(caps) = HYPHEN_PREFIX.captures(name) {
        if let Some(canonical) = brands.canonical(&caps[1]) {
            return canonical.to_string();
        }
    }

    if let Some(caps) = SLASH_PAIR.captures(name) {
        let (first, second) = (&caps[1], &caps[2]);
        let pair_is = |a: &str, b: &str| {
            first.eq_ignore_ascii_case(a) && second.eq_ignore_ascii_case(b)
        };
        if pair_is("LKT", "KTL") || pair_is("KTL", "LKT") {
            return "KTL".to_string();
        }
        if let Some(canonical) = brands.canonical(second) {
            return canonical.to_string();
        }
        if let Some(canonical) = brands.canonical(first) {
            return canonical.to_string();
        }
    }

    for matcher in brands.matchers() {
        if matcher.matches_start(name) {
            if let Some(other) = combined_brand_override(name, matcher.canonical()) {
                return other.to_string();
            }
            return matcher.canonical().to_string();
        }
    }

    for matcher in brands.matchers() {
        if matcher.matches_anywhere(name) {
            if let Some(other) = combined_brand_override(name, matcher.canonical()) {
                return other.to_string();
            }
            return matcher.canonical().to_string();
        }
    }

    HOUSE_BRAND.to_string()
}
