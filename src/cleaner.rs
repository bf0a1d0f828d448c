//! Cross-attribute contamination cleaning.
//!
//! A type value must not contain the brand, a model must contain neither
//! brand nor type. Cleaning runs before any value is committed to memory;
//! a contaminated value written once would become permanent ground truth
//! for its key.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::vocab::BrandVocabulary;

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid ws regex"));

/// Remove already-resolved sibling values and any known brand from a
/// candidate value. Exact sibling text first (case-sensitive), then the
/// whole brand vocabulary case-insensitively. If cleaning consumes
/// everything the original value is kept; an empty memory value is worse
/// than a contaminated one.
pub fn clean_value(value: &str, siblings: &[&str], brands: &BrandVocabulary) -> String {
    let mut text = value.to_string();

    for sibling in siblings {
        if sibling.is_empty() {
            continue;
        }
        text = text.replace(sibling, " ");
    }

    for matcher in brands.matchers() {
        text = matcher.strip_from(&text);
    }

    text = MULTI_SPACE.replace_all(&text, " ").into_owned();
    let cleaned = text
        .trim()
        .trim_matches(|c: char| "-–—,.:;/|".contains(c) || c.is_whitespace())
        .to_string();

    if cleaned.is_empty() {
        value.trim().to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> BrandVocabulary {
        BrandVocabulary::builtin()
    }

    #[test]
    fn removes_resolved_brand_from_model() {
        assert_eq!(
            clean_value("Butterfly Tenergy 05", &["Butterfly"], &vocab()),
            "Tenergy 05"
        );
    }

    #[test]
    fn removes_type_and_brand_from_model() {
        assert_eq!(
            clean_value("Donic Potah Baracuda", &["Donic", "Potah"], &vocab()),
            "Baracuda"
        );
    }

    #[test]
    fn brand_vocabulary_pass_is_case_insensitive() {
        // sibling pass is case-sensitive and misses BUTTERFLY; the brand
        // vocabulary pass catches it
        assert_eq!(
            clean_value("BUTTERFLY Tenergy 05", &["Butterfly"], &vocab()),
            "Tenergy 05"
        );
    }

    #[test]
    fn fully_consumed_value_keeps_the_original() {
        assert_eq!(clean_value("Butterfly", &["Butterfly"], &vocab()), "Butterfly");
    }

    #[test]
    fn clean_value_is_substring_removal_not_word_removal() {
        assert_eq!(
            clean_value("Tenergy 05 FX", &["Tenergy 05"], &vocab()),
            "FX"
        );
    }
}
