//! Model extraction: subtractive stripping of everything that is not
//! the model name.
//!
//! Unlike the other extractors this one always answers. Removal order
//! matters: brands first, then type keywords, then variant tokens
//! (colors, garment sizes, thickness, shoe sizes), then separator and
//! whitespace cleanup. If stripping consumes the whole string the
//! original trimmed name is returned so a key never maps to an empty
//! model.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::vocab::{
    color_token_pattern, eu_shoe_size_pattern, size_token_pattern, strip_keyword_rules,
    thickness_patterns, us_size_patterns, BrandVocabulary,
};

// standalone dashes and all pipes/slashes; intra-word hyphens stay
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[-–—]+\s+|[|/\\]+").expect("valid separator regex"));

static EMPTY_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("valid bracket regex"));

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid ws regex"));

pub fn extract_model(name: &str, brands: &BrandVocabulary) -> String {
    let original = name.trim();

    let mut text = original.to_string();
    for matcher in brands.matchers() {
        text = matcher.strip_from(&text);
    }
    let mut text = text.trim().to_string();

    for rule in strip_keyword_rules() {
        if let Some(found) = rule.anchored.find(&text) {
            text = text[found.end()..].to_string();
        }
    }
    for rule in strip_keyword_rules() {
        if let Some(global) = &rule.global {
            text = global.replace_all(&text, " ").into_owned();
        }
    }

    text = color_token_pattern().replace_all(&text, " ").into_owned();
    text = size_token_pattern().replace_all(&text, " ").into_owned();
    for pattern in thickness_patterns() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    for pattern in us_size_patterns() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    text = eu_shoe_size_pattern().replace_all(&text, " ").into_owned();

    text = SEPARATORS.replace_all(&text, " ").into_owned();
    text = EMPTY_BRACKETS.replace_all(&text, " ").into_owned();
    text = MULTI_SPACE.replace_all(&text, " ").into_owned();

    let cleaned = text
        .trim()
        .trim_matches(|c: char| "-–—,.:;/|\\".contains(c) || c.is_whitespace())
        .to_string();

    if cleaned.is_empty() {
        original.to_string()
    } else {
        cleaned
    }
}
