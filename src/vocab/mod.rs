//! Static, language-neutral reference data: known brands, scored type
//! keyword rules, variant token lists. Pure data; versioned implicitly by
//! code changes.

mod brands;
mod product_types;
mod variants;

pub use brands::{BrandVocabulary, KNOWN_BRANDS};
pub use product_types::{
    strip_keyword_rules, type_rule_groups, StripRule, TypeRule, TypeRuleGroup, DEFAULT_TYPE,
    TYPE_SCORE_THRESHOLD, VALID_PRODUCT_TYPES,
};
pub use variants::{
    color_token_pattern, eu_shoe_size_pattern, size_token_pattern, thickness_patterns,
    us_size_patterns,
};

/// Sentinel brand meaning "no recognizable manufacturer", not an error.
/// Products without a detectable brand are carried under the house brand.
pub const HOUSE_BRAND: &str = "Desaka";
