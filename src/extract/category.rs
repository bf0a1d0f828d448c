//! Category extraction: ordered first-match keyword rules.
//!
//! Categories group products for the eshop navigation tree and only a
//! handful of them are heuristically detectable; everything else goes
//! through the oracle. `Vyřadit` is a control value meaning "discard
//! this product", not a real category.

use once_cell::sync::Lazy;
use regex::Regex;

/// Control value: the product should be dropped from the export
pub const DISCARD_CATEGORY: &str = "Vyřadit";

struct CategoryRule {
    pattern: Regex,
    canonical: &'static str,
}

static CATEGORY_RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    let rule = |pattern: &str, canonical: &'static str| CategoryRule {
        pattern: Regex::new(&format!("(?i){}", pattern)).expect("valid category regex"),
        canonical,
    };
    vec![
        rule(r"\b(pokal|troph(y|ies)|pohár)", "Poháry"),
        rule(r"\b(netz|net|síť)", "Síťky"),
        rule(r"^\d+(er|x)\s+set\b|\bsada\b", "Sada"),
        // green-table training gear is not stocked
        rule(r"\btable\b.*\bgreen\b", DISCARD_CATEGORY),
        rule(r"\b(kettchen|chain|řetíz)", "Řetízky"),
    ]
});

/// First matching category rule, or None when only the oracle can tell
pub fn extract_category(name: &str) -> Option<&'static str> {
    CATEGORY_RULES
        .iter()
        .find(|r| r.pattern.is_match(name))
        .map(|r| r.canonical)
}
