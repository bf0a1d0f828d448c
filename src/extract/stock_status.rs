//! Stock-status normalization: exact phrase table plus quantity and
//! lead-time templates.
//!
//! Unmatched statuses return None; the resolver passes the source text
//! through unchanged without memoizing it, so a later improved rule or
//! a human correction can still take effect.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrases that all mean "in stock, ships immediately"
const IN_STOCK_PHRASES: &[&str] = &[
    "skladem",
    "na skladě",
    "ihned",
    "sofort versandbereit",
    "sofort lieferbar",
    "in stock",
    "available",
    "auf lager",
];

struct QuantityTemplate {
    pattern: Regex,
}

static QUANTITY_TEMPLATES: Lazy<Vec<QuantityTemplate>> = Lazy::new(|| {
    let tpl = |pattern: &str| QuantityTemplate {
        pattern: Regex::new(&format!("(?i){}", pattern)).expect("valid stock template regex"),
    };
    vec![
        tpl(r"nur noch (\d+) übrig"),
        tpl(r"pouze (\d+) ks"),
    ]
});

static LEAD_TIME_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)dodání do (\d+) pracovních? dn").expect("valid stock template regex")
});

static LEAD_TIME_RANGE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)lieferzeit (\d+)-(\d+) werktage").expect("valid stock template regex"),
        Regex::new(r"(?i)delivery (\d+)-(\d+) days").expect("valid stock template regex"),
    ]
});

/// Normalize a scraped availability phrase to canonical Czech
pub fn extract_stock_status(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    if IN_STOCK_PHRASES.iter().any(|p| lower == *p) {
        return Some("skladem".to_string());
    }

    for template in QUANTITY_TEMPLATES.iter() {
        if let Some(caps) = template.pattern.captures(trimmed) {
            return Some(format!("Pouze {} ks skladem, ihned k odeslání", &caps[1]));
        }
    }

    if let Some(caps) = LEAD_TIME_SINGLE.captures(trimmed) {
        return Some(format!("Dodání do {} pracovních dní", &caps[1]));
    }

    for pattern in LEAD_TIME_RANGE.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            return Some(format!("Dodání do {}-{} pracovních dní", &caps[1], &caps[2]));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_stock_phrases_normalize_across_languages() {
        assert_eq!(extract_stock_status("skladem"), Some("skladem".into()));
        assert_eq!(extract_stock_status("Sofort lieferbar"), Some("skladem".into()));
        assert_eq!(extract_stock_status("  auf Lager "), Some("skladem".into()));
    }

    #[test]
    fn quantity_templates_carry_the_count() {
        assert_eq!(
            extract_stock_status("Nur noch 3 übrig"),
            Some("Pouze 3 ks skladem, ihned k odeslání".into())
        );
        assert_eq!(
            extract_stock_status("pouze 2 ks"),
            Some("Pouze 2 ks skladem, ihned k odeslání".into())
        );
    }

    #[test]
    fn lead_time_templates() {
        assert_eq!(
            extract_stock_status("Lieferzeit 3-5 Werktage"),
            Some("Dodání do 3-5 pracovních dní".into())
        );
        assert_eq!(
            extract_stock_status("dodání do 10 pracovních dní"),
            Some("Dodání do 10 pracovních dní".into())
        );
    }

    #[test]
    fn unknown_statuses_are_left_unresolved() {
        assert_eq!(extract_stock_status("ausverkauft bis auf weiteres"), None);
    }
}
