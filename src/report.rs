//! Memory quality audit: scans the learned namespaces for values that
//! slipped past cleaning. Reporting only; the audit never mutates the
//! store and never fails a run.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::memory::{AttributeKind, MemoryStore};
use crate::vocab::{strip_keyword_rules, BrandVocabulary, VALID_PRODUCT_TYPES};

/// German filler words that indicate an untranslated source fragment
/// leaked into a canonical value.
const GERMAN_WORDS: &[&str] = &[
    "mit", "und", "für", "der", "die", "das", "inkl", "stück", "neu", "vom", "aus", "zum",
    "oder", "auch",
];

/// Tokens suggesting a bundle that should carry the set type
const SET_INDICATORS: &[&str] = &["set", "sada", "sparset", "bundle", "+"];

static GERMAN_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = GERMAN_WORDS.join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("valid german word pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuditIssue {
    pub kind: AttributeKind,
    pub key: String,
    pub value: String,
    pub severity: Severity,
    pub problem: String,
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Scan model and type memory for contamination and translation leaks
pub fn audit(store: &MemoryStore, brands: &BrandVocabulary) -> AuditReport {
    let mut report = AuditReport::default();

    for (key, value) in store.snapshot(AttributeKind::Model) {
        if let Some(found) = GERMAN_WORD_PATTERN.find(&value) {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Model,
                key: key.clone(),
                value: value.clone(),
                severity: Severity::High,
                problem: format!("untranslated German word \"{}\"", found.as_str()),
            });
        }

        if let Some(matcher) = brands.matchers().iter().find(|m| m.matches_anywhere(&value)) {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Model,
                key: key.clone(),
                value: value.clone(),
                severity: Severity::High,
                problem: format!("brand \"{}\" in model value", matcher.canonical()),
            });
        }

        if let Some(rule) = strip_keyword_rules()
            .iter()
            .find(|r| r.global.as_ref().is_some_and(|g| g.is_match(&value)))
        {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Model,
                key: key.clone(),
                value: value.clone(),
                severity: Severity::Medium,
                problem: format!("type keyword \"{}\" in model value", rule.keyword),
            });
        }

        let value_lower = value.to_lowercase();
        if SET_INDICATORS.iter().any(|s| value_lower.contains(s)) {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Model,
                key,
                value,
                severity: Severity::Low,
                problem: "set indicator in model value".to_string(),
            });
        }
    }

    for (key, value) in store.snapshot(AttributeKind::Type) {
        if !VALID_PRODUCT_TYPES.contains(&value.as_str()) {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Type,
                key: key.clone(),
                value: value.clone(),
                severity: Severity::Medium,
                problem: "type value outside the canonical vocabulary".to_string(),
            });
        }

        if let Some(matcher) = brands.matchers().iter().find(|m| m.matches_anywhere(&value)) {
            report.issues.push(AuditIssue {
                kind: AttributeKind::Type,
                key,
                value,
                severity: Severity::High,
                problem: format!("brand \"{}\" in type value", matcher.canonical()),
            });
        }
    }

    info!(
        issues = report.issues.len(),
        high = report.count(Severity::High),
        medium = report.count(Severity::Medium),
        low = report.count(Severity::Low),
        "memory audit finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Language;

    fn store_with(entries: &[(AttributeKind, &str, &str)]) -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), Language::new("CS")).unwrap();
        for (kind, key, value) in entries {
            store.commit(*kind, key, value).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn clean_memory_has_no_issues() {
        let (_dir, store) = store_with(&[
            (AttributeKind::Model, "k1", "Tenergy 05"),
            (AttributeKind::Type, "k1", "Potah"),
        ]);
        let report = audit(&store, &BrandVocabulary::builtin());
        assert!(report.is_clean());
    }

    #[test]
    fn brand_contamination_in_model_is_high_severity() {
        let (_dir, store) =
            store_with(&[(AttributeKind::Model, "k1", "Butterfly Tenergy 05")]);
        let report = audit(&store, &BrandVocabulary::builtin());
        assert_eq!(report.count(Severity::High), 1);
    }

    #[test]
    fn german_leak_and_type_keyword_are_flagged() {
        let (_dir, store) =
            store_with(&[(AttributeKind::Model, "k1", "Belag mit Schutzfolie")]);
        let report = audit(&store, &BrandVocabulary::builtin());
        assert_eq!(report.count(Severity::High), 1); // "mit"
        assert_eq!(report.count(Severity::Medium), 1); // "belag"
    }

    #[test]
    fn off_vocabulary_type_is_flagged() {
        let (_dir, store) = store_with(&[(AttributeKind::Type, "k1", "Gummi")]);
        let report = audit(&store, &BrandVocabulary::builtin());
        assert_eq!(report.count(Severity::Medium), 1);
    }
}
