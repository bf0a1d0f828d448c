//! Known manufacturer names with canonical casing.
//!
//! Matching is case-insensitive, whole-word, longest-name-first so that
//! "Der Materialspezialist" is never shadowed by a shorter prefix. The
//! returned value always carries the casing listed here.

use regex::Regex;

/// Closed vocabulary of manufacturers seen across the scraped eshops.
/// Spelling variants (spacing, umlauts) are listed as separate entries.
/// The house-brand sentinel is deliberately absent.
pub const KNOWN_BRANDS: &[&str] = &[
    "Adidas",
    "Andro",
    "Armstrong",
    "Asics",
    "Avalox",
    "Barna",
    "Blackstone",
    "Bomb",
    "Butterfly",
    "Carlton",
    "Contra",
    "Cornilleau",
    "CTT",
    "Dawei",
    "Der Materialspezialist",
    "DHS",
    "Dingo Swiss",
    "DMS",
    "Donic",
    "Double Fish",
    "Dr. Neubauer",
    "Enebe",
    "Enlio",
    "Exacto",
    "FastPong",
    "Friendship",
    "FS",
    "Gambler",
    "Gewo",
    "Giant Dragon",
    "Globe",
    "Hallmark",
    "Hanno",
    "Imperial",
    "JapTec",
    "Joola",
    "Juic",
    "Kingnik",
    "Kokutaku",
    "KTL",
    "Lear",
    "Lion",
    "LKT",
    "Milky Way",
    "Mizuno",
    "Nexy",
    "Nittaku",
    "Palio",
    "PimplePark",
    "Sanwei",
    "Sauer & Troeger",
    "Sauer & Tröger",
    "Sauer&Troeger",
    "Sauer&Tröger",
    "Schildkröt",
    "SoulSpin",
    "Spinlord",
    "SpinWay",
    "SportSpin",
    "Stiga",
    "SunFlex",
    "Sword",
    "Tibhar",
    "TSP",
    "Tuning",
    "Turnier",
    "Tuttle",
    "Victas",
    "VseNaStolniTenis",
    "vše na stolní tenis",
    "Vulkan",
    "Xiom",
    "Xushaofa",
    "Yasaka",
    "YinHe",
];

/// One brand with its precompiled whole-word matchers
pub struct BrandMatcher {
    canonical: String,
    at_start: Regex,
    anywhere: Regex,
}

impl BrandMatcher {
    fn new(canonical: &str) -> Self {
        let escaped = regex::escape(canonical);
        Self {
            canonical: canonical.to_string(),
            at_start: Regex::new(&format!(r"(?i)^{}\b", escaped)).expect("valid brand regex"),
            anywhere: Regex::new(&format!(r"(?i)\b{}\b", escaped)).expect("valid brand regex"),
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn matches_start(&self, text: &str) -> bool {
        self.at_start.is_match(text)
    }

    pub fn matches_anywhere(&self, text: &str) -> bool {
        self.anywhere.is_match(text)
    }

    /// Remove every whole-word occurrence of this brand
    pub fn strip_from(&self, text: &str) -> String {
        self.anywhere.replace_all(text, "").into_owned()
    }
}

/// Brand vocabulary: static known brands, optionally extended with values
/// already learned into brand memory. Matchers are kept sorted longest
/// name first.
pub struct BrandVocabulary {
    matchers: Vec<BrandMatcher>,
}

impl BrandVocabulary {
    /// Vocabulary from the static brand list only
    pub fn builtin() -> Self {
        Self::with_learned(std::iter::empty::<String>())
    }

    /// Vocabulary extended with learned brand values (deduplicated
    /// case-insensitively against the static list)
    pub fn with_learned<I, S>(learned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = KNOWN_BRANDS.iter().map(|b| b.to_string()).collect();
        for extra in learned {
            let extra = extra.as_ref().trim();
            if extra.is_empty() || extra == super::HOUSE_BRAND {
                continue;
            }
            if !names.iter().any(|n| n.eq_ignore_ascii_case(extra)) {
                names.push(extra.to_string());
            }
        }
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

        Self {
            matchers: names.iter().map(|n| BrandMatcher::new(n)).collect(),
        }
    }

    /// Matchers, longest brand name first
    pub fn matchers(&self) -> &[BrandMatcher] {
        &self.matchers
    }

    /// Canonical casing for a token that equals a known brand
    /// (case-insensitive, Unicode-aware), or None.
    pub fn canonical(&self, token: &str) -> Option<&str> {
        let token_lower = token.to_lowercase();
        self.matchers
            .iter()
            .find(|m| m.canonical.to_lowercase() == token_lower)
            .map(|m| m.canonical())
    }

    pub fn names(&self) -> Vec<String> {
        self.matchers.iter().map(|m| m.canonical.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_names_come_first() {
        let vocab = BrandVocabulary::builtin();
        let names = vocab.names();
        let der_pos = names.iter().position(|n| n == "Der Materialspezialist").unwrap();
        let dms_pos = names.iter().position(|n| n == "DMS").unwrap();
        assert!(der_pos < dms_pos);
    }

    #[test]
    fn canonical_is_case_insensitive() {
        let vocab = BrandVocabulary::builtin();
        assert_eq!(vocab.canonical("nittaku"), Some("Nittaku"));
        assert_eq!(vocab.canonical("GEWO"), Some("Gewo"));
        assert_eq!(vocab.canonical("nonexistent"), None);
    }

    #[test]
    fn sentinel_is_not_a_brand() {
        let vocab = BrandVocabulary::with_learned(["Desaka".to_string(), "Hudik".to_string()]);
        assert_eq!(vocab.canonical("Desaka"), None);
        assert_eq!(vocab.canonical("hudik"), Some("Hudik"));
    }

    #[test]
    fn whole_word_match_only() {
        let vocab = BrandVocabulary::builtin();
        let lion = vocab
            .matchers()
            .iter()
            .find(|m| m.canonical() == "Lion")
            .unwrap();
        assert!(lion.matches_anywhere("Lion Belag Trapper"));
        assert!(!lion.matches_anywhere("Lionel Belag Trapper"));
    }
}
