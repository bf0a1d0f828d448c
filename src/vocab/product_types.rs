//! Type keyword rule tables.
//!
//! Two distinct rule families live here and must not be conflated:
//!
//! - **Scored rules** ([`type_rule_groups`]): every matching rule adds its
//!   weight to the candidate type's total; the highest total wins if it
//!   reaches [`TYPE_SCORE_THRESHOLD`]. Scoring exists because type
//!   keywords are ambiguous across languages ("Hose" is German for
//!   trousers, "Blade" is both an English type word and a shoe model
//!   line); a first-match table produced unacceptable error rates.
//!   Ties break toward the earlier group, so more specific types are
//!   listed first.
//! - **Strip rules** ([`strip_keyword_rules`]): an ordered sequence used
//!   subtractively by the model extractor: anchored at the string start
//!   always, anywhere only for keywords long enough to be unambiguous.

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum total score for a confident scored-type decision
pub const TYPE_SCORE_THRESHOLD: u32 = 50;

/// Most statistically common type in the corpus; last-resort default
/// in lenient resolution.
pub const DEFAULT_TYPE: &str = "Potah";

/// Exact noun match in any supported language
const W_NOUN: u32 = 100;
/// Well-known model-line keyword implying a type
const W_MODEL_LINE: u32 = 60;
/// Weak positional heuristic (thickness token, handle-shape word)
const W_WEAK: u32 = 40;

/// Canonical Czech type values accepted in type memory. Values outside
/// this list are flagged by the memory audit.
pub const VALID_PRODUCT_TYPES: &[&str] = &[
    "Dřevo", "Potah", "Pálka", "Míčky", "Stůl", "Síťka", "Boty", "Obal", "Robot", "Taška",
    "Batoh", "Oblečení", "Sada", "Příslušenství", "Čistící prostředky", "Lepidlo", "Páska",
    "Hranol", "Ručník", "Ponožky", "Čelenka", "Podložka", "Lajna", "Stojánek", "Pouzdro",
    "DVD", "Kniha", "Kraťasy", "Mikina", "Šortky", "Tričko", "Sukně", "Tepláky", "Rukavice",
    "Kalhoty", "Bunda", "Potítko", "Čistič", "Ochranná páska", "Triko", "Poháry", "Řetízek",
    "Šňůra", "Dres",
];

/// One weighted pattern rule
pub struct TypeRule {
    pub pattern: Regex,
    pub weight: u32,
}

/// All rules voting for one canonical type
pub struct TypeRuleGroup {
    pub canonical: &'static str,
    pub rules: Vec<TypeRule>,
}

fn rule(pattern: &str, weight: u32) -> TypeRule {
    TypeRule {
        pattern: Regex::new(&format!("(?i){}", pattern)).expect("valid type rule regex"),
        weight,
    }
}

fn group(canonical: &'static str, rules: Vec<TypeRule>) -> TypeRuleGroup {
    TypeRuleGroup { canonical, rules }
}

static TYPE_RULE_GROUPS: Lazy<Vec<TypeRuleGroup>> = Lazy::new(|| {
    vec![
        // Ball containers before general ball detection
        group(
            "Pouzdro",
            vec![
                rule(r"\bballbox\b", W_NOUN),
                rule(r"\bball\s+(box|case|container)\b", W_NOUN),
                rule(r"\bballeimer\b", W_NOUN),
                rule(r"\bschlägerhülle\b", W_NOUN),
                rule(r"\bpouzdro\b", W_NOUN),
            ],
        ),
        group(
            "Potah",
            vec![
                rule(r"\bbelag\b", W_NOUN),
                rule(r"\brubber\b", W_NOUN),
                rule(r"\bpotah", W_NOUN),
                rule(r"\brasanter\b", W_MODEL_LINE),
                rule(r"\btenergy\b", W_MODEL_LINE),
                rule(r"\brakza\b", W_MODEL_LINE),
                rule(r"\bhexer\b", W_MODEL_LINE),
                rule(r"\bacuda\b", W_MODEL_LINE),
                rule(r"\bvega\b", W_MODEL_LINE),
                rule(r"\bmagna\b", W_MODEL_LINE),
                rule(r"\bevo\b", W_MODEL_LINE),
                // thickness token somewhere in the name
                rule(r"\b\d+[,.]\d+\s*(mm\b)?", W_WEAK),
                rule(r"\box\b", W_WEAK),
            ],
        ),
        group(
            "Dřevo",
            vec![
                rule(r"\bholz\b", W_NOUN),
                rule(r"\bdřev[oa]\b", W_NOUN),
                // "Blade" doubles as a shoe model line, so it only gets
                // model-line weight
                rule(r"\bblade\b", W_MODEL_LINE),
                rule(r"\bviscaria\b", W_MODEL_LINE),
                rule(r"\btimo\s+boll\b", W_MODEL_LINE),
                rule(r"\binner\s*force\b", W_MODEL_LINE),
                rule(r"\bfortissimo\b", W_MODEL_LINE),
                rule(r"\bprimorac\b", W_MODEL_LINE),
                rule(r"\b(gerade|anatomisch|konkav|konisch)\b", W_WEAK),
            ],
        ),
        group(
            "Boty",
            vec![
                rule(r"\bschuhe?\b", W_NOUN),
                rule(r"\bshoes?\b", W_NOUN),
                rule(r"\bbot[ya]\b", W_NOUN),
                rule(r"\btrainer\b", W_MODEL_LINE),
            ],
        ),
        group(
            "Míčky",
            vec![
                rule(r"\bball\b", W_NOUN),
                rule(r"\bballs\b", W_NOUN),
                rule(r"\bbälle\b", W_NOUN),
                rule(r"\bmíč(ek|ky|ků)?\b", W_NOUN),
                rule(r"\b3[- ]?star\b", W_MODEL_LINE),
                rule(r"\bnexcel\b", W_MODEL_LINE),
            ],
        ),
        group(
            "Stůl",
            vec![
                rule(r"\btisch\b", W_NOUN),
                rule(r"\btable\b", W_NOUN),
                rule(r"\bst[ůo]l[ue]?\b", W_NOUN),
            ],
        ),
        group(
            "Síťka",
            vec![
                rule(r"\bnetz\b", W_NOUN),
                rule(r"\bnet\b", W_NOUN),
                rule(r"\bsíť", W_NOUN),
            ],
        ),
        group(
            "Tričko",
            vec![
                rule(r"\bshirt\b", W_NOUN),
                rule(r"\btričko\b", W_NOUN),
                rule(r"\btriko\b", W_NOUN),
                rule(r"\btop\b", W_WEAK),
            ],
        ),
        group(
            "Dres",
            vec![
                rule(r"\bdres\b", W_NOUN),
                rule(r"\btrikot\b", W_NOUN),
                rule(r"\bjersey\b", W_NOUN),
            ],
        ),
        group(
            "Kraťasy",
            vec![rule(r"\bshorts?\b", W_NOUN), rule(r"\bkraťas", W_NOUN)],
        ),
        group(
            "Kalhoty",
            vec![
                rule(r"\bhose\b", W_NOUN),
                rule(r"\bpants\b", W_NOUN),
                rule(r"\btrousers\b", W_NOUN),
                rule(r"\bkalhoty\b", W_NOUN),
            ],
        ),
        group(
            "Mikina",
            vec![
                rule(r"\bhoodie\b", W_NOUN),
                rule(r"\bmikina\b", W_NOUN),
                rule(r"\bsweatshirt\b", W_NOUN),
                rule(r"\bsweater\b", W_NOUN),
            ],
        ),
        group(
            "Bunda",
            vec![
                rule(r"\bjacke\b", W_NOUN),
                rule(r"\bjacket\b", W_NOUN),
                rule(r"\bbunda\b", W_NOUN),
            ],
        ),
        group(
            "Ponožky",
            vec![
                rule(r"\bsocken\b", W_NOUN),
                rule(r"\bsocks\b", W_NOUN),
                rule(r"\bponožk[yá]", W_NOUN),
                rule(r"\bponožek\b", W_NOUN),
            ],
        ),
        group(
            "Taška",
            vec![
                rule(r"\btasche\b", W_NOUN),
                rule(r"\bbag\b", W_NOUN),
                rule(r"\btašk[ya]\b", W_NOUN),
            ],
        ),
        group(
            "Ochranná páska",
            vec![
                rule(r"\bkantenband\b", W_NOUN),
                rule(r"\bkantenschutz\b", W_NOUN),
                rule(r"\bedge\s+tape\b", W_NOUN),
                rule(r"\bpáska\b", W_MODEL_LINE),
            ],
        ),
        group(
            "Lepidlo",
            vec![
                rule(r"\bkleber\b", W_NOUN),
                rule(r"\bglue\b", W_NOUN),
                rule(r"\blepidlo\b", W_NOUN),
            ],
        ),
        group(
            "Čistič",
            vec![
                rule(r"\breiniger\b", W_NOUN),
                rule(r"\bcleaner\b", W_NOUN),
                rule(r"\bčistič\b", W_NOUN),
            ],
        ),
        group(
            "Ručník",
            vec![
                rule(r"\bhandtuch\b", W_NOUN),
                rule(r"\btowel\b", W_NOUN),
                rule(r"\bručník\b", W_NOUN),
            ],
        ),
        group(
            "Čelenka",
            vec![
                rule(r"\bheadband\b", W_NOUN),
                rule(r"\bstirn\s*band\b", W_NOUN),
                rule(r"\bčelenka\b", W_NOUN),
            ],
        ),
        group(
            "Potítko",
            vec![
                rule(r"\bschweißband\b", W_NOUN),
                rule(r"\bwristband\b", W_NOUN),
                rule(r"\bpotítko\b", W_NOUN),
            ],
        ),
        group(
            "Sada",
            vec![
                rule(r"^\d+er\s+set\b", W_NOUN),
                rule(r"^\d+x\s+set\b", W_NOUN),
                rule(r"\bsada\b", W_NOUN),
                rule(r"\bbalíček\b", W_NOUN),
                rule(r"\bset\b.*\bset\b", W_MODEL_LINE),
            ],
        ),
        group(
            "Poháry",
            vec![
                rule(r"\bpokal\b", W_NOUN),
                rule(r"\btroph(y|ies)\b", W_NOUN),
                rule(r"\bpohár", W_NOUN),
            ],
        ),
        group(
            "Řetízek",
            vec![
                rule(r"\bkettchen\b", W_NOUN),
                rule(r"\bchain\b", W_NOUN),
                rule(r"\břetíz", W_NOUN),
            ],
        ),
        group(
            "Šňůra",
            vec![
                rule(r"\bschnur\b", W_NOUN),
                rule(r"\brope\b", W_NOUN),
                rule(r"\bšňůra\b", W_NOUN),
            ],
        ),
    ]
});

/// Scored rule groups, most specific types first (tie-break order)
pub fn type_rule_groups() -> &'static [TypeRuleGroup] {
    &TYPE_RULE_GROUPS
}

/// One subtractive keyword: always stripped when anchored at the string
/// start; stripped anywhere only when long enough to be unambiguous.
pub struct StripRule {
    pub keyword: &'static str,
    pub anchored: Regex,
    pub global: Option<Regex>,
}

/// Keywords stripped globally only at this length or above
const GLOBAL_STRIP_MIN_CHARS: usize = 4;

/// Type keywords removed from model names, across German, English and
/// Czech. Ordered sequence; applied in order, first anchored then global.
const STRIP_KEYWORDS: &[&str] = &[
    // German
    "belag", "holz", "schuhe", "schuh", "bälle", "ball", "tasche", "tisch", "netz", "hose",
    "shirt", "shorts", "short", "jacke", "hoodie", "trainer", "pullover", "socken", "headband",
    "stirnband", "handtuch", "schweißband", "kleber", "reiniger", "kantenschutz", "kantenband",
    "schlägerhülle", "balleimer", "ballbox",
    // English
    "rubber", "blade", "shoes", "shoe", "balls", "bag", "table", "net", "pants", "jacket",
    "sweater", "socks", "towel", "wristband", "glue", "cleaner", "edge", "tape", "case",
    "container", "box",
    // Czech
    "potahu", "potahy", "potahů", "potah", "dřevo", "dřeva", "boty", "bota", "míček", "míčky",
    "míčků", "taška", "tašky", "stůl", "stolu", "síťka", "síť", "kalhoty", "tričko", "triko",
    "dres", "kraťasy", "mikina", "svetr", "ponožky", "čelenka", "ručník", "potítko", "lepidlo",
    "čistič", "páska", "pouzdro", "kontejner",
];

static STRIP_RULES: Lazy<Vec<StripRule>> = Lazy::new(|| {
    STRIP_KEYWORDS
        .iter()
        .map(|kw| {
            let escaped = regex::escape(kw);
            let global = if kw.chars().count() >= GLOBAL_STRIP_MIN_CHARS {
                Some(
                    Regex::new(&format!(r"(?i)\b{}\b", escaped))
                        .expect("valid strip keyword regex"),
                )
            } else {
                None
            };
            StripRule {
                keyword: kw,
                anchored: Regex::new(&format!(r"(?i)^{}\b[\s:]*", escaped))
                    .expect("valid strip keyword regex"),
                global,
            }
        })
        .collect()
});

/// Ordered subtractive keyword rules for the model extractor
pub fn strip_keyword_rules() -> &'static [StripRule] {
    &STRIP_RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rule_groups_have_valid_canonical_types() {
        for grp in type_rule_groups() {
            assert!(
                VALID_PRODUCT_TYPES.contains(&grp.canonical),
                "{} missing from valid type list",
                grp.canonical
            );
        }
    }

    #[test]
    fn noun_rules_meet_threshold_alone() {
        assert!(W_NOUN >= TYPE_SCORE_THRESHOLD);
        assert!(W_WEAK < TYPE_SCORE_THRESHOLD);
    }

    #[test]
    fn short_keywords_are_not_stripped_globally() {
        let net = strip_keyword_rules()
            .iter()
            .find(|r| r.keyword == "net")
            .unwrap();
        assert!(net.global.is_none());

        let belag = strip_keyword_rules()
            .iter()
            .find(|r| r.keyword == "belag")
            .unwrap();
        assert!(belag.global.is_some());
    }

    #[test]
    fn anchored_strip_respects_word_boundary() {
        let schuh = strip_keyword_rules()
            .iter()
            .find(|r| r.keyword == "schuh")
            .unwrap();
        assert!(schuh.anchored.is_match("Schuh Blade FF"));
        assert!(!schuh.anchored.is_match("Schuhe Blade FF"));
    }
}
