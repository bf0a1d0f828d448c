//! Scored product-type extraction.
//!
//! Every rule that matches adds its weight to its group's total. The
//! best-scoring type wins; ties break toward the group listed earlier
//! in the rule table. The strict form refuses to answer below the
//! confidence threshold, the lenient form takes the best guess and
//! falls back to the corpus-dominant default.

use crate::vocab::{type_rule_groups, DEFAULT_TYPE, TYPE_SCORE_THRESHOLD};

fn best_scoring_type(name: &str) -> Option<(&'static str, u32)> {
    let mut best: Option<(&'static str, u32)> = None;
    for group in type_rule_groups() {
        let score: u32 = group
            .rules
            .iter()
            .filter(|r| r.pattern.is_match(name))
            .map(|r| r.weight)
            .sum();
        if score == 0 {
            continue;
        }
        // strictly greater keeps the earlier group on ties
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((group.canonical, score));
        }
    }
    best
}

/// Product type when the evidence clears the confidence threshold
pub fn extract_type(name: &str) -> Option<&'static str> {
    best_scoring_type(name)
        .filter(|&(_, score)| score >= TYPE_SCORE_THRESHOLD)
        .map(|(canonical, _)| canonical)
}

/// Best-guess product type; weak evidence is accepted and no evidence
/// at all yields the corpus-dominant default.
pub fn extract_type_lenient(name: &str) -> &'static str {
    best_scoring_type(name)
        .map(|(canonical, _)| canonical)
        .unwrap_or(DEFAULT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_noun_match_clears_threshold() {
        assert_eq!(extract_type("GEWO Belag Hype EL Pro 50 1 2.0"), Some("Potah"));
        assert_eq!(extract_type("Yasaka Holz Sweden Extra gerade"), Some("Dřevo"));
    }

    #[test]
    fn shirt_keywords_canonicalize_to_tricko() {
        assert_eq!(extract_type("Donic Tričko Draft L"), Some("Tričko"));
        assert_eq!(extract_type("Joola Shirt Torrent XXL"), Some("Tričko"));
        assert_eq!(extract_type("Andro Triko Liros M"), Some("Tričko"));
    }

    #[test]
    fn jerseys_are_their_own_type() {
        assert_eq!(extract_type("Tibhar Dres Arrows XL"), Some("Dres"));
        assert_eq!(extract_type("Donic Trikot Stripes rot M"), Some("Dres"));
    }

    #[test]
    fn shoe_noun_outweighs_blade_model_line() {
        assert_eq!(
            extract_type("ASICS Schuh Blade FF 2 I grau 39,5 / US 6,5"),
            Some("Boty")
        );
    }

    #[test]
    fn model_line_plus_thickness_reaches_threshold() {
        assert_eq!(extract_type("Butterfly Tenergy 05 schwarz 2.1"), Some("Potah"));
    }

    #[test]
    fn weak_evidence_is_below_threshold_but_lenient_accepts_it() {
        // handle-shape word alone only hints at a blade
        assert_eq!(extract_type("Butterfly Korbel konkav"), None);
        assert_eq!(extract_type_lenient("Butterfly Korbel konkav"), "Dřevo");
    }

    #[test]
    fn no_evidence_yields_default_only_in_lenient_mode() {
        assert_eq!(extract_type("Butterfly Korbel"), None);
        assert_eq!(extract_type_lenient("Butterfly Korbel"), DEFAULT_TYPE);
    }

    #[test]
    fn ball_container_beats_ball() {
        assert_eq!(extract_type("Joola Ballbox 144"), Some("Pouzdro"));
        assert_eq!(extract_type("Joola Ball Box groß"), Some("Pouzdro"));
        assert_eq!(extract_type("Nittaku Ball Premium 3-Star"), Some("Míčky"));
    }
}
