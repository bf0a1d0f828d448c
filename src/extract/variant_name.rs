//! Variant axis-name translation (the label, not the value): "Farbe" →
//! "Barva", "Größe" → "Velikost".

/// Source label (lowercased) → canonical Czech axis name
const VARIANT_NAMES: &[(&str, &str)] = &[
    // German
    ("farbe", "Barva"),
    ("griff", "Držení"),
    ("griffform", "Držení"),
    ("größe", "Velikost"),
    ("groesse", "Velikost"),
    ("stärke", "Tloušťka"),
    ("schwammstärke", "Tloušťka"),
    ("gewicht", "Hmotnost"),
    ("breite", "Šířka"),
    ("länge", "Délka"),
    // English
    ("color", "Barva"),
    ("colour", "Barva"),
    ("grip", "Držení"),
    ("handle", "Držení"),
    ("size", "Velikost"),
    ("thickness", "Tloušťka"),
    ("sponge", "Tloušťka"),
    ("speed", "Rychlost"),
    ("length", "Délka"),
    ("weight", "Hmotnost"),
    ("width", "Šířka"),
    ("type", "Typ"),
    ("material", "Materiál"),
    // Czech identity mappings keep already-translated feeds stable
    ("barva", "Barva"),
    ("velikost", "Velikost"),
    ("tloušťka", "Tloušťka"),
    ("držení", "Držení"),
    ("tempo", "Rychlost"),
    ("typ", "Typ"),
    ("materiál", "Materiál"),
];

/// Translate a variant axis label, or None when only the oracle can tell
pub fn extract_variant_name(label: &str) -> Option<&'static str> {
    let needle = label.trim().to_lowercase();
    VARIANT_NAMES
        .iter()
        .find(|(src, _)| *src == needle)
        .map(|(_, canonical)| *canonical)
}
