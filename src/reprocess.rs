//! Bulk memory reprocessing: re-run the heuristic extractors over every
//! key the store has ever seen and rewrite the derived namespaces.
//!
//! Used after extractor rule improvements so old mistakes get corrected
//! without paying for the oracle again. Heuristics only; where a
//! heuristic cannot answer, the existing memory value is kept so
//! oracle- and human-provided entries survive the rebuild.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cleaner::clean_value;
use crate::error::Result;
use crate::extract::{extract_brand, extract_category, extract_model, extract_type};
use crate::memory::{AttributeKind, MemoryStore};
use crate::vocab::BrandVocabulary;

/// Outcome of one reprocessing run
#[derive(Debug, Default)]
pub struct ReprocessReport {
    pub keys_seen: usize,
    pub brands_rebuilt: usize,
    pub types_rebuilt: usize,
    pub models_rebuilt: usize,
    pub categories_rebuilt: usize,
    /// Keys whose type neither the heuristic nor existing memory knows
    pub unresolved_types: Vec<String>,
}

pub struct Reprocessor {
    store: Arc<MemoryStore>,
    brands: Arc<BrandVocabulary>,
}

impl Reprocessor {
    pub fn new(store: Arc<MemoryStore>, brands: Arc<BrandVocabulary>) -> Self {
        Self { store, brands }
    }

    /// Rebuild the name-derived namespaces (brand, type, model, category)
    /// from every known key and persist them.
    pub fn run(&self) -> Result<ReprocessReport> {
        let keys = self.collect_keys()?;
        info!(keys = keys.len(), "reprocessing memory");

        let existing_types = self.store.snapshot(AttributeKind::Type);
        let existing_categories = self.store.snapshot(AttributeKind::Category);

        let mut brand_ns = BTreeMap::new();
        let mut type_ns = BTreeMap::new();
        let mut model_ns = BTreeMap::new();
        let mut category_ns = BTreeMap::new();
        let mut report = ReprocessReport {
            keys_seen: keys.len(),
            ..Default::default()
        };

        for key in &keys {
            let brand = extract_brand(key, &self.brands);

            let product_type = extract_type(key)
                .map(str::to_string)
                .or_else(|| existing_types.get(key).cloned());
            let Some(product_type) = product_type else {
                warn!(%key, "no type evidence, key skipped in type namespace");
                report.unresolved_types.push(key.clone());
                brand_ns.insert(key.clone(), brand.clone());
                let model = extract_model(key, &self.brands);
                model_ns.insert(key.clone(), clean_value(&model, &[&brand], &self.brands));
                continue;
            };
            let product_type = clean_value(&product_type, &[&brand], &self.brands);

            let model = extract_model(key, &self.brands);
            let model = clean_value(&model, &[&brand, &product_type], &self.brands);

            if let Some(category) = extract_category(key)
                .map(str::to_string)
                .or_else(|| existing_categories.get(key).cloned())
            {
                category_ns.insert(key.clone(), category);
            }

            brand_ns.insert(key.clone(), brand);
            type_ns.insert(key.clone(), product_type);
            model_ns.insert(key.clone(), model);
        }

        report.brands_rebuilt = brand_ns.len();
        report.types_rebuilt = type_ns.len();
        report.models_rebuilt = model_ns.len();
        report.categories_rebuilt = category_ns.len();

        self.store.replace_namespace(AttributeKind::Brand, brand_ns)?;
        self.store.replace_namespace(AttributeKind::Type, type_ns)?;
        self.store.replace_namespace(AttributeKind::Model, model_ns)?;
        self.store
            .replace_namespace(AttributeKind::Category, category_ns)?;

        info!(
            brands = report.brands_rebuilt,
            types = report.types_rebuilt,
            models = report.models_rebuilt,
            categories = report.categories_rebuilt,
            unresolved_types = report.unresolved_types.len(),
            "reprocessing finished"
        );
        Ok(report)
    }

    /// Union of keys from live namespaces, `.backup` siblings of the
    /// namespace files, and consolidated `*_MISSING.txt` worklists.
    fn collect_keys(&self) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();

        let kinds = [
            AttributeKind::Brand,
            AttributeKind::Type,
            AttributeKind::Model,
            AttributeKind::Category,
        ];
        for kind in kinds {
            keys.extend(self.store.keys(kind));

            let backup = self.store.namespace_file(kind).with_extension("csv.backup");
            if backup.exists() {
                keys.extend(load_backup_keys(&backup));
            }
        }

        let consolidated = self.store.dir().join("Consolidated");
        if consolidated.is_dir() {
            for entry in fs::read_dir(&consolidated)? {
                let entry = entry?;
                if !entry.path().is_dir() {
                    continue;
                }
                for file in fs::read_dir(entry.path())? {
                    let path = file?.path();
                    let is_missing_list = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with("_MISSING.txt"));
                    if is_missing_list {
                        for line in read_text_tolerant(&path)?.lines() {
                            let line = line.trim();
                            if !line.is_empty() {
                                keys.insert(line.to_string());
                            }
                        }
                    }
                }
            }
        }

        Ok(keys)
    }
}

fn load_backup_keys(path: &Path) -> Vec<String> {
    let mut keys = Vec::new();
    let reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            warn!("cannot open backup {}: {}", path.display(), e);
            return keys;
        }
    };
    for record in reader.into_records().flatten() {
        if let Some(key) = record.get(0) {
            if !key.is_empty() {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Read a text file that may be UTF-8 or UTF-16 LE (Windows tooling
/// writes the missing-key lists with a BOM).
fn read_text_tolerant(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    if bytes.starts_with(&[0xFF, 0xFE]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(String::from_utf16_lossy(&units));
    }
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Language;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<MemoryStore>, Reprocessor) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::open(dir.path(), Language::new("CS")).unwrap());
        let reprocessor = Reprocessor::new(store.clone(), Arc::new(BrandVocabulary::builtin()));
        (dir, store, reprocessor)
    }

    #[test]
    fn rebuilds_derived_namespaces_from_keys() {
        let (_dir, store, reprocessor) = setup();
        // stale model value with brand contamination
        store
            .commit(
                AttributeKind::Model,
                "Nittaku Belag Magic Carbon rot 1,5",
                "Nittaku Magic Carbon",
            )
            .unwrap();

        let report = reprocessor.run().unwrap();
        assert_eq!(report.keys_seen, 1);
        assert_eq!(
            store.lookup(AttributeKind::Brand, "Nittaku Belag Magic Carbon rot 1,5"),
            Some("Nittaku".to_string())
        );
        assert_eq!(
            store.lookup(AttributeKind::Model, "Nittaku Belag Magic Carbon rot 1,5"),
            Some("Magic Carbon".to_string())
        );
        assert_eq!(
            store.lookup(AttributeKind::Type, "Nittaku Belag Magic Carbon rot 1,5"),
            Some("Potah".to_string())
        );
    }

    #[test]
    fn keeps_learned_type_when_heuristic_is_silent() {
        let (_dir, store, reprocessor) = setup();
        store
            .commit(AttributeKind::Type, "Mystery Gadget 3000", "Obal")
            .unwrap();

        let report = reprocessor.run().unwrap();
        assert!(report.unresolved_types.is_empty());
        assert_eq!(
            store.lookup(AttributeKind::Type, "Mystery Gadget 3000"),
            Some("Obal".to_string())
        );
    }

    #[test]
    fn unknown_type_is_counted_and_skipped() {
        let (_dir, store, reprocessor) = setup();
        store
            .commit(AttributeKind::Brand, "Mystery Gadget 3000", "Desaka")
            .unwrap();

        let report = reprocessor.run().unwrap();
        assert_eq!(report.unresolved_types, vec!["Mystery Gadget 3000".to_string()]);
        assert_eq!(store.lookup(AttributeKind::Type, "Mystery Gadget 3000"), None);
        // brand and model namespaces still cover the key
        assert_eq!(
            store.lookup(AttributeKind::Brand, "Mystery Gadget 3000"),
            Some("Desaka".to_string())
        );
    }

    #[test]
    fn missing_worklists_feed_new_keys() {
        let (dir, store, reprocessor) = setup();
        let list_dir = dir.path().join("Consolidated").join("ProductTypeMemory_CS.csv");
        fs::create_dir_all(&list_dir).unwrap();
        fs::write(
            list_dir.join("batch1_MISSING.txt"),
            "Donic Tričko Draft L\n\n",
        )
        .unwrap();

        reprocessor.run().unwrap();
        assert_eq!(
            store.lookup(AttributeKind::Type, "Donic Tričko Draft L"),
            Some("Tričko".to_string())
        );
    }

    #[test]
    fn utf16_worklists_are_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list_MISSING.txt");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Joola Ballbox 144".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(&path, bytes).unwrap();

        assert_eq!(read_text_tolerant(&path).unwrap(), "Joola Ballbox 144");
    }
}
