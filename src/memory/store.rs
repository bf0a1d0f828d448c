//! CSV-backed memory store
//!
//! One file per `(attribute-kind, language)` namespace, two columns
//! `KEY,VALUE`, header row, full quoting, UTF-8. Keys are written verbatim
//! so external tooling can scan for contamination by literal substring
//! search.
//!
//! Load is forgiving (missing file = empty namespace, bad row = skip and
//! keep loading); persistence is strict (a failed write is run-fatal,
//! because an unpersisted resolution would be re-asked from the oracle).

use crate::error::{Error, Result};
use crate::memory::{AttributeKind, Language};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Durable key→value memory for one language across all attribute kinds
pub struct MemoryStore {
    dir: PathBuf,
    language: Language,
    /// Primary learned mappings, fully loaded at open
    primary: RwLock<HashMap<AttributeKind, HashMap<String, String>>>,
    /// Manually curated overrides, consulted before the primary tier
    validated: RwLock<HashMap<AttributeKind, HashMap<String, String>>>,
    /// Serializes all namespace writes
    writer: Mutex<()>,
}

impl MemoryStore {
    /// Open the store for one language, loading every namespace.
    ///
    /// Missing namespace files are created empty so a first run never
    /// fails; unparseable rows are skipped with a warning.
    pub fn open(dir: &Path, language: Language) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut primary = HashMap::new();
        let mut validated = HashMap::new();

        for kind in AttributeKind::ALL {
            let path = namespace_path(dir, kind, &language);
            let entries = if path.exists() {
                load_namespace(&path)
            } else {
                debug!("Namespace {} absent, bootstrapping empty", path.display());
                write_namespace(&path, &BTreeMap::new())?;
                HashMap::new()
            };
            debug!(
                namespace = %kind,
                entries = entries.len(),
                "Loaded memory namespace"
            );
            primary.insert(kind, entries);

            let validated_path = validated_path(dir, kind);
            let overrides = if validated_path.exists() {
                load_validated(&validated_path)
            } else {
                HashMap::new()
            };
            if !overrides.is_empty() {
                info!(
                    namespace = %kind,
                    entries = overrides.len(),
                    "Loaded validated overrides"
                );
            }
            validated.insert(kind, overrides);
        }

        let total: usize = primary.values().map(|m| m.len()).sum();
        info!(
            language = %language,
            entries = total,
            dir = %dir.display(),
            "Memory store opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            language,
            primary: RwLock::new(primary),
            validated: RwLock::new(validated),
            writer: Mutex::new(()),
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Exact-match lookup: validated overrides first, then primary memory.
    ///
    /// Never fuzzy. A trailing space or differing Unicode normalization is
    /// a miss, because source strings are reused verbatim as keys.
    pub fn lookup(&self, kind: AttributeKind, key: &str) -> Option<String> {
        if let Some(value) = self
            .validated
            .read()
            .expect("validated lock poisoned")
            .get(&kind)
            .and_then(|ns| ns.get(key))
        {
            return Some(value.clone());
        }
        self.primary
            .read()
            .expect("primary lock poisoned")
            .get(&kind)
            .and_then(|ns| ns.get(key))
            .cloned()
    }

    /// Insert or overwrite an entry and persist the namespace before
    /// returning. Writes are serialized; a crash after a costly oracle
    /// call never loses the result.
    pub fn commit(&self, kind: AttributeKind, key: &str, value: &str) -> Result<()> {
        let _guard = self.writer.lock().expect("writer lock poisoned");
        let snapshot = {
            let mut primary = self.primary.write().expect("primary lock poisoned");
            let ns = primary.entry(kind).or_default();
            ns.insert(key.to_string(), value.to_string());
            ns.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<BTreeMap<_, _>>()
        };
        let path = namespace_path(&self.dir, kind, &self.language);
        write_namespace(&path, &snapshot)
            .map_err(|e| Error::Storage(format!("persist {} failed: {}", path.display(), e)))?;
        debug!(namespace = %kind, key = %key, value = %value, "Committed memory entry");
        Ok(())
    }

    /// Replace an entire namespace (bulk reprocessing) and persist it.
    pub fn replace_namespace(
        &self,
        kind: AttributeKind,
        entries: BTreeMap<String, String>,
    ) -> Result<()> {
        let _guard = self.writer.lock().expect("writer lock poisoned");
        let path = namespace_path(&self.dir, kind, &self.language);
        write_namespace(&path, &entries)
            .map_err(|e| Error::Storage(format!("persist {} failed: {}", path.display(), e)))?;
        let mut primary = self.primary.write().expect("primary lock poisoned");
        primary.insert(kind, entries.into_iter().collect());
        Ok(())
    }

    /// Merge curated overrides into the validated tier (in memory only;
    /// the validated files themselves are maintained by hand).
    pub fn merge_validated(&self, kind: AttributeKind, overrides: HashMap<String, String>) {
        let mut validated = self.validated.write().expect("validated lock poisoned");
        validated.entry(kind).or_default().extend(overrides);
    }

    /// Snapshot one namespace (primary tier) for reporting and audits
    pub fn snapshot(&self, kind: AttributeKind) -> HashMap<String, String> {
        self.primary
            .read()
            .expect("primary lock poisoned")
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// All keys ever recorded in one namespace
    pub fn keys(&self, kind: AttributeKind) -> Vec<String> {
        self.primary
            .read()
            .expect("primary lock poisoned")
            .get(&kind)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, kind: AttributeKind) -> usize {
        self.primary
            .read()
            .expect("primary lock poisoned")
            .get(&kind)
            .map(|ns| ns.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, kind: AttributeKind) -> bool {
        self.len(kind) == 0
    }

    /// Distinct learned brand values, excluding the house-brand sentinel.
    /// Feeds the dynamic part of the brand vocabulary.
    pub fn learned_brands(&self) -> Vec<String> {
        let primary = self.primary.read().expect("primary lock poisoned");
        let mut brands: Vec<String> = primary
            .get(&AttributeKind::Brand)
            .map(|ns| {
                ns.values()
                    .filter(|v| !v.is_empty() && *v != crate::vocab::HOUSE_BRAND)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        brands.sort();
        brands.dedup();
        brands
    }

    /// Path of one namespace file (exposed for external tooling and tests)
    pub fn namespace_file(&self, kind: AttributeKind) -> PathBuf {
        namespace_path(&self.dir, kind, &self.language)
    }
}

fn namespace_path(dir: &Path, kind: AttributeKind, language: &Language) -> PathBuf {
    dir.join(format!("{}_{}.csv", kind.file_stem(), language))
}

fn validated_path(dir: &Path, kind: AttributeKind) -> PathBuf {
    dir.join(format!("{}Validated.csv", kind.file_stem()))
}

/// Load a namespace file, skipping unparseable rows.
///
/// A corrupt file must not crash the whole load; worst case the namespace
/// comes back empty and entries get re-resolved.
fn load_namespace(path: &Path) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    let reader = match ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            warn!("Cannot open memory file {}: {}", path.display(), e);
            return entries;
        }
    };

    for (line, record) in reader.into_records().enumerate() {
        match record {
            Ok(row) => {
                let key = row.get(0).unwrap_or_default();
                let value = row.get(1).unwrap_or_default();
                if key.is_empty() {
                    warn!(
                        "Skipping row {} of {}: empty key",
                        line + 2,
                        path.display()
                    );
                    continue;
                }
                entries.insert(key.to_string(), value.to_string());
            }
            Err(e) => {
                warn!(
                    "Skipping corrupt row {} of {}: {}",
                    line + 2,
                    path.display(),
                    e
                );
            }
        }
    }
    entries
}

/// Load a curated override file, ignoring the literal placeholder `UNKNOWN`
fn load_validated(path: &Path) -> HashMap<String, String> {
    load_namespace(path)
        .into_iter()
        .filter(|(_, v)| v != "UNKNOWN")
        .collect()
}

/// Write a namespace atomically: temp file, fsync, rename.
fn write_namespace(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    {
        let file = File::create(&tmp)?;
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        writer.write_record(["KEY", "VALUE"])?;
        for (key, value) in entries {
            writer.write_record([key, value])?;
        }
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| Error::Storage(e.to_string()))?
            .sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
