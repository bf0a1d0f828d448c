//! Layered attribute resolution.
//!
//! Per attribute the ladder is: learned memory → heuristic extractor →
//! AI oracle → human confirmation, and every rung that produces a value
//! commits it to memory so the same key never climbs the ladder twice.
//! Resolution order within a product is fixed: brand first, then type
//! cleaned of the brand, then model cleaned of both.

mod confirm;
mod oracle;

pub use confirm::{Confirmation, Confirmed, TerminalConfirmer};
pub use oracle::{AiOracle, HttpOracle, OracleRequest};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cleaner::clean_value;
use crate::error::{Error, Result};
use crate::extract::{
    extract_brand, extract_category, extract_model, extract_stock_status, extract_type,
    extract_type_lenient, extract_variant_name, DISCARD_CATEGORY,
};
use crate::memory::{AttributeKind, Language, MemoryStore};
use crate::usage::{UsageSnapshot, UsageTracker};
use crate::vocab::{BrandVocabulary, HOUSE_BRAND, VALID_PRODUCT_TYPES};

/// How far down the ladder a resolution run may go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Memory and heuristics only; unresolved attributes stay unresolved
    HeuristicOnly,
    /// Full ladder. `confirm_ai_results` gates every oracle answer
    /// behind the human confirmer before it is committed.
    Assisted { confirm_ai_results: bool },
}

/// All name-derived attributes of one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    /// Verbatim source name the attributes are keyed by
    pub key: String,
    pub brand: String,
    pub product_type: Option<String>,
    pub model: String,
    pub category: Option<String>,
    /// Category resolved to the discard control value
    pub discard: bool,
}

/// Outcome of a batch run
#[derive(Debug)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub discarded: usize,
    pub unresolved_types: Vec<String>,
    pub unresolved_categories: Vec<String>,
    pub oracle_usage: UsageSnapshot,
}

/// A heuristic either answers confidently or offers a hint for the oracle
struct HeuristicOutcome {
    confident: Option<String>,
    hint: Option<String>,
}

pub struct Resolver {
    store: Arc<MemoryStore>,
    brands: Arc<BrandVocabulary>,
    oracle: Option<Arc<dyn AiOracle>>,
    confirmer: Option<Arc<dyn Confirmation>>,
    usage: Arc<UsageTracker>,
    language: Language,
    mode: RunMode,
}

impl Resolver {
    pub fn new(
        store: Arc<MemoryStore>,
        brands: Arc<BrandVocabulary>,
        oracle: Option<Arc<dyn AiOracle>>,
        confirmer: Option<Arc<dyn Confirmation>>,
        usage: Arc<UsageTracker>,
        language: Language,
        mode: RunMode,
    ) -> Self {
        Self {
            store,
            brands,
            oracle,
            confirmer,
            usage,
            language,
            mode,
        }
    }

    pub fn usage(&self) -> UsageSnapshot {
        self.usage.snapshot()
    }

    fn heuristic(&self, kind: AttributeKind, key: &str) -> HeuristicOutcome {
        match kind {
            AttributeKind::Brand => HeuristicOutcome {
                confident: Some(extract_brand(key, &self.brands)),
                hint: None,
            },
            AttributeKind::Type => match extract_type(key) {
                Some(t) => HeuristicOutcome {
                    confident: Some(t.to_string()),
                    hint: None,
                },
                None => HeuristicOutcome {
                    confident: None,
                    hint: Some(extract_type_lenient(key).to_string()),
                },
            },
            AttributeKind::Model => HeuristicOutcome {
                confident: Some(extract_model(key, &self.brands)),
                hint: None,
            },
            AttributeKind::Category => HeuristicOutcome {
                confident: extract_category(key).map(str::to_string),
                hint: None,
            },
            AttributeKind::StockStatus => HeuristicOutcome {
                confident: extract_stock_status(key),
                hint: None,
            },
            AttributeKind::VariantName => HeuristicOutcome {
                confident: extract_variant_name(key).map(str::to_string),
                hint: None,
            },
        }
    }

    fn allowed_values(&self, kind: AttributeKind) -> Vec<String> {
        match kind {
            AttributeKind::Brand => {
                let mut names = self.brands.names();
                names.push(HOUSE_BRAND.to_string());
                names
            }
            AttributeKind::Type => VALID_PRODUCT_TYPES.iter().map(|t| t.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Contamination cleaning applies to type and model only; other
    /// attribute values legitimately contain brand words.
    fn clean_for_commit(&self, kind: AttributeKind, value: &str, siblings: &[&str]) -> String {
        match kind {
            AttributeKind::Type | AttributeKind::Model => {
                clean_value(value, siblings, &self.brands)
            }
            _ => value.trim().to_string(),
        }
    }

    fn commit(
        &self,
        kind: AttributeKind,
        key: &str,
        value: &str,
        siblings: &[&str],
    ) -> Result<String> {
        let cleaned = self.clean_for_commit(kind, value, siblings);
        self.store.commit(kind, key, &cleaned)?;
        debug!(kind = %kind, key, value = %cleaned, "committed to memory");
        Ok(cleaned)
    }

    async fn confirm(&self, kind: AttributeKind, key: &str, proposed: &str) -> Result<Option<String>> {
        let Some(confirmer) = &self.confirmer else {
            return Err(Error::Confirmation(
                "confirmation required but no confirmer configured".to_string(),
            ));
        };
        match confirmer.confirm(kind, key, proposed).await? {
            Confirmed::Accepted(value) => Ok(Some(value)),
            Confirmed::Rejected => Ok(None),
        }
    }

    /// Resolve one attribute through the ladder. `Ok(None)` means the
    /// ladder is exhausted; nothing is memoized in that case so a later
    /// run can retry.
    pub async fn resolve_attribute(
        &self,
        kind: AttributeKind,
        key: &str,
        siblings: &[&str],
    ) -> Result<Option<String>> {
        if let Some(hit) = self.store.lookup(kind, key) {
            return Ok(Some(hit));
        }

        let heuristic = self.heuristic(kind, key);
        if let Some(confident) = heuristic.confident {
            return self.commit(kind, key, &confident, siblings).map(Some);
        }

        let confirm_required = match self.mode {
            RunMode::HeuristicOnly => return Ok(None),
            RunMode::Assisted { confirm_ai_results } => confirm_ai_results,
        };

        let Some(oracle) = &self.oracle else {
            return Ok(None);
        };

        let hint = heuristic.hint.clone();
        let request = OracleRequest {
            kind,
            key: key.to_string(),
            language: self.language.clone(),
            allowed_values: self.allowed_values(kind),
            heuristic_hint: heuristic.hint,
        };

        let answer = match oracle.complete(&request).await {
            Ok(answer) => answer,
            Err(Error::Oracle(reason)) => {
                warn!(kind = %kind, key, %reason, "oracle call failed");
                None
            }
            Err(e) => return Err(e),
        };

        let accepted = match answer {
            Some(answer) if !confirm_required => answer,
            Some(answer) => match self.confirm(kind, key, &answer).await? {
                Some(value) => value,
                None => return Ok(None),
            },
            // oracle exhausted; a configured confirmer may still supply a
            // manual value, seeded with the heuristic hint if any
            None => match &self.confirmer {
                Some(_) => {
                    match self.confirm(kind, key, hint.as_deref().unwrap_or("")).await? {
                        Some(value) => value,
                        None => return Ok(None),
                    }
                }
                None => return Ok(None),
            },
        };
        if accepted.trim().is_empty() {
            return Ok(None);
        }

        self.commit(kind, key, &accepted, siblings).map(Some)
    }

    /// Like [`Self::resolve_attribute`] but only storage failures stay
    /// fatal; anything else (oracle transport, confirmation channel)
    /// degrades to "unresolved" so one product cannot sink a batch.
    async fn resolve_or_unresolved(
        &self,
        kind: AttributeKind,
        key: &str,
        siblings: &[&str],
    ) -> Result<Option<String>> {
        match self.resolve_attribute(kind, key, siblings).await {
            Ok(value) => Ok(value),
            Err(e @ Error::Storage(_)) => Err(e),
            Err(e) => {
                warn!(kind = %kind, key, error = %e, "resolution failed, leaving unresolved");
                Ok(None)
            }
        }
    }

    /// Resolve brand, type, model and category for one product name.
    /// Brand always resolves (house-brand sentinel); model always
    /// resolves (worst case the trimmed name itself).
    pub async fn resolve_product(&self, name: &str) -> Result<ResolvedProduct> {
        let key = name.trim().to_string();

        let brand = self
            .resolve_or_unresolved(AttributeKind::Brand, &key, &[])
            .await?
            .unwrap_or_else(|| HOUSE_BRAND.to_string());

        let product_type = self
            .resolve_or_unresolved(AttributeKind::Type, &key, &[&brand])
            .await?;

        let mut model_siblings: Vec<&str> = vec![&brand];
        if let Some(t) = &product_type {
            model_siblings.push(t);
        }
        let model = self
            .resolve_or_unresolved(AttributeKind::Model, &key, &model_siblings)
            .await?
            .unwrap_or_else(|| key.clone());

        let category = self
            .resolve_or_unresolved(AttributeKind::Category, &key, &[])
            .await?;
        let discard = category.as_deref() == Some(DISCARD_CATEGORY);

        Ok(ResolvedProduct {
            key,
            brand,
            product_type,
            model,
            category,
            discard,
        })
    }

    /// Resolve a batch of product names concurrently. Output order
    /// matches input order; cancellation stops scheduling new work and
    /// returns what finished.
    pub async fn resolve_batch(
        self: &Arc<Self>,
        names: Vec<String>,
        max_workers: usize,
        cancel: CancellationToken,
    ) -> Result<(Vec<ResolvedProduct>, BatchReport)> {
        let started_at = Utc::now();
        let total = names.len();
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut tasks: JoinSet<Result<(usize, ResolvedProduct)>> = JoinSet::new();

        for (index, name) in names.into_iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("batch cancelled, {} of {} scheduled", index, total);
                break;
            }
            let resolver = Arc::clone(self);
            let permit_source = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit_source
                    .acquire()
                    .await
                    .map_err(|e| Error::Internal(format!("worker pool closed: {e}")))?;
                tokio::select! {
                    resolved = resolver.resolve_product(&name) => {
                        resolved.map(|r| (index, r))
                    }
                    _ = cancel.cancelled() => {
                        Err(Error::Internal("cancelled".to_string()))
                    }
                }
            });
        }

        let mut indexed = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(pair)) => indexed.push(pair),
                Ok(Err(Error::Internal(reason))) if reason == "cancelled" => {}
                // only storage failures surface out of resolve_product
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(Error::Internal(format!("worker panicked: {e}"))),
            }
        }
        indexed.sort_by_key(|(index, _)| *index);
        let resolved: Vec<ResolvedProduct> = indexed.into_iter().map(|(_, r)| r).collect();

        let unresolved_types: Vec<String> = resolved
            .iter()
            .filter(|r| r.product_type.is_none())
            .map(|r| r.key.clone())
            .collect();
        let unresolved_categories: Vec<String> = resolved
            .iter()
            .filter(|r| r.category.is_none())
            .map(|r| r.key.clone())
            .collect();
        let discarded = resolved.iter().filter(|r| r.discard).count();

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            total,
            discarded,
            unresolved_types,
            unresolved_categories,
            oracle_usage: self.usage.snapshot(),
        };
        info!(
            total = report.total,
            discarded = report.discarded,
            unresolved_types = report.unresolved_types.len(),
            oracle_calls = report.oracle_usage.calls,
            "batch finished"
        );

        Ok((resolved, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::TempDir;

    struct ScriptedOracle {
        answer: Option<String>,
        calls: AtomicU64,
    }

    #[async_trait::async_trait]
    impl AiOracle for ScriptedOracle {
        async fn complete(&self, _request: &OracleRequest) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    fn heuristic_resolver(dir: &TempDir) -> Arc<Resolver> {
        let store =
            Arc::new(MemoryStore::open(dir.path(), Language::new("CS")).expect("store opens"));
        Arc::new(Resolver::new(
            store,
            Arc::new(BrandVocabulary::builtin()),
            None,
            None,
            Arc::new(UsageTracker::new()),
            Language::new("CS"),
            RunMode::HeuristicOnly,
        ))
    }

    #[tokio::test]
    async fn resolves_full_product_from_heuristics() {
        let dir = TempDir::new().unwrap();
        let resolver = heuristic_resolver(&dir);

        let product = resolver
            .resolve_product("Donic Tričko Draft L")
            .await
            .unwrap();
        assert_eq!(product.brand, "Donic");
        assert_eq!(product.product_type.as_deref(), Some("Tričko"));
        assert_eq!(product.model, "Draft");
        assert!(!product.discard);
    }

    #[tokio::test]
    async fn memory_hit_short_circuits_the_ladder() {
        let dir = TempDir::new().unwrap();
        let store =
            Arc::new(MemoryStore::open(dir.path(), Language::new("CS")).expect("store opens"));
        store
            .commit(AttributeKind::Type, "Mystery Gadget 3000", "Obal")
            .unwrap();

        let oracle = Arc::new(ScriptedOracle {
            answer: Some("Potah".to_string()),
            calls: AtomicU64::new(0),
        });
        let resolver = Resolver::new(
            store,
            Arc::new(BrandVocabulary::builtin()),
            Some(oracle.clone()),
            None,
            Arc::new(UsageTracker::new()),
            Language::new("CS"),
            RunMode::Assisted {
                confirm_ai_results: false,
            },
        );

        let value = resolver
            .resolve_attribute(AttributeKind::Type, "Mystery Gadget 3000", &[])
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("Obal"));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oracle_answer_is_committed_and_never_asked_again() {
        let dir = TempDir::new().unwrap();
        let store =
            Arc::new(MemoryStore::open(dir.path(), Language::new("CS")).expect("store opens"));
        let oracle = Arc::new(ScriptedOracle {
            answer: Some("Obal".to_string()),
            calls: AtomicU64::new(0),
        });
        let resolver = Resolver::new(
            store,
            Arc::new(BrandVocabulary::builtin()),
            Some(oracle.clone()),
            None,
            Arc::new(UsageTracker::new()),
            Language::new("CS"),
            RunMode::Assisted {
                confirm_ai_results: false,
            },
        );

        // no type keyword anywhere in this name
        let key = "Mystery Gadget 3000";
        let first = resolver
            .resolve_attribute(AttributeKind::Type, key, &[])
            .await
            .unwrap();
        let second = resolver
            .resolve_attribute(AttributeKind::Type, key, &[])
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("Obal"));
        assert_eq!(second.as_deref(), Some("Obal"));
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn heuristic_only_mode_leaves_unknowns_unresolved() {
        let dir = TempDir::new().unwrap();
        let resolver = heuristic_resolver(&dir);

        let value = resolver
            .resolve_attribute(AttributeKind::Type, "Mystery Gadget 3000", &[])
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn rejected_confirmation_is_not_memoized() {
        struct AlwaysReject;
        #[async_trait::async_trait]
        impl Confirmation for AlwaysReject {
            async fn confirm(
                &self,
                _kind: AttributeKind,
                _key: &str,
                _proposed: &str,
            ) -> Result<Confirmed> {
                Ok(Confirmed::Rejected)
            }
        }

        let dir = TempDir::new().unwrap();
        let store =
            Arc::new(MemoryStore::open(dir.path(), Language::new("CS")).expect("store opens"));
        let oracle = Arc::new(ScriptedOracle {
            answer: Some("Obal".to_string()),
            calls: AtomicU64::new(0),
        });
        let resolver = Resolver::new(
            store.clone(),
            Arc::new(BrandVocabulary::builtin()),
            Some(oracle),
            Some(Arc::new(AlwaysReject)),
            Arc::new(UsageTracker::new()),
            Language::new("CS"),
            RunMode::Assisted {
                confirm_ai_results: true,
            },
        );

        let value = resolver
            .resolve_attribute(AttributeKind::Type, "Mystery Gadget 3000", &[])
            .await
            .unwrap();
        assert_eq!(value, None);
        assert_eq!(store.lookup(AttributeKind::Type, "Mystery Gadget 3000"), None);
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let resolver = heuristic_resolver(&dir);

        let names = vec![
            "Butterfly Tenergy 05 schwarz 2.1".to_string(),
            "Donic Tričko Draft L".to_string(),
            "Joola Ballbox 144".to_string(),
        ];
        let (resolved, report) = resolver
            .resolve_batch(names.clone(), 4, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolved.len(), 3);
        for (product, name) in resolved.iter().zip(&names) {
            assert_eq!(&product.key, name);
        }
        assert_eq!(report.total, 3);
        assert_eq!(report.oracle_usage.calls, 0);
    }
}
