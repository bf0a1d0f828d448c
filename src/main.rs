//! desaka-unifier - product attribute normalization CLI
//!
//! Subcommands:
//! - `resolve <file>`: resolve every product name in the file (one per
//!   line) through the full ladder and print the results
//! - `reprocess`: rebuild the derived memory namespaces heuristically
//! - `audit`: scan memory for contamination and translation leaks

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use desaka_unifier::config::UnifierConfig;
use desaka_unifier::memory::{Language, MemoryStore};
use desaka_unifier::report;
use desaka_unifier::reprocess::Reprocessor;
use desaka_unifier::resolver::{
    AiOracle, Confirmation, HttpOracle, Resolver, RunMode, TerminalConfirmer,
};
use desaka_unifier::usage::UsageTracker;
use desaka_unifier::vocab::BrandVocabulary;

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to initialize logging");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    info!("desaka-unifier {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::var("DESAKA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("desaka-unifier.toml"));
    let config = UnifierConfig::load(Some(&config_path))?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();

    match command.as_str() {
        "resolve" => {
            let input = args
                .next()
                .context("usage: desaka-unifier resolve <file>")?;
            resolve_command(&config, Path::new(&input)).await
        }
        "reprocess" => reprocess_command(&config),
        "audit" => audit_command(&config),
        "" => bail!("usage: desaka-unifier <resolve|reprocess|audit>"),
        other => bail!("unknown command {other:?}"),
    }
}

fn open_store(config: &UnifierConfig) -> Result<(Arc<MemoryStore>, Arc<BrandVocabulary>)> {
    let language = Language::new(&config.language);
    let store = Arc::new(MemoryStore::open(&config.memory_dir, language)?);
    let brands = Arc::new(BrandVocabulary::with_learned(store.learned_brands()));
    Ok((store, brands))
}

async fn resolve_command(config: &UnifierConfig, input: &Path) -> Result<()> {
    let names: Vec<String> = std::fs::read_to_string(input)
        .with_context(|| format!("read {}", input.display()))?
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    info!(products = names.len(), "resolving batch");

    let (store, brands) = open_store(config)?;
    let usage = Arc::new(UsageTracker::new());

    let oracle: Option<Arc<dyn AiOracle>> =
        if config.oracle.enabled && config.oracle.api_key.is_some() {
            Some(Arc::new(HttpOracle::new(
                config.oracle.clone(),
                usage.clone(),
            )?))
        } else {
            warn!("oracle disabled or no API key, running heuristic-only");
            None
        };
    let mode = if oracle.is_some() {
        RunMode::Assisted {
            confirm_ai_results: config.confirm_ai_results,
        }
    } else {
        RunMode::HeuristicOnly
    };
    let confirmer: Option<Arc<dyn Confirmation>> = if config.confirm_ai_results {
        Some(Arc::new(TerminalConfirmer))
    } else {
        None
    };

    let resolver = Arc::new(Resolver::new(
        store,
        brands,
        oracle,
        confirmer,
        usage,
        Language::new(&config.language),
        mode,
    ));

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight work");
            ctrl_c_cancel.cancel();
        }
    });

    let (resolved, batch_report) = resolver
        .resolve_batch(names, config.max_workers, cancel)
        .await?;

    for product in &resolved {
        println!(
            "{}\t{}\t{}\t{}\t{}{}",
            product.key,
            product.brand,
            product.product_type.as_deref().unwrap_or("?"),
            product.model,
            product.category.as_deref().unwrap_or("?"),
            if product.discard { "\t[discard]" } else { "" },
        );
    }
    info!(
        total = batch_report.total,
        discarded = batch_report.discarded,
        unresolved_types = batch_report.unresolved_types.len(),
        unresolved_categories = batch_report.unresolved_categories.len(),
        oracle_calls = batch_report.oracle_usage.calls,
        prompt_tokens = batch_report.oracle_usage.prompt_tokens,
        completion_tokens = batch_report.oracle_usage.completion_tokens,
        "resolution finished"
    );
    Ok(())
}

fn reprocess_command(config: &UnifierConfig) -> Result<()> {
    let (store, brands) = open_store(config)?;
    let report = Reprocessor::new(store, brands).run()?;
    info!(
        keys = report.keys_seen,
        brands = report.brands_rebuilt,
        types = report.types_rebuilt,
        models = report.models_rebuilt,
        categories = report.categories_rebuilt,
        "memory reprocessed"
    );
    for key in &report.unresolved_types {
        warn!(%key, "type unresolved during reprocess");
    }
    Ok(())
}

fn audit_command(config: &UnifierConfig) -> Result<()> {
    let (store, brands) = open_store(config)?;
    let report = report::audit(&store, &brands);
    for issue in &report.issues {
        println!(
            "[{}] {} \"{}\" -> \"{}\": {}",
            issue.severity, issue.kind, issue.key, issue.value, issue.problem
        );
    }
    if report.is_clean() {
        info!("memory is clean");
    }
    Ok(())
}
