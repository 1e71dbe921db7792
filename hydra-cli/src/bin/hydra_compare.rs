use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hydra_apps::comparator::{ComparatorSerializer, ComparatorWorker, SourceDbWalker};
use hydra_cli::common::print_status;
use hydra_core::timestamp::run_stamp;
use hydra_engine::config::EngineConfig;
use hydra_engine::run_engine;

/// Checks that every row in a source database's hash index is also present
/// in a target database (§3, §4.8). Read-only: no destructive confirmation.
#[derive(Debug, Clone, Parser)]
struct Args {
    source_db: PathBuf,
    target_db: PathBuf,

    #[arg(long, env = "HYDRA_WORKERS", default_value_t = EngineConfig::DEFAULT_WORKERS)]
    workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stamp = run_stamp(chrono::Local::now());
    let log_dir = args.source_db.parent().unwrap_or_else(|| std::path::Path::new("."));
    let _log_guard = hydra_core::logging::init("hydra-compare", log_dir, &stamp)?;

    let config = EngineConfig::new(args.workers.max(1));
    let walker = SourceDbWalker::new(args.source_db.clone());
    let worker_app = Arc::new(ComparatorWorker::new(args.target_db.clone()));
    let serializer = ComparatorSerializer::default();

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    let summary = outcome.main_data.into_iter().next_back().unwrap_or_default();
    println!("checked {} row(s), {} missing from target", summary.checked, summary.missing);
    tracing::info!(checked = summary.checked, missing = summary.missing, "comparator run complete");

    Ok(())
}
