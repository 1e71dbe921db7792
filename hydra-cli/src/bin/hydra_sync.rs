use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hydra_apps::syncdb::{SyncSerializer, SyncWorker};
use hydra_cli::common::print_status;
use hydra_core::timestamp::run_stamp;
use hydra_engine::config::EngineConfig;
use hydra_engine::{run_engine, FsWalker};

/// Rebases files that match a reference database's hash index onto a new
/// destination tree (§4.8).
#[derive(Debug, Clone, Parser)]
struct Args {
    /// Reference database to look hashes up in.
    reference_db: PathBuf,

    /// Path component that anchors the rebase: everything up to and
    /// including this component is stripped from the reference path.
    anchor: String,

    /// Root to scan for input files.
    input_root: PathBuf,

    /// Root under which rebased files are written.
    destination_root: PathBuf,

    /// Number of worker tasks.
    #[arg(long, env = "HYDRA_WORKERS", default_value_t = EngineConfig::DEFAULT_WORKERS)]
    workers: usize,

    /// Log the rebase plan without copying anything.
    #[arg(long)]
    dryrun: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stamp = run_stamp(chrono::Local::now());
    let _log_guard = hydra_core::logging::init("hydra-sync", &args.destination_root, &stamp)?;

    let config = EngineConfig::new(args.workers.max(1));
    let walker = FsWalker::new(args.input_root.clone());
    let worker_app = Arc::new(SyncWorker::new(args.reference_db.clone(), args.anchor.clone()));
    let serializer = SyncSerializer::new(args.destination_root.clone(), args.dryrun);

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    tracing::info!(
        moved = outcome.serializer.files_moved(),
        skipped = outcome.serializer.files_skipped(),
        dryrun = args.dryrun,
        "sync-to-db complete"
    );
    Ok(())
}
