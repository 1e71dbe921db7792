use std::sync::Arc;

use clap::Parser;
use hydra_apps::db::open_indexer_db;
use hydra_apps::indexer::{IndexSerializer, IndexWorker};
use hydra_cli::common::{print_status, CommonArgs};
use hydra_core::timestamp::run_stamp;
use hydra_engine::{run_engine, FsWalker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    let root = args.first_path()?;

    let stamp = run_stamp(chrono::Local::now());
    let _log_guard = hydra_core::logging::init("hydra-index", &root, &stamp)?;

    let db_path = root.join(format!("files_{stamp}.db"));
    let conn = open_indexer_db(&db_path)?;

    let config = args.engine_config();
    let walker = FsWalker::new(root.clone());
    let worker_app = Arc::new(IndexWorker);
    let serializer = IndexSerializer::new(conn);

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    tracing::info!(
        indexed = outcome.counters.indexed,
        skipped = outcome.counters.skipped,
        logged = outcome.counters.logged,
        db = %db_path.display(),
        "index run complete"
    );
    Ok(())
}
