use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use hydra_apps::dedup::{count_warnings, DedupSerializer, DedupWorker};
use hydra_cli::common::{confirm, print_status, CommonArgs, EXIT_BATCH_REFUSED};
use hydra_core::timestamp::run_stamp;
use hydra_engine::config::EngineConfig;
use hydra_engine::{run_engine, FsWalker};

/// Duplicate detection and deletion (§4.8).
#[derive(Debug, Clone, Parser)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Auto-proceed iff no warnings fire; refuse (exit 1) otherwise.
    #[arg(long)]
    batch: bool,

    /// Invert the path sort used to decide which copy of a duplicate pair
    /// is "the original" versus "the extra".
    #[arg(long)]
    reverse: bool,

    /// Run the whole pipeline once per immediate subdirectory of the root,
    /// each as an independent engine run.
    #[arg(long)]
    recursive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let root = args.common.first_path()?;

    let stamp = run_stamp(chrono::Local::now());
    let _log_guard = hydra_core::logging::init("hydra-dedup", &root, &stamp)?;

    let config = args.common.engine_config();

    let targets: Vec<PathBuf> = if args.recursive {
        let mut subdirs: Vec<PathBuf> = std::fs::read_dir(&root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();
        subdirs
    } else {
        vec![root]
    };

    let mut any_refused = false;
    for target in targets {
        let refused = run_dedup_pass(&target, config.clone(), args.reverse, args.batch).await?;
        any_refused |= refused;
    }

    if any_refused {
        std::process::exit(EXIT_BATCH_REFUSED);
    }
    Ok(())
}

/// Runs one engine pass over `target` and performs dedup's post-processing.
/// Returns `true` if batch mode refused to delete due to warnings.
async fn run_dedup_pass(target: &Path, config: EngineConfig, reverse: bool, batch: bool) -> anyhow::Result<bool> {
    tracing::info!(target = %target.display(), "dedup pass starting");

    let walker = FsWalker::new(target);
    let worker_app = Arc::new(DedupWorker);
    let serializer = DedupSerializer::new(reverse);

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    let duplicates: HashSet<PathBuf> = outcome.main_data.into_iter().collect();
    if duplicates.is_empty() {
        tracing::info!(target = %target.display(), "no duplicates found");
        return Ok(false);
    }

    let warnings = count_warnings(&duplicates);
    let mut sorted: Vec<&PathBuf> = duplicates.iter().collect();
    sorted.sort();
    for path in &sorted {
        println!("duplicate: {}", path.display());
    }
    if warnings > 0 {
        println!("warning: {warnings} duplicate(s) lack a `_N`/` (N)` suffix convention");
    }

    let proceed = if batch {
        if warnings > 0 {
            tracing::error!(target = %target.display(), warnings, "batch mode refusing to delete");
            false
        } else {
            true
        }
    } else {
        confirm(&format!("Delete {} duplicate file(s) under {}?", sorted.len(), target.display()))
    };

    if !proceed {
        return Ok(batch && warnings > 0);
    }

    for path in sorted {
        if let Err(err) = std::fs::remove_file(path) {
            tracing::error!(path = %path.display(), error = %err, "failed to delete duplicate");
        }
    }
    Ok(false)
}
