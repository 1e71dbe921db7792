use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use hydra_apps::datemover::{DateMoverSerializer, DateMoverWorker, DateResult};
use hydra_cli::common::{confirm, print_status, CommonArgs};
use hydra_core::fsutil::unique_destination;
use hydra_core::timestamp::run_stamp;
use hydra_engine::{run_engine, FsWalker};

/// Sorts files into `destination/YYYYMMDD/` folders by capture date (§4.8).
#[derive(Debug, Clone, Parser)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Look for an existing `destination/<date>/<same-basename>` match
    /// before falling back to this worker's last known EXIF date.
    #[arg(long)]
    similar: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.common.paths.len() < 2 {
        anyhow::bail!("usage: hydra-datemove <source> <destination> [--similar]");
    }
    let source = args.common.paths[0].clone();
    let destination = args.common.paths[1].clone();
    std::fs::create_dir_all(&destination)?;

    let stamp = run_stamp(chrono::Local::now());
    let _log_guard = hydra_core::logging::init("hydra-datemove", &source, &stamp)?;

    let config = args.common.engine_config();
    let walker = FsWalker::new(source.clone());
    let worker_app = Arc::new(DateMoverWorker::new(destination.clone(), args.similar, config.workers));
    let serializer = DateMoverSerializer::default();

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    let Some(mapping) = outcome.main_data.into_iter().next_back() else {
        tracing::info!("nothing to move");
        return Ok(());
    };

    let mut resolved: Vec<(PathBuf, String)> = Vec::with_capacity(mapping.len());
    for (path, result) in mapping {
        let date = match result {
            DateResult::Known(date) => date,
            DateResult::Ambiguous([from_mtime, other]) => {
                println!("{}: ambiguous date, mtime says {from_mtime}, other evidence says {other}", path.display());
                let pick = confirm(&format!("Use the other date ({other}) instead of mtime ({from_mtime})?"));
                if pick { other } else { from_mtime }
            }
        };
        println!("{} -> {}/{date}/", path.display(), destination.display());
        resolved.push((path, date));
    }

    if resolved.is_empty() {
        return Ok(());
    }
    if !confirm(&format!("Copy {} file(s) into dated folders under {}?", resolved.len(), destination.display())) {
        println!("aborted");
        return Ok(());
    }

    for (path, date) in resolved {
        let folder = destination.join(&date);
        if let Err(err) = std::fs::create_dir_all(&folder) {
            tracing::error!(folder = %folder.display(), error = %err, "failed to create date folder");
            continue;
        }
        let Some(basename) = path.file_name().and_then(|n| n.to_str()) else {
            tracing::error!(path = %path.display(), "skipping path with no basename");
            continue;
        };
        let dest = unique_destination(&folder, basename);
        if let Err(err) = std::fs::copy(&path, &dest) {
            tracing::error!(path = %path.display(), dest = %dest.display(), error = %err, "failed to copy");
        }
    }

    Ok(())
}
