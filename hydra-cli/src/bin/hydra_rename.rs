use clap::Parser;
use hydra_apps::renamer::{is_fallback_name, RenamerSerializer, RenamerWorker};
use hydra_cli::common::{confirm, print_status, CommonArgs};
use hydra_core::fsutil::unique_destination;
use hydra_core::timestamp::run_stamp;
use hydra_engine::{run_engine, FsWalker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    let root = args.first_path()?;

    let stamp = run_stamp(chrono::Local::now());
    let _log_guard = hydra_core::logging::init("hydra-rename", &root, &stamp)?;

    let config = args.engine_config();
    let walker = FsWalker::new(root.clone());
    let worker_app = std::sync::Arc::new(RenamerWorker);
    let serializer = RenamerSerializer::default();

    let outcome = run_engine(config, walker, worker_app, serializer, print_status).await?;
    println!();

    let Some(mapping) = outcome.main_data.into_iter().next_back() else {
        tracing::info!("nothing to rename");
        return Ok(());
    };

    let mut renames = Vec::new();
    let mut skipped = 0usize;
    for (path, new_name) in mapping {
        if is_fallback_name(&new_name) {
            tracing::warn!(path = %path.display(), "skipping rename: no EXIF capture time");
            skipped += 1;
            continue;
        }
        let Some(parent) = path.parent() else { continue };
        let dest = unique_destination(parent, &new_name);
        if dest == path {
            continue;
        }
        println!("{} -> {}", path.display(), dest.display());
        renames.push((path, dest));
    }

    if skipped > 0 {
        println!("skipped {skipped} file(s) lacking EXIF capture time");
    }
    if renames.is_empty() {
        return Ok(());
    }
    if !confirm(&format!("Rename {} file(s)?", renames.len())) {
        println!("aborted");
        return Ok(());
    }

    for (path, dest) in renames {
        if let Err(err) = std::fs::rename(&path, &dest) {
            tracing::error!(path = %path.display(), dest = %dest.display(), error = %err, "failed to rename");
        }
    }

    Ok(())
}
