use std::io::Write as _;
use std::path::PathBuf;

use clap::Parser;
use hydra_engine::config::EngineConfig;
use hydra_engine::counters::CountersSnapshot;

/// Flags shared by every `hydra-*` binary (§6).
#[derive(Debug, Clone, Parser)]
pub struct CommonArgs {
    /// Root path(s) to process.
    pub paths: Vec<PathBuf>,

    /// Number of worker tasks.
    #[arg(long, env = "HYDRA_WORKERS", default_value_t = EngineConfig::DEFAULT_WORKERS)]
    pub workers: usize,
}

impl CommonArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.workers.max(1))
    }

    pub fn first_path(&self) -> anyhow::Result<PathBuf> {
        self.paths.first().cloned().ok_or_else(|| anyhow::anyhow!("at least one path is required"))
    }
}

/// Renders one carriage-return-terminated status line (§4.6) and flushes
/// stdout so it's visible without a trailing newline.
pub fn print_status(snapshot: &CountersSnapshot) {
    print!("{}", snapshot.status_line());
    let _ = std::io::stdout().flush();
}

/// The interactive `y`/`Y` vs `n`/`N`/empty confirmation prompt used by
/// every destructive application's post-processing phase (§7). Anything
/// other than an affirmative answer is treated as a refusal.
pub fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y")
}

/// Exit code reserved for batch-mode refusing a destructive action due to
/// warnings (§6).
pub const EXIT_BATCH_REFUSED: i32 = 1;
