//! Shared CLI plumbing for the six `hydra-*` binaries: common flags,
//! progress rendering, and the interactive `y`/`N` confirmation prompt used
//! by the destructive applications.

pub mod common;
