//! Reusable parallel file-tree processing engine: a three-stage pipeline
//! (walker → worker pool → librarian) built on bounded async queues, with
//! sentinel-based termination, periodic commit ticks, and a pluggable
//! per-application capability set.
//!
//! Applications plug in by implementing [`capability::ItemSource`] (the
//! producer, optional — defaults to [`walker::FsWalker`]),
//! [`capability::WorkerApp`] (the per-item hook) and [`capability::Serializer`]
//! (the single-threaded persistence hook), then calling
//! [`supervisor::run_engine`].

pub mod capability;
pub mod config;
pub mod counters;
pub mod error;
pub mod librarian;
pub mod messages;
pub mod queue;
pub mod supervisor;
pub mod ticker;
pub mod walker;
pub mod worker;

pub use capability::{ItemSource, Serializer, WorkerApp};
pub use config::EngineConfig;
pub use counters::{Counters, CountersSnapshot};
pub use error::{EngineError, WorkError};
pub use messages::{ItemMsg, ResultMsg};
pub use queue::{bounded, QueueReceiver, QueueSender};
pub use supervisor::{run_engine, EngineOutcome};
pub use walker::FsWalker;
