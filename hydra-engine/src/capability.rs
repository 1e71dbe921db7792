use std::sync::Arc;

use crate::counters::Counters;
use crate::error::{EngineError, WorkError};
use crate::messages::ItemMsg;
use crate::queue::QueueSender;

/// Replaces `walk()` overriding by subclassing: the producer stage for one
/// engine run. The default filesystem walk lives in [`crate::walker::FsWalker`];
/// the comparator application supplies its own DB-row-iterating implementation.
pub trait ItemSource: Send + Sync {
    type Item: Send + 'static;

    /// Enumerate items and push them onto `tx`, then push exactly `workers`
    /// [`ItemMsg::Nil`] tokens. Implementations that enumerate a non-filesystem
    /// source must still honour this termination protocol.
    fn walk(
        &self,
        tx: QueueSender<ItemMsg<Self::Item>>,
        counters: Arc<Counters>,
        workers: usize,
    ) -> impl std::future::Future<Output = Result<(), EngineError>> + Send;
}

/// The worker-pool side of the capability record. Called concurrently from
/// every worker task, so methods take `&self` only.
pub trait WorkerApp: Send + Sync {
    type Item: Send + 'static;
    type Result: Send + 'static;

    /// Runs once per worker before it enters its receive loop. The engine
    /// guarantees this completes before the worker's first `get()`.
    fn init(&self, _worker_index: usize) -> impl std::future::Future<Output = Result<(), WorkError>> + Send {
        async { Ok(()) }
    }

    /// `Ok(None)` drops the item silently (the application must log why);
    /// `Ok(Some(r))` emits a result record; `Err` is classified by the
    /// worker loop per [`WorkError::is_ignorable`].
    fn work(
        &self,
        worker_index: usize,
        item: &Self::Item,
    ) -> impl std::future::Future<Output = Result<Option<Self::Result>, WorkError>> + Send;
}

/// The librarian side of the capability record. Owned exclusively by the
/// single librarian task, so methods take `&mut self`.
pub trait Serializer: Send {
    type Item: Send + 'static;
    type Result: Send + 'static;
    /// Payload handed to the supervisor's main-return channel. Applications
    /// that have no interactive post-processing use `()`.
    type MainPayload: Send + 'static;

    fn insert(
        &mut self,
        path: Self::Item,
        result: Self::Result,
    ) -> impl std::future::Future<Output = ()> + Send;

    /// Called on every commit tick and exactly once more after the loop
    /// exits, with `final_flush = true` on that last call.
    fn commit(&mut self, final_flush: bool) -> impl std::future::Future<Output = ()> + Send;

    /// Drains whatever this serializer wants to surface to the supervisor's
    /// main-return channel since the last call. Called by the engine right
    /// after every `commit`.
    fn take_main_payloads(&mut self) -> Vec<Self::MainPayload> {
        Vec::new()
    }
}
