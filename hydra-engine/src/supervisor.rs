use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::capability::{ItemSource, Serializer, WorkerApp};
use crate::config::EngineConfig;
use crate::counters::{Counters, CountersSnapshot};
use crate::error::EngineError;
use crate::librarian::run_librarian;
use crate::messages::{ItemMsg, ResultMsg};
use crate::queue::bounded;
use crate::ticker::run_commit_ticker;
use crate::worker::run_worker;

/// Final state handed back to the caller once every stage has exited: the
/// application's serializer (so the caller can read its final, private
/// state), everything it surfaced on the main-return channel, and a last
/// counters snapshot.
pub struct EngineOutcome<S: Serializer> {
    pub serializer: S,
    pub main_data: Vec<S::MainPayload>,
    pub counters: CountersSnapshot,
}

/// Runs one complete engine pipeline to completion and is the supervisor of
/// §4.6: spawns the walker, the worker pool, the librarian and the commit
/// ticker, renders progress via `on_status`, then joins every stage in order
/// before returning.
///
/// `on_status` is invoked roughly once per `config.status_interval` with the
/// latest counters snapshot; applications with no interactive progress
/// display can pass a no-op closure.
pub async fn run_engine<I, A, S>(
    config: EngineConfig,
    item_source: I,
    worker_app: Arc<A>,
    serializer: S,
    mut on_status: impl FnMut(&CountersSnapshot),
) -> Result<EngineOutcome<S>, EngineError>
where
    I: ItemSource<Item = A::Item> + 'static,
    A: WorkerApp + 'static,
    S: Serializer<Item = A::Item, Result = A::Result> + 'static,
    A::Item: Clone + std::fmt::Debug,
{
    let counters = Arc::new(Counters::new(config.workers));

    let (items_tx, items_rx) = bounded::<ItemMsg<A::Item>>(config.queue_capacity);
    let (results_tx, results_rx) = bounded::<ResultMsg<A::Item, A::Result>>(config.queue_capacity);
    let (main_tx, main_rx) = bounded::<S::MainPayload>(config.queue_capacity);

    // Walker, wrapped in a supervisor that substitutes the N `Nil` tokens
    // itself if the walk fails or panics, so workers never deadlock on
    // `get()` — the engine's resolution of the spec's Open Question (b).
    let walker_counters = Arc::clone(&counters);
    let walker_workers = config.workers;
    let walker_fallback_tx = items_tx.clone();
    let walker_handle: JoinHandle<()> = tokio::spawn(async move {
        let inner: JoinHandle<Result<(), EngineError>> = tokio::spawn(async move {
            item_source.walk(items_tx, walker_counters, walker_workers).await
        });

        let failed = match inner.await {
            Ok(Ok(())) => false,
            Ok(Err(err)) => {
                tracing::error!(error = %err, "walker failed, injecting termination tokens");
                true
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "walker task panicked, injecting termination tokens");
                true
            }
        };

        if failed {
            for _ in 0..walker_workers {
                let _ = walker_fallback_tx.put(ItemMsg::Nil).await;
            }
        }
    });

    let mut worker_handles: Vec<JoinHandle<Result<(), EngineError>>> =
        Vec::with_capacity(config.workers);
    for worker_index in 0..config.workers {
        let app = Arc::clone(&worker_app);
        let items_rx = items_rx.clone();
        let results_tx = results_tx.clone();
        let counters = Arc::clone(&counters);
        worker_handles.push(tokio::spawn(async move {
            run_worker(worker_index, app, items_rx, results_tx, counters).await
        }));
    }

    let ticker_tx = results_tx.clone();
    let ticker_handle: JoinHandle<()> =
        tokio::spawn(run_commit_ticker(ticker_tx, config.commit_interval));

    // Drop the supervisor's own producer handles now that every consumer/
    // producer task holds the clones it needs.
    drop(results_tx);

    let librarian_counters = Arc::clone(&counters);
    let librarian_workers = config.workers;
    let mut librarian_handle: JoinHandle<Result<S, EngineError>> = tokio::spawn(async move {
        run_librarian(serializer, results_rx, librarian_counters, librarian_workers, main_tx).await
    });

    let mut main_data: Vec<S::MainPayload> = Vec::new();

    // Status loop: redraw progress, drain whatever's on the main-return
    // channel, and poll worker liveness until every worker has exited.
    loop {
        while let Some(payload) = main_rx.try_get().await {
            main_data.push(payload);
        }
        on_status(&counters.snapshot());

        if worker_handles.iter().all(|h| h.is_finished()) {
            break;
        }
        tokio::time::sleep(config.status_interval).await;
    }

    ticker_handle.abort();
    for handle in worker_handles.drain(..) {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(error = %err, "worker exited with error"),
            Err(join_err) => tracing::error!(error = %join_err, "worker task panicked"),
        }
    }
    walker_handle.await.map_err(|e| EngineError::WalkerFailed(e.to_string()))?;

    // Librarian-drain loop: keep draining the main-return channel until the
    // librarian task itself resolves (it may push its final payload from
    // the post-loop flush).
    let librarian_result = loop {
        tokio::select! {
            result = &mut librarian_handle => break result,
            payload = main_rx.get() => {
                if let Some(payload) = payload {
                    main_data.push(payload);
                }
            }
        }
    };

    while let Some(payload) = main_rx.try_get().await {
        main_data.push(payload);
    }

    let serializer = librarian_result
        .map_err(|e| EngineError::LibrarianFailed(e.to_string()))??;

    Ok(EngineOutcome { serializer, main_data, counters: counters.snapshot() })
}
