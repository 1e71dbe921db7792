use std::sync::Arc;

use crate::capability::WorkerApp;
use crate::counters::Counters;
use crate::error::{EngineError, WorkError};
use crate::messages::{ItemMsg, ResultMsg};
use crate::queue::{QueueReceiver, QueueSender};

/// Runs one worker to completion: `init`, then the receive loop, then
/// exactly one `EndOfWorker` on the way out, whatever the exit path.
pub async fn run_worker<A>(
    worker_index: usize,
    app: Arc<A>,
    items_rx: QueueReceiver<ItemMsg<A::Item>>,
    results_tx: QueueSender<ResultMsg<A::Item, A::Result>>,
    counters: Arc<Counters>,
) -> Result<(), EngineError>
where
    A: WorkerApp,
    A::Item: Clone + std::fmt::Debug,
{
    let init_result = app.init(worker_index).await;

    let outcome = match init_result {
        Ok(()) => receive_loop(worker_index, &app, &items_rx, &results_tx, &counters).await,
        Err(err) => Err(EngineError::WorkerInitFailed { index: worker_index, source: err }),
    };

    // Exactly one EndOfWorker per worker, on every exit path.
    let _ = results_tx.put(ResultMsg::EndOfWorker).await;

    outcome
}

async fn receive_loop<A>(
    worker_index: usize,
    app: &A,
    items_rx: &QueueReceiver<ItemMsg<A::Item>>,
    results_tx: &QueueSender<ResultMsg<A::Item, A::Result>>,
    counters: &Counters,
) -> Result<(), EngineError>
where
    A: WorkerApp,
    A::Item: Clone + std::fmt::Debug,
{
    loop {
        let msg = match items_rx.get().await {
            Some(msg) => msg,
            None => break, // channel closed: treat like a missing Nil fan-out.
        };

        let item = match msg {
            ItemMsg::Nil => break,
            ItemMsg::Item(item) => item,
        };

        match app.work(worker_index, &item).await {
            Ok(Some(result)) => {
                counters.incr_processed(worker_index);
                results_tx
                    .put(ResultMsg::Record { path: item, result })
                    .await?;
            }
            Ok(None) => {
                // Application chose to drop this item; it already logged why.
            }
            Err(err) if err.is_ignorable() => {
                tracing::warn!(worker = worker_index, item = ?item, error = %err, "skipping item");
            }
            Err(WorkError::Io(err)) => {
                tracing::error!(worker = worker_index, item = ?item, error = %err, "i/o error, skipping item");
            }
            Err(err) => {
                tracing::error!(worker = worker_index, item = ?item, error = %err, "unhandled work error, skipping item");
            }
        }
    }

    Ok(())
}
