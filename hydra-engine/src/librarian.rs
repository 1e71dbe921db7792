use std::sync::Arc;

use crate::capability::Serializer;
use crate::counters::Counters;
use crate::error::EngineError;
use crate::messages::ResultMsg;
use crate::queue::{QueueReceiver, QueueSender};

/// Single-threaded serializer stage. Exits after observing `workers` many
/// `EndOfWorker` tokens, then performs exactly one final commit.
///
/// Payloads an application wants to surface to the supervisor are pushed
/// onto `main_tx` as soon as they're produced rather than accumulated here,
/// so the supervisor can drain them while the librarian is still running —
/// this is the main-return channel of §4.7.
pub async fn run_librarian<S>(
    mut app: S,
    results_rx: QueueReceiver<ResultMsg<S::Item, S::Result>>,
    counters: Arc<Counters>,
    workers: usize,
    main_tx: QueueSender<S::MainPayload>,
) -> Result<S, EngineError>
where
    S: Serializer,
{
    let mut workers_done = 0usize;

    loop {
        let msg = match results_rx.get().await {
            Some(msg) => msg,
            None => break, // all senders dropped; treat as drained.
        };

        match msg {
            ResultMsg::EndOfWorker => {
                workers_done += 1;
                if workers_done >= workers {
                    break;
                }
            }
            ResultMsg::Commit => {
                app.commit(false).await;
                for payload in app.take_main_payloads() {
                    let _ = main_tx.put(payload).await;
                }
            }
            ResultMsg::Record { path, result } => {
                app.insert(path, result).await;
                counters.incr_logged();
            }
        }
    }

    app.commit(true).await;
    for payload in app.take_main_payloads() {
        let _ = main_tx.put(payload).await;
    }

    Ok(app)
}
