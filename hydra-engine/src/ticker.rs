use std::time::Duration;

use crate::messages::ResultMsg;
use crate::queue::QueueSender;

/// Recurring timer that pushes a `Commit` marker onto the results queue.
/// Runs until the task that owns the handle drops/aborts it; the supervisor
/// aborts it before joining the librarian.
pub async fn run_commit_ticker<T, R>(tx: QueueSender<ResultMsg<T, R>>, interval: Duration)
where
    T: Send + 'static,
    R: Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; skip it.
    loop {
        ticker.tick().await;
        if tx.put(ResultMsg::Commit).await.is_err() {
            break;
        }
    }
}
