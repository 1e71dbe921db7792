/// Message flowing walker → worker on the items queue.
///
/// Replaces the original engine's `NIL` sentinel value with a tagged
/// variant so a worker's `match` is exhaustive at compile time.
#[derive(Debug, Clone)]
pub enum ItemMsg<T> {
    Item(T),
    /// One of these is pushed per worker when the walker has no more input.
    Nil,
}

/// Message flowing worker → librarian on the results queue.
///
/// `Commit` and `EndOfWorker` replace the original's `"COMMIT"` string and
/// `END_OF_WORKER` sentinel respectively.
#[derive(Debug, Clone)]
pub enum ResultMsg<T, R> {
    Record { path: T, result: R },
    Commit,
    EndOfWorker,
}
