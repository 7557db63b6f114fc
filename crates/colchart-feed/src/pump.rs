//! Bridges from async sources into a [`BatchFeed`].

use crate::BatchFeed;
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;

/// Forward every batch from a broadcast channel into `feed` until the
/// channel closes. Returns the number of batches forwarded.
///
/// A lagging receiver skips the batches it missed; each batch is a complete
/// replacement, so only the newest matters.
pub async fn pump<T>(mut receiver: broadcast::Receiver<Vec<T>>, feed: BatchFeed<T>) -> u64
where
    T: Clone + Send + Sync + 'static,
{
    let mut forwarded = 0;
    loop {
        match receiver.recv().await {
            Ok(batch) => {
                feed.publish(batch);
                forwarded += 1;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "feed pump lagged, skipping stale batches");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!(forwarded, "feed pump source closed");
                break;
            }
        }
    }
    forwarded
}

/// Forward every batch from a stream into `feed` until the stream ends
pub async fn pump_stream<T, S>(stream: S, feed: BatchFeed<T>) -> u64
where
    T: Send + Sync + 'static,
    S: Stream<Item = Vec<T>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut forwarded = 0;
    while let Some(batch) = stream.next().await {
        feed.publish(batch);
        forwarded += 1;
    }
    tracing::debug!(forwarded, "feed pump stream ended");
    forwarded
}
