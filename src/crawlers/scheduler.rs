use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Runs work in fixed-size concurrent chunks with a pause between chunks
///
/// All futures of a chunk are polled together on the calling task and the
/// next chunk starts only after every one of them has finished, so at most
/// `limit` fetches are ever in flight.
#[derive(Debug, Clone, Copy)]
pub struct ChunkScheduler {
    limit: usize,
    pause: Duration,
}

impl ChunkScheduler {
    pub fn new(limit: usize, pause: Duration) -> Self {
        Self {
            limit: limit.max(1),
            pause,
        }
    }

    #[cfg(test)]
    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    /// Apply `task` to every item, chunk by chunk
    ///
    /// Outputs are returned in input order. No pause follows the last chunk.
    pub async fn run<T, F, Fut>(&self, items: Vec<T>, mut task: F) -> Vec<Fut::Output>
    where
        F: FnMut(T) -> Fut,
        Fut: Future,
    {
        let total = items.len();
        let mut outputs = Vec::with_capacity(total);
        let mut items = items.into_iter().peekable();
        let mut chunk_index = 0;

        while items.peek().is_some() {
            if chunk_index > 0 {
                self.pause().await;
            }

            let chunk: Vec<Fut> = items.by_ref().take(self.limit).map(&mut task).collect();
            ::log::trace!("Dispatching chunk {} with {} items", chunk_index, chunk.len());
            outputs.extend(join_all(chunk).await);
            chunk_index += 1;
        }

        ::log::debug!("Scheduler finished {} items in {} chunks", total, chunk_index);
        outputs
    }

    /// Sleep for the inter-chunk pause
    pub async fn pause(&self) {
        if !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
    }
}
