//! Search-as-you-type: a query is only sent once input has been quiet for the
//! debounce delay.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::api::v1::files::{FileEntry, ListFilesRequest};
use crate::api::{ApiClient, ApiError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

type Dispatch = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

/// A cancellable timer in front of a dispatch function.
///
/// Each `push` cancels the pending timer, if any, and arms a new one. Only a
/// timer that runs out without being cancelled dispatches. A dispatch that
/// has already started is never interrupted.
pub struct Debouncer {
    delay: Duration,
    dispatch: Dispatch,
    pending: Option<oneshot::Sender<()>>,
}

impl Debouncer {
    pub fn new<F, Fut>(delay: Duration, dispatch: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            dispatch: Arc::new(move |query| dispatch(query).boxed()),
            pending: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, query: impl Into<String>) {
        self.cancel();

        let query = query.into();
        if query.trim().is_empty() {
            return;
        }

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.pending = Some(cancel_tx);

        let delay = self.delay;
        let dispatch = self.dispatch.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // Fires on explicit cancel and when the sender is dropped
                _ = cancel_rx => return,
            }
            dispatch(query).await;
        });
    }

    /// Drop the pending timer without dispatching.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.pending.take() {
            let _ = cancel.send(());
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Debug)]
pub struct SearchResults {
    pub query: String,
    pub result: Result<Vec<FileEntry>, ApiError>,
}

/// Numbers dispatches so a slow one overtaken by a newer one can be spotted.
#[derive(Debug, Clone, Default)]
struct LatestDispatch(Arc<AtomicU64>);

impl LatestDispatch {
    fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, seq: u64) -> bool {
        self.0.load(Ordering::SeqCst) == seq
    }
}

/// Debounced file search against the backend. Results arrive on the
/// receiver returned by `new`. Results of a search that finishes after a
/// newer one was dispatched are dropped, so the last result received always
/// belongs to the latest dispatched query.
pub struct SearchSession {
    debouncer: Debouncer,
}

impl SearchSession {
    pub fn new(
        client: ApiClient,
        folder_id: Option<Uuid>,
        delay: Duration,
    ) -> (Self, flume::Receiver<SearchResults>) {
        let (results_tx, results_rx) = flume::unbounded();
        let latest = LatestDispatch::default();

        let debouncer = Debouncer::new(delay, move |query: String| {
            let client = client.clone();
            let results_tx = results_tx.clone();
            let latest = latest.clone();
            async move {
                let seq = latest.begin();
                tracing::debug!("searching for {:?}", query);
                let result = client
                    .call(ListFilesRequest {
                        folder_id,
                        search: Some(query.clone()),
                    })
                    .await;
                if !latest.is_current(seq) {
                    tracing::debug!("dropping stale results for {:?}", query);
                    return;
                }
                let _ = results_tx.send(SearchResults { query, result });
            }
        });

        (Self { debouncer }, results_rx)
    }

    pub fn push(&mut self, query: impl Into<String>) {
        self.debouncer.push(query);
    }

    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }
}
