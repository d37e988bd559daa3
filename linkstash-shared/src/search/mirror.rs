/// Search mirror worker
///
/// Keeps the search index loosely in sync with the primary store without
/// blocking request handlers. Handlers enqueue mirror tasks; a single
/// background consumer applies them to the index.
///
/// # Queue semantics
///
/// - Bounded `tokio::sync::mpsc` channel, capacity set from configuration
///   (default 1024).
/// - Enqueue is non-blocking `try_send`. A full queue drops the task and
///   logs a warning; the primary store remains the source of truth.
/// - One consumer task, so tasks touching the same document are applied in
///   producer order and never race each other.
/// - Index failures are logged and swallowed. There is no retry.
/// - When every [`MirrorHandle`] is dropped the channel closes and the
///   consumer drains whatever is left before exiting.
///
/// # Example
///
/// ```no_run
/// use linkstash_shared::search::{spawn_mirror, MirrorTask, SearchClient};
///
/// # async fn example(client: SearchClient) {
/// let (handle, worker) = spawn_mirror(client, 1024);
/// handle.enqueue(MirrorTask::Delete { owner_id: 1, link_id: 7 });
/// drop(handle);
/// worker.await.ok();
/// # }
/// ```

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::document::LinkDocument;

/// One unit of mirror work
#[derive(Debug, Clone)]
pub enum MirrorTask {
    /// Index or replace a document (the document carries its owner)
    Index(LinkDocument),

    /// Remove a document from the index
    Delete { owner_id: i64, link_id: i64 },
}

/// Document store the mirror worker writes to
///
/// The production implementation is `SearchClient`; tests substitute an
/// in-memory recorder.
#[async_trait]
pub trait MirrorStore: Send + Sync + 'static {
    async fn index_document(&self, doc: LinkDocument) -> anyhow::Result<()>;

    async fn delete_document(&self, owner_id: i64, link_id: i64) -> anyhow::Result<()>;
}

/// Producer side of the mirror queue
///
/// Cheap to clone; one clone lives in the application state and is shared by
/// all request handlers.
#[derive(Clone)]
pub struct MirrorHandle {
    tx: mpsc::Sender<MirrorTask>,
}

impl MirrorHandle {
    /// Enqueues a task without blocking
    ///
    /// Returns whether the task was accepted. A full queue drops the task
    /// with a warning.
    pub fn enqueue(&self, task: MirrorTask) -> bool {
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(task)) => {
                tracing::warn!(?task, "Mirror queue full, dropping task");
                false
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                tracing::warn!(?task, "Mirror queue closed, dropping task");
                false
            }
        }
    }
}

/// Starts the mirror worker
///
/// Returns the producer handle and the consumer's join handle. The consumer
/// exits once the queue is closed and drained; await the join handle during
/// shutdown to flush pending writes.
pub fn spawn_mirror<S: MirrorStore>(
    store: S,
    capacity: usize,
) -> (MirrorHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel(capacity);

    let worker = tokio::spawn(async move {
        while let Some(task) = rx.recv().await {
            match task {
                MirrorTask::Index(doc) => {
                    let link_id = doc.id;
                    if let Err(err) = store.index_document(doc).await {
                        tracing::warn!(link_id, error = %err, "Failed to index link");
                    }
                }
                MirrorTask::Delete { owner_id, link_id } => {
                    if let Err(err) = store.delete_document(owner_id, link_id).await {
                        tracing::warn!(link_id, error = %err, "Failed to delete link from index");
                    }
                }
            }
        }

        tracing::debug!("Mirror queue drained, worker exiting");
    });

    (MirrorHandle { tx }, worker)
}
