//! Background persistence of chat messages.
//!
//! The event side only enqueues; a single tokio task drains the queue and
//! runs every save on the blocking pool, one at a time, so writes to the
//! store are serialized and disk latency never reaches event delivery.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use webchat_shared::WireMessage;
use webchat_store::HistoryStore;

enum Job {
    Save(WireMessage),
    Flush(oneshot::Sender<()>),
}

pub struct HistoryWorker {
    tx: mpsc::UnboundedSender<Job>,
    handle: JoinHandle<()>,
}

impl HistoryWorker {
    /// Spawn the worker task. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<HistoryStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx));
        Self { tx, handle }
    }

    /// Queue a message for persistence. Returns `false` if the worker is gone.
    pub fn enqueue(&self, message: WireMessage) -> bool {
        self.tx.send(Job::Save(message)).is_ok()
    }

    /// Wait until every message queued before this call has been handled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stop accepting messages and wait for the queue to drain.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            error!(error = %e, "history worker terminated abnormally");
        }
    }
}

async fn run(store: Arc<HistoryStore>, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Save(message) => {
                let store = store.clone();
                let timestamp = message.timestamp;
                match tokio::task::spawn_blocking(move || store.save(&message)).await {
                    Ok(Ok(())) => debug!(timestamp, "chat message persisted"),
                    // A lost history row must not interrupt live chat.
                    Ok(Err(e)) => warn!(timestamp, error = %e, "failed to persist chat message"),
                    Err(e) => error!(error = %e, "history save task panicked"),
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("history worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webchat_shared::{ChatPayload, MessageBody, ServerContext};

    fn chat(timestamp: i64) -> WireMessage {
        WireMessage {
            timestamp,
            server: ServerContext::new("World", "abc"),
            client_version: "1.21.1".to_string(),
            body: MessageBody::ChatMessage(ChatPayload {
                is_history: false,
                uuid: format!("uuid-{timestamp}"),
                component: json!({"text": "hi"}),
                translations: Default::default(),
            }),
        }
    }

    #[tokio::test]
    async fn test_flush_waits_for_queued_saves() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HistoryStore::open(&dir.path().join("history.db")).unwrap());
        let worker = HistoryWorker::spawn(store.clone());

        for ts in 1..=5 {
            assert!(worker.enqueue(chat(ts)));
        }
        worker.flush().await;
        assert_eq!(store.message_count("abc").unwrap(), 5);

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HistoryStore::open(&dir.path().join("history.db")).unwrap());
        let worker = HistoryWorker::spawn(store.clone());

        worker.enqueue(chat(1));
        worker.enqueue(chat(2));
        worker.shutdown().await;

        assert_eq!(store.message_count("abc").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_errors_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HistoryStore::open(&dir.path().join("history.db")).unwrap());
        store.close().unwrap();

        let worker = HistoryWorker::spawn(store);
        assert!(worker.enqueue(chat(1)));
        worker.flush().await;
        worker.shutdown().await;
    }
}
