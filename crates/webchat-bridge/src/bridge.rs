//! Entry points used by the transport layer.
//!
//! A [`Bridge`] turns host events into [`WireMessage`]s, hands them to every
//! subscriber and queues chat messages for persistence. History requests go
//! the other way: stored rows are rebuilt into history-flagged messages.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use webchat_shared::builder::{build_connection_state, build_historic, build_live};
use webchat_shared::translations::extract_translations;
use webchat_shared::{
    BuildError, ClientContext, ConnectionState, HistoryRecord, MessageBody, RawTextEvent,
    WireMessage,
};
use webchat_store::{HistoryStore, StoreError};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::events::{ContextSink, HostEvent};
use crate::notice;
use crate::worker::HistoryWorker;

pub struct Bridge<C> {
    ctx: C,
    config: BridgeConfig,
    store: Option<Arc<HistoryStore>>,
    worker: Option<HistoryWorker>,
    tx: broadcast::Sender<WireMessage>,
}

impl<C> Bridge<C>
where
    C: ClientContext + Send + Sync + 'static,
{
    /// Create a bridge, opening the history store in `config.game_dir` when
    /// history is enabled. A store that fails to open is logged and the
    /// bridge runs without persistence.
    pub fn open(ctx: C, config: BridgeConfig) -> Self {
        let store = if config.history_enabled {
            match HistoryStore::open_in(&config.game_dir) {
                Ok(store) => Some(store),
                Err(e) => {
                    error!(
                        error = %e,
                        game_dir = %config.game_dir.display(),
                        "failed to open chat history, continuing without persistence"
                    );
                    None
                }
            }
        } else {
            info!("chat history disabled");
            None
        };

        Self::new(ctx, config, store)
    }

    /// Create a bridge around an already opened store (or none).
    /// Must be called from within a tokio runtime.
    pub fn new(ctx: C, config: BridgeConfig, store: Option<HistoryStore>) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity);
        let store = store.map(Arc::new);
        let worker = store.clone().map(HistoryWorker::spawn);

        Self {
            ctx,
            config,
            store,
            worker,
            tx,
        }
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn has_history(&self) -> bool {
        self.store.is_some()
    }

    /// New receiver for every message broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WireMessage> {
        self.tx.subscribe()
    }

    /// Chat or system text received by the host.
    pub fn on_live_event(&self, event: &RawTextEvent) -> Result<WireMessage, BuildError> {
        let message = build_live(event, &self.ctx)?;

        self.broadcast(message.clone());

        if let Some(worker) = &self.worker {
            if !worker.enqueue(message.clone()) {
                warn!("history worker stopped, chat message not persisted");
            }
        }

        Ok(message)
    }

    /// Connection lifecycle notification. Broadcast only, never persisted.
    pub fn on_connection_lifecycle(&self, state: ConnectionState) -> WireMessage {
        let message = build_connection_state(state, &self.ctx);
        self.broadcast(message.clone());
        message
    }

    /// Dispatch one host event. Context updates return `None`.
    pub fn handle(&self, event: &HostEvent) -> Result<Option<WireMessage>, BridgeError>
    where
        C: ContextSink,
    {
        match event {
            HostEvent::Context(ctx) => {
                self.ctx.replace(ctx.clone());
                Ok(None)
            }
            HostEvent::Connection { state } => Ok(Some(self.on_connection_lifecycle(*state))),
            HostEvent::Chat { component } => {
                Ok(Some(self.on_live_event(&RawTextEvent::chat(component.clone()))?))
            }
            HostEvent::Game { component } => {
                Ok(Some(self.on_live_event(&RawTextEvent::game(component.clone()))?))
            }
        }
    }

    /// Save one message synchronously, bypassing the worker.
    ///
    /// Fails with [`StoreError::Closed`] when the bridge has no store.
    pub fn persist(&self, message: &WireMessage) -> Result<(), StoreError> {
        match &self.store {
            Some(store) => store.save(message),
            None => Err(StoreError::Closed),
        }
    }

    /// The latest `limit` messages of a server, newest first, flagged as
    /// history. Messages still queued for persistence are included.
    pub async fn fetch_history(&self, server_id: &str, limit: u32) -> Vec<WireMessage> {
        self.fetch(server_id, None, limit).await
    }

    /// Like [`Bridge::fetch_history`] but only messages older than `before`.
    pub async fn fetch_history_before(
        &self,
        server_id: &str,
        before: i64,
        limit: u32,
    ) -> Vec<WireMessage> {
        self.fetch(server_id, Some(before), limit).await
    }

    /// The in-game notice pointing the player at the web interface.
    pub fn join_notice(&self) -> serde_json::Value {
        notice::join_notice(self.config.http_port)
    }

    /// Drain pending saves, then close the store.
    pub async fn shutdown(self) {
        if let Some(worker) = self.worker {
            worker.shutdown().await;
        }

        if let Some(store) = self.store {
            if let Err(e) = store.close() {
                error!(error = %e, "failed to close history store");
            }
        }
    }

    async fn fetch(&self, server_id: &str, before: Option<i64>, limit: u32) -> Vec<WireMessage> {
        let Some(store) = self.store.clone() else {
            return Vec::new();
        };

        if let Some(worker) = &self.worker {
            worker.flush().await;
        }

        let id = server_id.to_string();
        let records = tokio::task::spawn_blocking(move || match before {
            Some(before) => store.query_before(&id, before, limit),
            None => store.query(&id, limit),
        })
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "history query task panicked");
            Vec::new()
        });

        records
            .iter()
            .filter_map(|record| self.replay(record))
            .collect()
    }

    fn replay(&self, record: &HistoryRecord) -> Option<WireMessage> {
        let mut message = match build_historic(record) {
            Ok(message) => message,
            Err(e) => {
                warn!(id = record.id, error = %e, "skipping unreadable history row");
                return None;
            }
        };

        if let MessageBody::ChatMessage(payload) = &mut message.body {
            payload.translations = extract_translations(&payload.component, &self.ctx);
        }

        Some(message)
    }

    fn broadcast(&self, message: WireMessage) {
        if self.tx.send(message).is_err() {
            debug!("no subscribers connected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use webchat_shared::{identity, PlaySession, StaticContext};

    use crate::events::HostState;

    fn world() -> StaticContext {
        StaticContext {
            world_attached: true,
            session: Some(PlaySession::Remote {
                name: Some("Friends".to_string()),
                address: "mc.example.org".to_string(),
            }),
            game_version: "1.21.1".to_string(),
            ..Default::default()
        }
    }

    fn config(dir: &std::path::Path) -> BridgeConfig {
        BridgeConfig {
            game_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_live_event_is_broadcast_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Bridge::open(world(), config(dir.path()));
        assert!(bridge.has_history());
        let mut rx = bridge.subscribe();

        let sent = bridge
            .on_live_event(&RawTextEvent::chat(json!({"text": "<Alex> hi"})))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap(), sent);

        let server_id = identity::resolve(&world()).identifier;
        let history = bridge.fetch_history(&server_id, 10).await;
        assert_eq!(history.len(), 1);

        let replayed = history[0].chat_payload().unwrap();
        let original = sent.chat_payload().unwrap();
        assert!(replayed.is_history);
        assert_eq!(replayed.uuid, original.uuid);
        assert_eq!(replayed.component, original.component);
        assert_eq!(history[0].timestamp, sent.timestamp);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_connection_state_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Bridge::open(world(), config(dir.path()));
        let mut rx = bridge.subscribe();

        let msg = bridge.on_connection_lifecycle(ConnectionState::Join);
        assert_eq!(rx.recv().await.unwrap(), msg);

        let history = bridge.fetch_history(&msg.server.identifier, 10).await;
        assert!(history.is_empty());
        assert!(matches!(bridge.persist(&msg), Err(StoreError::InvalidPayload)));

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_live_event_without_world_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Bridge::open(StaticContext::default(), config(dir.path()));
        let mut rx = bridge.subscribe();

        let result = bridge.on_live_event(&RawTextEvent::game(json!({"text": "x"})));
        assert!(matches!(result, Err(BuildError::NoWorld)));
        assert!(rx.try_recv().is_err());

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_history_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.history_enabled = false;
        let bridge = Bridge::open(world(), cfg);

        assert!(!bridge.has_history());
        let sent = bridge
            .on_live_event(&RawTextEvent::chat(json!({"text": "hi"})))
            .unwrap();
        assert!(matches!(bridge.persist(&sent), Err(StoreError::Closed)));
        assert!(bridge.fetch_history(&sent.server.identifier, 10).await.is_empty());
        assert!(!dir.path().join("web-chat").exists());

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_unopenable_store_degrades() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("web-chat"), b"file, not a directory").unwrap();

        let bridge = Bridge::open(world(), config(dir.path()));
        assert!(!bridge.has_history());
        assert!(bridge
            .on_live_event(&RawTextEvent::chat(json!({"text": "still live"})))
            .is_ok());

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_history_paging_and_translations() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = world();
        ctx.translations
            .insert("chat.type.text".to_string(), "<%s> %s".to_string());
        let bridge = Bridge::open(ctx, config(dir.path()));
        let server = identity::resolve(bridge.context());

        for ts in [100, 200, 300] {
            let msg = WireMessage {
                timestamp: ts,
                server: server.clone(),
                client_version: "1.21.1".to_string(),
                body: MessageBody::ChatMessage(webchat_shared::ChatPayload {
                    is_history: false,
                    uuid: format!("uuid-{ts}"),
                    component: json!({"translate": "chat.type.text", "with": ["Alex", "hi"]}),
                    translations: Default::default(),
                }),
            };
            bridge.persist(&msg).unwrap();
        }

        let latest = bridge.fetch_history(&server.identifier, 2).await;
        let timestamps: Vec<i64> = latest.iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![300, 200]);
        assert_eq!(
            latest[0].chat_payload().unwrap().translations["chat.type.text"],
            "<%s> %s"
        );

        let older = bridge.fetch_history_before(&server.identifier, 200, 10).await;
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].timestamp, 100);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_handle_updates_context() {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(HostState::default());
        let bridge = Bridge::open(host.clone(), config(dir.path()));

        let before = bridge
            .handle(&HostEvent::Connection {
                state: ConnectionState::Init,
            })
            .unwrap()
            .unwrap();
        assert!(before.server.is_disconnected());

        assert!(bridge.handle(&HostEvent::Context(world())).unwrap().is_none());
        let chat = bridge
            .handle(&HostEvent::Chat {
                component: json!({"text": "hello"}),
            })
            .unwrap()
            .unwrap();
        assert_eq!(chat.server.name, "Friends");

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_persists_queue() {
        let dir = tempfile::tempdir().unwrap();
        let bridge = Bridge::open(world(), config(dir.path()));
        for i in 0..3 {
            bridge
                .on_live_event(&RawTextEvent::chat(json!({"text": format!("m{i}")})))
                .unwrap();
        }
        bridge.shutdown().await;

        let store = HistoryStore::open_in(dir.path()).unwrap();
        let server_id = identity::resolve(&world()).identifier;
        assert_eq!(store.message_count(&server_id).unwrap(), 3);
    }
}
