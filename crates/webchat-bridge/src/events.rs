//! Host events as delivered to the bridge, one JSON object per line.
//!
//! ```text
//! {"event":"context","world_attached":true,"session":{"kind":"remote","name":null,"address":"mc.example.org"},"game_version":"1.21.1"}
//! {"event":"chat","component":{"text":"<Alex> hi"}}
//! {"event":"game","component":{"translate":"multiplayer.player.joined","with":[{"text":"Alex"}]}}
//! {"event":"connection","state":"join"}
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde::Deserialize;
use webchat_shared::{ClientContext, ConnectionState, PlaySession, StaticContext};

use crate::error::BridgeError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
    /// Replaces the ambient client state.
    Context(StaticContext),
    Chat { component: serde_json::Value },
    Game { component: serde_json::Value },
    Connection { state: ConnectionState },
}

impl HostEvent {
    pub fn parse(line: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Client state observed from the host, updated as `context` events arrive.
#[derive(Debug, Default)]
pub struct HostState {
    ctx: RwLock<StaticContext>,
}

impl HostState {
    pub fn update(&self, ctx: StaticContext) {
        *self.ctx.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = ctx;
    }

    fn read(&self) -> RwLockReadGuard<'_, StaticContext> {
        self.ctx.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ClientContext for HostState {
    fn world_attached(&self) -> bool {
        self.read().world_attached
    }

    fn session(&self) -> Option<PlaySession> {
        self.read().session.clone()
    }

    fn game_version(&self) -> String {
        self.read().game_version.clone()
    }

    fn translate(&self, key: &str) -> Option<String> {
        self.read().translations.get(key).cloned()
    }
}

/// A context the bridge can overwrite when the host reports new state.
pub trait ContextSink {
    fn replace(&self, ctx: StaticContext);
}

impl ContextSink for HostState {
    fn replace(&self, ctx: StaticContext) {
        self.update(ctx);
    }
}

impl<T: ContextSink + ?Sized> ContextSink for Arc<T> {
    fn replace(&self, ctx: StaticContext) {
        (**self).replace(ctx);
    }
}
