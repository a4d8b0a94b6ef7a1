//! Stable identity of the world or server the player is on.
//!
//! History is partitioned by [`ServerContext::identifier`], so the identifier
//! must come out the same every time the player returns to the same place:
//!
//! - Local worlds (singleplayer / LAN host): the save folder name is the
//!   display name, the identifier is a name-based UUID of the save path
//!   relative to the game directory. Moving the whole game directory keeps
//!   the identifier; renaming or moving the save does not.
//! - Remote servers: the server list name (or the address when unnamed) is
//!   the display name, the identifier is a name-based UUID of the address
//!   exactly as the user typed it.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{name_uuid, ServerContext};

/// What the client is currently connected to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlaySession {
    /// A world hosted by the client itself.
    Local {
        /// Game directory all saves live under.
        root: PathBuf,
        /// Root folder of the world save.
        save_path: PathBuf,
    },
    /// A multiplayer server.
    Remote {
        /// Name from the server list, if any.
        name: Option<String>,
        /// `host[:port]` as entered by the user.
        address: String,
    },
}

/// Ambient state of the host client.
pub trait ClientContext {
    /// Whether a world is loaded. Live chat cannot be built without one.
    fn world_attached(&self) -> bool;

    /// The current play session, if the host can tell.
    fn session(&self) -> Option<PlaySession>;

    /// Host application version, e.g. `1.21.1`.
    fn game_version(&self) -> String;

    /// Localized string for a translation key, if the host knows it.
    fn translate(&self, _key: &str) -> Option<String> {
        None
    }
}

impl<T: ClientContext + ?Sized> ClientContext for std::sync::Arc<T> {
    fn world_attached(&self) -> bool {
        (**self).world_attached()
    }

    fn session(&self) -> Option<PlaySession> {
        (**self).session()
    }

    fn game_version(&self) -> String {
        (**self).game_version()
    }

    fn translate(&self, key: &str) -> Option<String> {
        (**self).translate(key)
    }
}

/// Plain-data [`ClientContext`], filled in by whoever observes the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StaticContext {
    pub world_attached: bool,
    pub session: Option<PlaySession>,
    pub game_version: String,
    pub translations: std::collections::BTreeMap<String, String>,
}

impl ClientContext for StaticContext {
    fn world_attached(&self) -> bool {
        self.world_attached
    }

    fn session(&self) -> Option<PlaySession> {
        self.session.clone()
    }

    fn game_version(&self) -> String {
        self.game_version.clone()
    }

    fn translate(&self, key: &str) -> Option<String> {
        self.translations.get(key).cloned()
    }
}

/// Resolve the current [`ServerContext`]. Falls back to the disconnected
/// sentinel whenever there is nothing to identify.
pub fn resolve<C: ClientContext + ?Sized>(ctx: &C) -> ServerContext {
    if !ctx.world_attached() {
        return ServerContext::disconnected();
    }

    match ctx.session() {
        Some(PlaySession::Local { root, save_path }) => local_context(&root, &save_path),
        Some(PlaySession::Remote { name, address }) => remote_context(name.as_deref(), &address),
        None => ServerContext::disconnected(),
    }
}

fn local_context(root: &Path, save_path: &Path) -> ServerContext {
    let world_name = save_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| save_path.to_string_lossy().into_owned());

    let seed = match save_path.strip_prefix(root) {
        Ok(relative) => portable_path(relative),
        Err(_) => {
            tracing::debug!(
                root = %root.display(),
                save_path = %save_path.display(),
                "save path outside game directory, seeding identity with full path"
            );
            portable_path(save_path)
        }
    };

    tracing::debug!(world = %world_name, seed = %seed, "resolved local world");

    ServerContext::new(world_name, name_uuid(&seed).to_string())
}

fn remote_context(name: Option<&str>, address: &str) -> ServerContext {
    let display = match name {
        Some(n) if !n.is_empty() => n,
        _ => address,
    };
    ServerContext::new(display, name_uuid(address).to_string())
}

/// Join path components with `/` so the seed does not depend on the
/// platform separator. `.` components are dropped.
fn portable_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
