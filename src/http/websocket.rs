//! WebSocket upgrade target.
//!
//! # Responsibilities
//! - Hold the one path that is upgraded to a WebSocket
//! - Complete the upgrade handshake and hand the socket to user code
//!
//! # Design Decisions
//! - At most one upgrade target per server; registering another replaces it
//! - Frame handling belongs to the callback
//! - Upgrade requests to other paths go through normal dispatch

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::{Params, PathPattern, PatternError};

type UpgradeCallback = Arc<dyn Fn(WebSocket, Params) -> BoxFuture<'static, ()> + Send + Sync>;

/// Path pattern plus the callback that owns upgraded sockets.
#[derive(Clone)]
pub struct UpgradeTarget {
    pattern: PathPattern,
    on_upgrade: UpgradeCallback,
}

impl UpgradeTarget {
    pub fn new<F, Fut>(pattern: &str, on_upgrade: F) -> Result<Self, PatternError>
    where
        F: Fn(WebSocket, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let pattern = PathPattern::parse(pattern)?;
        Ok(Self {
            pattern,
            on_upgrade: Arc::new(move |socket: WebSocket, params: Params| {
                on_upgrade(socket, params).boxed()
            }),
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn matches(&self, path: &str) -> Option<Params> {
        self.pattern.matches(path)
    }

    /// Finish the handshake; the callback runs on the upgraded connection.
    pub fn accept(&self, upgrade: WebSocketUpgrade, params: Params) -> Response {
        let callback = self.on_upgrade.clone();
        upgrade.on_upgrade(move |socket| callback(socket, params))
    }
}

impl fmt::Debug for UpgradeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpgradeTarget")
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}
