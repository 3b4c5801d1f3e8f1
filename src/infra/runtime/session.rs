use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::tools::gateway::DatabaseGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initialized,
    ShuttingDown,
}

/// Last time the session saw traffic. Shared with the heartbeat task; a
/// stale read only delays a heartbeat by one tick.
#[derive(Clone, Debug)]
pub struct ActivityClock(Arc<RwLock<Instant>>);

impl Default for ActivityClock {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(Instant::now())))
    }
}

impl ActivityClock {
    pub fn touch(&self) {
        if let Ok(mut t) = self.0.write() {
            *t = Instant::now();
        }
    }

    pub fn idle_for(&self) -> Duration {
        self.0.read().map(|t| t.elapsed()).unwrap_or_default()
    }
}

/// The one session of this process: the gateway, where the handshake
/// stands, and when we last heard from the caller.
pub struct Session {
    pub gateway: DatabaseGateway,
    lifecycle: Lifecycle,
    activity: ActivityClock,
}

impl Session {
    pub fn new(gateway: DatabaseGateway, activity: ActivityClock) -> Self {
        Self {
            gateway,
            lifecycle: Lifecycle::Uninitialized,
            activity,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle != Lifecycle::Uninitialized
    }

    pub fn mark_initialized(&mut self) {
        if self.lifecycle == Lifecycle::Uninitialized {
            self.lifecycle = Lifecycle::Initialized;
        }
    }

    pub fn begin_shutdown(&mut self) {
        self.lifecycle = Lifecycle::ShuttingDown;
    }

    pub fn touch(&self) {
        self.activity.touch();
    }

    /// Closes the connection, if any. Safe to call more than once.
    pub async fn teardown(&mut self) {
        self.gateway.close().await;
    }
}
