//! Advisory keep-alive: an unsolicited notification after a quiet period.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::mcp::Notification;
use crate::infra::runtime::output::OutputChannel;
use crate::infra::runtime::session::ActivityClock;

pub const HEARTBEAT_METHOD: &str = "notifications/heartbeat";

#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    pub idle_threshold: Duration,
}

pub fn spawn(out: OutputChannel, clock: ActivityClock, cfg: HeartbeatConfig) -> JoinHandle<()> {
    tokio::spawn(run(out, clock, cfg))
}

/// Ticks forever; stops only if the output stream is gone.
pub async fn run(out: OutputChannel, clock: ActivityClock, cfg: HeartbeatConfig) {
    let mut ticker = tokio::time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if clock.idle_for() < cfg.idle_threshold {
            continue;
        }

        let note = Notification::new(
            HEARTBEAT_METHOD,
            json!({ "timestamp": Utc::now().to_rfc3339() }),
        );
        if let Err(e) = out.send(&note).await {
            tracing::warn!(error = %e, "heartbeat could not be written, stopping");
            break;
        }
        tracing::debug!(idle_secs = clock.idle_for().as_secs(), "heartbeat sent");
        clock.touch();
    }
}
