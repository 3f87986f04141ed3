//! Periodic eviction of idle sessions.
//!
//! A session whose idle clock exceeds the timeout is evicted through the same
//! disconnect path as an explicit close, so room cleanup and departure
//! broadcasts behave identically.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::Config;
use crate::websocket::{CollabHub, DisconnectReason};

pub fn spawn_idle_sweeper(hub: CollabHub, config: &Config) -> JoinHandle<()> {
    let sweep_interval = config.sweep_interval;
    let idle_timeout = config.idle_timeout;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let evicted = sweep_idle_sessions(&hub, idle_timeout).await;
            if evicted > 0 {
                tracing::info!(evicted, "idle sweep completed");
            }
        }
    })
}

/// Evict every session idle for at least `idle_timeout`. Returns the number
/// of sessions evicted.
pub async fn sweep_idle_sessions(hub: &CollabHub, idle_timeout: Duration) -> usize {
    let now = Utc::now();
    let idle: Vec<Uuid> = {
        let state = hub.inner.read().await;
        state
            .sessions
            .values()
            .filter(|session| {
                now.signed_duration_since(session.last_active_at)
                    .to_std()
                    .map(|idle_for| idle_for >= idle_timeout)
                    .unwrap_or(false)
            })
            .map(|session| session.connection_id)
            .collect()
    };

    for connection_id in &idle {
        tracing::info!(%connection_id, "evicting idle session");
        hub.disconnect(*connection_id, DisconnectReason::IdleTimeout)
            .await;
    }
    idle.len()
}
