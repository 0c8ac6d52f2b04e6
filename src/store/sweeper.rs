//! Background removal of expired sessions.
//!
//! The sweeper only bounds storage growth. Correctness does not depend on it:
//! `SessionStore::get` filters expired records on its own.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use super::SessionStore;

/// Spawn a task that calls `sweep()` every `every` until aborted.
///
/// A zero interval is clamped to one second.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    let every = if every.is_zero() {
        Duration::from_secs(1)
    } else {
        every
    };

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so startup is not a sweep.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.sweep().await {
                Ok(0) => debug!("session sweep: nothing expired"),
                Ok(removed) => info!(removed, "session sweep removed expired sessions"),
                Err(err) => error!("session sweep failed: {err}"),
            }
        }
    })
}
