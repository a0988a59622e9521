//! Reading side of store-and-poll delivery.

use std::sync::Arc;
use std::time::Duration;

use focus_protocols::types::now_millis;
use focus_protocols::{keys, KeyValueStore, SummaryEntry};
use tracing::{debug, warn};

/// Polls the store for a summary the hub writes under `aiSummary_<id>`.
#[derive(Clone)]
pub struct SummaryPoller {
    store: Arc<dyn KeyValueStore>,
    interval: Duration,
    max_attempts: u32,
    retention: Duration,
}

impl SummaryPoller {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        interval: Duration,
        max_attempts: u32,
        retention: Duration,
    ) -> Self {
        Self {
            store,
            interval,
            max_attempts,
            retention,
        }
    }

    /// Wait for the entry of `message_id`, consuming it when found.
    ///
    /// Returns `None` when the budget runs out, when the hub recorded an
    /// error, or when the entry is already past retention.
    pub async fn poll(&self, message_id: &str) -> Option<String> {
        let key = keys::summary_key(message_id);
        for attempt in 1..=self.max_attempts {
            match self.store.get(&[key.as_str()]).await {
                Ok(mut found) => {
                    if let Some(value) = found.remove(&key) {
                        if let Err(e) = self.store.remove(&[key.as_str()]).await {
                            warn!("Failed to remove summary {}: {}", key, e);
                        }
                        return self.read_entry(&key, value);
                    }
                }
                Err(e) => warn!("Summary poll for {} failed: {}", key, e),
            }
            debug!("Summary {} not ready (attempt {}/{})", key, attempt, self.max_attempts);
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        warn!("Summary {} not received after {} attempts", key, self.max_attempts);
        None
    }

    fn read_entry(&self, key: &str, value: serde_json::Value) -> Option<String> {
        let entry: SummaryEntry = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Unreadable summary {}: {}", key, e);
                return None;
            }
        };
        let age_ms = now_millis() - entry.timestamp;
        if age_ms > self.retention.as_millis() as i64 {
            debug!("Summary {} expired ({} ms old)", key, age_ms);
            return None;
        }
        if let Some(error) = &entry.error {
            warn!("Hub reported summary error for {}: {}", key, error);
        }
        entry.into_text()
    }
}
