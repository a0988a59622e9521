//! Store-and-poll writes with the lazy retention sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use focus_protocols::types::now_millis;
use focus_protocols::{keys, KeyValueStore, StoreError, SummaryEntry};
use serde_json::Value;
use tracing::{debug, info};

/// Write the entry for `message_id`, then drop every summary entry older
/// than `retention`.
pub(crate) async fn write_summary(
    store: &Arc<dyn KeyValueStore>,
    message_id: &str,
    entry: &SummaryEntry,
    retention: Duration,
) -> Result<usize, StoreError> {
    let key = keys::summary_key(message_id);
    store
        .set(HashMap::from([(key.clone(), serde_json::to_value(entry)?)]))
        .await?;
    debug!("Stored summary {}", key);
    sweep(store, retention).await
}

pub(crate) async fn sweep(
    store: &Arc<dyn KeyValueStore>,
    retention: Duration,
) -> Result<usize, StoreError> {
    let now = now_millis();
    let max_age = retention.as_millis() as i64;
    let all = store.get_all().await?;
    let expired: Vec<&str> = all
        .iter()
        .filter(|(key, value)| keys::is_summary_key(key) && is_expired(value, now, max_age))
        .map(|(key, _)| key.as_str())
        .collect();

    if expired.is_empty() {
        return Ok(0);
    }
    store.remove(&expired).await?;
    info!("Cleaned up {} old summary results", expired.len());
    Ok(expired.len())
}

fn is_expired(value: &Value, now: i64, max_age: i64) -> bool {
    value
        .get("timestamp")
        .and_then(Value::as_i64)
        .is_some_and(|ts| now - ts > max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_runtime::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_sweeps_only_expired_summaries() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let old = now_millis() - 6 * 60 * 1000;
        store
            .set(HashMap::from([
                ("aiSummary_old".to_string(), json!({"summary": "x", "timestamp": old, "status": "success"})),
                ("aiSummary_fresh".to_string(), json!({"summary": "y", "timestamp": now_millis(), "status": "success"})),
                ("aiSummary_undated".to_string(), json!({"summary": "z"})),
                ("userGoal".to_string(), json!("old goal")),
            ]))
            .await
            .unwrap();

        let removed = write_summary(
            &store,
            "new",
            &SummaryEntry::success("hi", now_millis()),
            Duration::from_secs(300),
        )
        .await
        .unwrap();

        assert_eq!(removed, 1);
        let all = store.get_all().await.unwrap();
        assert!(!all.contains_key("aiSummary_old"));
        assert!(all.contains_key("aiSummary_fresh"));
        assert!(all.contains_key("aiSummary_undated"));
        assert!(all.contains_key("aiSummary_new"));
        assert!(all.contains_key("userGoal"));
    }
}
