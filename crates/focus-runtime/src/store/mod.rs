//! Key/value store implementations.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use serde_json::Value;

/// Select the requested keys from a full map.
pub(crate) fn pick(entries: &HashMap<String, Value>, keys: &[&str]) -> HashMap<String, Value> {
    keys.iter()
        .filter_map(|k| entries.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}
