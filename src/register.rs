//! Store and completion backend registration for Focus Partner.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};

use focus_config::{ConfigLoader, ConfigValidator, ProviderConfig, StorageConfig};
use focus_hub::FallbackCompletion;
use focus_protocols::{CompletionBackend, KeyValueStore};
use focus_provider_openai::OpenAIProvider;
use focus_runtime::{FileStore, MemoryStore};

/// Get the .focuspartner directory path.
pub(crate) fn focuspartner_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".focuspartner"))
        .unwrap_or_else(|| PathBuf::from(".focuspartner"))
}

/// Open the persistent store selected by `[storage]`.
pub(crate) async fn open_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "file" => {
            let path = ConfigLoader::expand_path(&config.path);
            let store = FileStore::open(&path)
                .await
                .with_context(|| format!("failed to open store at {}", path))?;
            Ok(Arc::new(store))
        }
        other => bail!("unknown storage backend: {}", other),
    }
}

/// Build the hub's completion wrapper. Without a usable credential the hub
/// runs in mock mode.
pub(crate) fn register_completion(config: &ProviderConfig) -> FallbackCompletion {
    if !ConfigValidator::has_usable_key(config.api_key.as_deref()) {
        warn!("No usable API key configured, completions will use the mock response");
        return FallbackCompletion::unconfigured();
    }

    let key = config.api_key.clone().unwrap_or_default();
    info!(
        "Registered completion backend {} (model {}, key {}...)",
        config.endpoint,
        config.model,
        key.chars().take(7).collect::<String>()
    );
    let provider = OpenAIProvider::with_url(Some(key), config.endpoint.clone())
        .with_model(config.model.clone())
        .with_max_completion_tokens(config.max_completion_tokens)
        .with_timeout(config.request_timeout());
    let backend: Arc<dyn CompletionBackend> = Arc::new(provider);
    FallbackCompletion::new(Some(backend))
}
