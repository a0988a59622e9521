//! Hub wiring shared by the port tests.

use std::sync::Arc;

use async_trait::async_trait;
use focus_hub::{FallbackCompletion, Hub};
use focus_protocols::{CompletionBackend, KeyValueStore, ProviderError};
use focus_runtime::{ContextRouter, HubHandle, MemoryStore};

pub const REPLY: &str = "¡Vamos! Let's do this.";

/// Backend answering every prompt with [`REPLY`].
struct ScriptedBackend;

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(REPLY.to_string())
    }
}

pub struct HubFixture {
    pub store: Arc<dyn KeyValueStore>,
    pub router: ContextRouter,
    pub handle: HubHandle,
}

pub fn start_hub() -> HubFixture {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let router = ContextRouter::new();
    let backend: Arc<dyn CompletionBackend> = Arc::new(ScriptedBackend);
    let hub = Hub::new(
        store.clone(),
        FallbackCompletion::new(Some(backend)),
        router.clone(),
    );
    let (handle, mailbox) = HubHandle::channel(16);
    hub.spawn(mailbox);
    HubFixture {
        store,
        router,
        handle,
    }
}
