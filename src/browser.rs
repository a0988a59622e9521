//! In-process browser: the hub, open pages and their chat surfaces.

use std::sync::Arc;

use tracing::info;

use focus_config::Config;
use focus_hub::Hub;
use focus_page::{AgentTimeouts, ContentRelay, PageAgent, RelayTimings, StaticPage};
use focus_protocols::{ContextAddress, FrameId, KeyValueStore, TabId};
use focus_runtime::{ContextRouter, HubHandle, SessionRepository, SummaryPoller, WindowBus};
use focus_surface::{ChatSurface, OverlayPort, PopupPort};

use crate::register::{open_store, register_completion};

const HUB_MAILBOX: usize = 64;

/// Every context of the extension, wired over in-process transports.
pub(crate) struct Browser {
    config: Config,
    store: Arc<dyn KeyValueStore>,
    router: ContextRouter,
    hub: HubHandle,
}

/// One open tab: its relay, agent and overlay frame.
pub(crate) struct Page {
    pub bus: WindowBus,
    pub agent: PageAgent,
    pub relay: ContentRelay,
    pub source: Arc<StaticPage>,
}

impl Browser {
    /// Open the store, start the hub and reset it as a fresh browser would.
    pub(crate) async fn launch(config: Config) -> anyhow::Result<Self> {
        let store = open_store(&config.storage).await?;
        let router = ContextRouter::new();
        let hub = Hub::with_summary_retention(
            store.clone(),
            register_completion(&config.provider),
            router.clone(),
            config.poll.retention(),
        );
        hub.on_startup().await;
        let (handle, mailbox) = HubHandle::channel(HUB_MAILBOX);
        hub.spawn(mailbox);

        Ok(Self {
            config,
            store,
            router,
            hub: handle,
        })
    }

    /// Load `url` in tab `tab`, with the overlay frame attached.
    pub(crate) fn open_page(&self, tab: TabId, url: &str, text: Option<String>) -> Page {
        let bus = WindowBus::default();
        let agent = PageAgent::new(&bus, AgentTimeouts::from_config(&self.config.timeouts));
        agent.clone().spawn(bus.port(FrameId::Top));

        let source = Arc::new(StaticPage::new(url, text));
        let address = ContextAddress::Tab(tab);
        let relay = ContentRelay::new(
            tab,
            &bus,
            self.hub.client(address),
            SessionRepository::new(self.store.clone()),
            source.clone(),
            RelayTimings::from_config(&self.config.timeouts, &self.config.relay),
        );
        relay.attach_overlay();
        relay
            .clone()
            .spawn(bus.port(FrameId::Top), self.router.attach(address));
        relay.on_load();
        info!("Opened {} in tab {}", url, tab);

        Page {
            bus,
            agent,
            relay,
            source,
        }
    }

    pub(crate) fn open_popup(&self) -> ChatSurface<PopupPort> {
        let poller = SummaryPoller::new(
            self.store.clone(),
            self.config.poll.interval(),
            self.config.poll.max_attempts,
            self.config.poll.retention(),
        );
        let (port, signals) = PopupPort::connect(
            self.hub.client(ContextAddress::Popup),
            self.router.attach(ContextAddress::Popup),
            poller,
            self.config.timeouts.completion(),
        );
        let surface = ChatSurface::new(port, self.store.clone());
        surface.serve_signals(signals);
        surface
    }

    pub(crate) fn open_overlay(&self, page: &Page) -> ChatSurface<OverlayPort> {
        let (port, signals) = OverlayPort::connect(&page.bus, self.config.timeouts.completion());
        let surface = ChatSurface::new(port, self.store.clone());
        surface.serve_signals(signals);
        surface
    }
}

impl Page {
    /// Simulate a navigation inside the page.
    pub(crate) fn navigate(&self, url: &str, text: Option<String>) {
        self.source.navigate(url, text);
        self.relay.notify_mutation();
    }
}
