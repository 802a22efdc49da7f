use crate::chat_room::{ChatRoom, ChatRoomContext};
use crate::ticker::{Ticker, TickerContext};
use grain_framework::{LocalGateway, Silo, SiloConfig, StreamProvider};
use tracing::info;

/// The silo side of the application: ChatRoom and Ticker registered on one silo.
///
/// Rooms keep their history for the silo's lifetime. Only the Ticker honours
/// [`SiloConfig::idle_timeout`].
///
/// # Example
///
/// ```ignore
/// let system = ChatSystem::start(config.silo_config());
/// let client = Bootstrapper::new(endpoint, strategy)
///     .connect(&system.gateway(), &mut stdout)
///     .await?;
/// // ... run the session ...
/// system.shutdown().await;
/// ```
pub struct ChatSystem {
    silo: Silo,
}

impl ChatSystem {
    pub fn start(config: SiloConfig) -> Self {
        Self::start_with(config, TickerContext::default())
    }

    /// Starts with a custom ticker workload.
    pub fn start_with(config: SiloConfig, ticker: TickerContext) -> Self {
        let builder = Silo::builder(config);
        let rooms = ChatRoomContext::new(builder.streams());
        let silo = builder
            .register::<ChatRoom>(rooms)
            .register_evictable::<Ticker>(ticker)
            .start();
        info!("Chat system started");
        Self { silo }
    }

    pub fn gateway(&self) -> LocalGateway {
        self.silo.gateway()
    }

    pub fn streams(&self) -> StreamProvider {
        self.silo.streams()
    }

    /// Drains every activation and stops the silo.
    pub async fn shutdown(self) {
        info!("Shutting down chat system...");
        self.silo.stop().await;
        info!("Chat system shutdown complete.");
    }
}
