//! # Silo
//!
//! The silo hosts every registered grain type: one directory task per type, plus the
//! activations those directories spawn. It is started with [`SiloBuilder::start`] and
//! drained with [`Silo::stop`].

use crate::cluster::LocalGateway;
use crate::directory::Directory;
use crate::grain::Grain;
use crate::message::DirectoryRequest;
use crate::stream::StreamProvider;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Settings for a silo.
#[derive(Debug, Clone, PartialEq)]
pub struct SiloConfig {
    /// Clients must present the same id to connect.
    pub cluster_id: String,
    /// Address the gateway advertises.
    pub gateway: SocketAddr,
    /// Capacity of each directory channel.
    pub directory_buffer: usize,
    /// Idle timeout for grain types registered with [`SiloBuilder::register_evictable`].
    /// Types registered with [`SiloBuilder::register`] are never evicted. `None` disables
    /// eviction for every type.
    pub idle_timeout: Option<Duration>,
    /// Capacity of each broadcast stream.
    pub stream_capacity: usize,
}

impl Default for SiloConfig {
    fn default() -> Self {
        Self {
            cluster_id: "helloworldcluster".to_string(),
            gateway: SocketAddr::from(([127, 0, 0, 1], 30000)),
            directory_buffer: 32,
            idle_timeout: None,
            stream_capacity: 256,
        }
    }
}

/// Type-erased routers, keyed by the grain type. Each value is an
/// `mpsc::Sender<DirectoryRequest<G>>` for the `G` whose `TypeId` is the key.
pub(crate) type Routers = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

trait DirectoryStop: Send + Sync {
    fn stop(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

struct RegisteredDirectory<G: Grain> {
    router: mpsc::Sender<DirectoryRequest<G>>,
    handle: JoinHandle<()>,
}

impl<G: Grain> DirectoryStop for RegisteredDirectory<G> {
    fn stop(self: Box<Self>) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            let (respond_to, done) = oneshot::channel();
            if self
                .router
                .send(DirectoryRequest::Shutdown { respond_to })
                .await
                .is_ok()
            {
                let _ = done.await;
            }
            if let Err(e) = self.handle.await {
                error!(grain_type = G::GRAIN_TYPE, "Directory task failed: {:?}", e);
            }
        })
    }
}

/// Registers grain types and starts their directories.
///
/// # Example
///
/// ```rust,ignore
/// let silo = Silo::builder(SiloConfig::default())
///     .register::<ChatRoom>(chat_context)
///     .register_evictable::<Ticker>(ticker_context)
///     .start();
/// ```
pub struct SiloBuilder {
    config: SiloConfig,
    streams: StreamProvider,
    routers: Routers,
    directories: Vec<Box<dyn DirectoryStop>>,
}

impl SiloBuilder {
    /// Brings grain type `G` online with the shared `context`. Its activations live until
    /// the silo stops.
    ///
    /// Spawns the directory task, so this must run inside a Tokio runtime. Registering the
    /// same type twice keeps the first registration.
    pub fn register<G: Grain>(self, context: G::Context) -> Self {
        self.register_with::<G>(context, None)
    }

    /// Like [`SiloBuilder::register`], but activations that stay idle for
    /// [`SiloConfig::idle_timeout`] are deactivated and reactivated fresh on the next call.
    /// Only suitable for grains whose state may be lost.
    pub fn register_evictable<G: Grain>(self, context: G::Context) -> Self {
        let idle_timeout = self.config.idle_timeout;
        self.register_with::<G>(context, idle_timeout)
    }

    fn register_with<G: Grain>(
        mut self,
        context: G::Context,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let type_id = TypeId::of::<G>();
        if self.routers.contains_key(&type_id) {
            warn!(grain_type = G::GRAIN_TYPE, "Grain type already registered");
            return self;
        }
        let (directory, router) = Directory::<G>::new(self.config.directory_buffer, idle_timeout);
        let handle = tokio::spawn(directory.run(context));
        self.routers.insert(type_id, Box::new(router.clone()));
        self.directories
            .push(Box::new(RegisteredDirectory::<G> { router, handle }));
        self
    }

    /// The stream provider the silo will share; grain contexts usually hold a clone.
    pub fn streams(&self) -> StreamProvider {
        self.streams.clone()
    }

    pub fn start(self) -> Silo {
        info!(
            cluster_id = %self.config.cluster_id,
            gateway = %self.config.gateway,
            grain_types = self.directories.len(),
            "Silo started"
        );
        Silo {
            config: self.config,
            streams: self.streams,
            routers: Arc::new(self.routers),
            directories: self.directories,
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// A running silo.
pub struct Silo {
    config: SiloConfig,
    streams: StreamProvider,
    routers: Arc<Routers>,
    directories: Vec<Box<dyn DirectoryStop>>,
    running: Arc<AtomicBool>,
}

impl Silo {
    pub fn builder(config: SiloConfig) -> SiloBuilder {
        let streams = StreamProvider::new(config.stream_capacity);
        SiloBuilder {
            config,
            streams,
            routers: HashMap::new(),
            directories: Vec::new(),
        }
    }

    pub fn config(&self) -> &SiloConfig {
        &self.config
    }

    pub fn streams(&self) -> StreamProvider {
        self.streams.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The gateway clients connect through.
    pub fn gateway(&self) -> LocalGateway {
        LocalGateway::new(
            self.config.clone(),
            self.routers.clone(),
            self.streams.clone(),
            self.running.clone(),
        )
    }

    /// Gracefully stops the silo.
    ///
    /// New connections are refused immediately. Each directory then stops routing, every
    /// activation finishes the calls already in its mailbox and runs `on_deactivate`, and
    /// all tasks are joined. Calls issued after this point fail with
    /// [`InvocationError::SiloUnavailable`](crate::InvocationError::SiloUnavailable).
    pub async fn stop(self) {
        info!("Stopping silo...");
        self.running.store(false, Ordering::Release);
        for directory in self.directories {
            directory.stop().await;
        }
        info!("Silo stopped.");
    }
}
