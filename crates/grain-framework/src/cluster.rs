//! # Cluster Client
//!
//! Everything a client process needs to talk to a silo: the endpoint it connects to, the
//! [`ClusterConnector`] seam, the in-process [`LocalGateway`] and the resulting
//! [`ClusterClient`] connection handle.

use crate::error::{ConnectionError, InvocationError};
use crate::grain::Grain;
use crate::grain_ref::GrainRef;
use crate::message::DirectoryRequest;
use crate::silo::{Routers, SiloConfig};
use crate::stream::StreamProvider;
use async_trait::async_trait;
use std::any::TypeId;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Where a client looks for the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub cluster_id: String,
    pub gateway: SocketAddr,
}

impl fmt::Display for ClusterEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.cluster_id, self.gateway)
    }
}

/// Builds a connected [`ClusterClient`].
///
/// The bootstrapper only depends on this trait, so tests can script failures and the
/// binary can plug in [`LocalGateway`].
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self, endpoint: &ClusterEndpoint) -> Result<ClusterClient, ConnectionError>;
}

/// Gateway of an in-process silo.
#[derive(Clone)]
pub struct LocalGateway {
    config: SiloConfig,
    routers: Arc<Routers>,
    streams: StreamProvider,
    running: Arc<AtomicBool>,
}

impl LocalGateway {
    pub(crate) fn new(
        config: SiloConfig,
        routers: Arc<Routers>,
        streams: StreamProvider,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            routers,
            streams,
            running,
        }
    }

    /// The endpoint a client should present to reach this gateway.
    pub fn endpoint(&self) -> ClusterEndpoint {
        ClusterEndpoint {
            cluster_id: self.config.cluster_id.clone(),
            gateway: self.config.gateway,
        }
    }
}

#[async_trait]
impl ClusterConnector for LocalGateway {
    async fn connect(&self, endpoint: &ClusterEndpoint) -> Result<ClusterClient, ConnectionError> {
        debug!(%endpoint, "Connecting");
        if endpoint.gateway != self.config.gateway {
            return Err(ConnectionError::Unreachable(endpoint.gateway.to_string()));
        }
        if endpoint.cluster_id != self.config.cluster_id {
            return Err(ConnectionError::ClusterIdMismatch {
                expected: self.config.cluster_id.clone(),
                actual: endpoint.cluster_id.clone(),
            });
        }
        if !self.running.load(Ordering::Acquire) {
            return Err(ConnectionError::SiloStopped);
        }
        info!(%endpoint, "Client connected");
        Ok(ClusterClient {
            endpoint: endpoint.clone(),
            routers: self.routers.clone(),
            streams: self.streams.clone(),
            connected: Arc::new(AtomicBool::new(true)),
            silo_running: self.running.clone(),
        })
    }
}

/// A live connection to a cluster.
///
/// Owned by whoever drives the session; [`ClusterClient::close`] must be called on every
/// exit path. After closing, every [`GrainRef`] obtained from this client fails with
/// [`InvocationError::ConnectionClosed`].
pub struct ClusterClient {
    endpoint: ClusterEndpoint,
    routers: Arc<Routers>,
    streams: StreamProvider,
    connected: Arc<AtomicBool>,
    silo_running: Arc<AtomicBool>,
}

impl fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterClient")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.connected.load(Ordering::Acquire))
            .field("silo_running", &self.silo_running.load(Ordering::Acquire))
            .finish()
    }
}

impl ClusterClient {
    pub fn endpoint(&self) -> &ClusterEndpoint {
        &self.endpoint
    }

    /// `true` while the client is open and the silo accepts calls.
    pub fn is_initialized(&self) -> bool {
        self.connected.load(Ordering::Acquire) && self.silo_running.load(Ordering::Acquire)
    }

    /// Addresses grain `(G::GRAIN_TYPE, id)`. No call is made.
    pub fn get_grain<G: Grain>(&self, id: G::Id) -> Result<GrainRef<G>, InvocationError> {
        let router = self
            .routers
            .get(&TypeId::of::<G>())
            .and_then(|router| router.downcast_ref::<mpsc::Sender<DirectoryRequest<G>>>())
            .ok_or(InvocationError::UnknownGrainType(G::GRAIN_TYPE))?;
        Ok(GrainRef::new(id, router.clone(), self.connected.clone()))
    }

    pub fn streams(&self) -> StreamProvider {
        self.streams.clone()
    }

    /// Disconnects. Idempotent.
    pub fn close(&self) {
        if self.connected.swap(false, Ordering::AcqRel) {
            info!(endpoint = %self.endpoint, "Client closed");
        }
    }
}
