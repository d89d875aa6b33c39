//! Dual-surface process runtime.
//!
//! Owns the two listeners (public, gateway), runs them concurrently for the
//! process lifetime, and tears both down together: shutdown stops acceptance
//! of new connections and drains in-flight requests, bounded by the
//! configured drain timeout.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to bind {surface} listener on {addr}: {source}")]
    Bind {
        surface: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to inspect {surface} listener: {source}")]
    Listener {
        surface: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub public_addr: SocketAddr,
    pub gateway_addr: SocketAddr,
    pub drain_timeout: Duration,
}

/// Both surfaces, running. Obtained from [`DualSurfaceRuntime::start`];
/// stopped exactly once via [`DualSurfaceRuntime::stop`] (idempotent).
pub struct DualSurfaceRuntime {
    shutdown: CancellationToken,
    drain_timeout: Duration,
    public_addr: SocketAddr,
    gateway_addr: SocketAddr,
    handles: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl std::fmt::Debug for DualSurfaceRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualSurfaceRuntime")
            .field("public_addr", &self.public_addr)
            .field("gateway_addr", &self.gateway_addr)
            .finish_non_exhaustive()
    }
}

impl DualSurfaceRuntime {
    /// Binds both listeners, then launches one supervised serve task per
    /// surface. Binding happens before anything serves: if the gateway
    /// address is taken, the already-bound public listener is released
    /// before the error returns, so a bind failure never leaves an orphaned
    /// sibling.
    pub async fn start(
        config: RuntimeConfig,
        public: Router,
        gateway: Router,
    ) -> Result<Self, RuntimeError> {
        let public_listener = TcpListener::bind(config.public_addr)
            .await
            .map_err(|source| RuntimeError::Bind {
                surface: "public",
                addr: config.public_addr,
                source,
            })?;
        let gateway_listener = match TcpListener::bind(config.gateway_addr).await
        {
            Ok(listener) => listener,
            Err(source) => {
                // public_listener drops here, releasing its port.
                return Err(RuntimeError::Bind {
                    surface: "gateway",
                    addr: config.gateway_addr,
                    source,
                });
            }
        };

        let public_addr =
            public_listener
                .local_addr()
                .map_err(|source| RuntimeError::Listener {
                    surface: "public",
                    source,
                })?;
        let gateway_addr =
            gateway_listener
                .local_addr()
                .map_err(|source| RuntimeError::Listener {
                    surface: "gateway",
                    source,
                })?;

        let shutdown = CancellationToken::new();
        let handles = vec![
            (
                "public",
                spawn_surface("public", public_listener, public, shutdown.clone()),
            ),
            (
                "gateway",
                spawn_surface(
                    "gateway",
                    gateway_listener,
                    gateway,
                    shutdown.clone(),
                ),
            ),
        ];

        info!(
            public = %public_addr,
            gateway = %gateway_addr,
            "both surfaces accepting requests"
        );

        Ok(Self {
            shutdown,
            drain_timeout: config.drain_timeout,
            public_addr,
            gateway_addr,
            handles: Mutex::new(handles),
        })
    }

    /// Address the public surface actually bound (resolves port 0).
    pub fn public_addr(&self) -> SocketAddr {
        self.public_addr
    }

    /// Address the gateway surface actually bound.
    pub fn gateway_addr(&self) -> SocketAddr {
        self.gateway_addr
    }

    /// Requests both listeners to stop accepting new work and waits until
    /// in-flight requests finish, bounded by the drain timeout. Idempotent:
    /// later calls find nothing left to join and return immediately.
    pub async fn stop(&self) {
        self.shutdown.cancel();

        let mut handles = self.handles.lock().await;
        for (surface, mut handle) in handles.drain(..) {
            match tokio::time::timeout(self.drain_timeout, &mut handle).await {
                Ok(Ok(())) => info!(surface, "listener stopped"),
                Ok(Err(err)) => {
                    error!(surface, error = %err, "listener task failed")
                }
                Err(_) => {
                    warn!(
                        surface,
                        "drain timeout elapsed; abandoning in-flight requests"
                    );
                    handle.abort();
                }
            }
        }
    }
}

fn spawn_surface(
    surface: &'static str,
    listener: TcpListener,
    router: Router,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown = token.clone();
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await;

        if let Err(err) = result {
            // Take the sibling down with us; a half-running process serves
            // no one.
            error!(surface, error = %err, "listener exited with error");
            token.cancel();
        }
    })
}
