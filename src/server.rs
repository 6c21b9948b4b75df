//! HTTP server and graceful shutdown.
//!
//! The server owns nothing request-specific: it resolves the options once,
//! wraps the route table in an `Arc`, and hands every accepted connection to
//! the dispatch pipeline. On SIGTERM or Ctrl-C it stops accepting and drains
//! every in-flight connection before returning.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Options;
use crate::error::Error;
use crate::pipeline;
use crate::router::Router;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Binds to `0.0.0.0` on the given port. The conventional default is
    /// port 3000.
    pub fn port(port: u16) -> Self {
        Self { addr: SocketAddr::from(([0, 0, 0, 0], port)) }
    }

    /// Starts accepting connections and dispatching them through `router`
    /// under `options`.
    ///
    /// The route table and options are frozen from this point on — every
    /// concurrent request reads the same immutable copies. Returns only
    /// after a full graceful shutdown.
    pub async fn serve(self, router: Router, options: Options) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        let router = Arc::new(router);
        // The static root is derived here, once; requests never touch the
        // raw options again.
        let options = Arc::new(options.resolve());

        info!(addr = %self.addr, "dispatch listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` checks arms top-to-bottom: a shutdown signal stops
                // the accept loop even when connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let options = Arc::clone(&options);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // `service_fn` is invoked once per request on the
                        // connection, not once per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let options = Arc::clone(&options);
                            async move {
                                Ok::<_, std::convert::Infallible>(
                                    pipeline::dispatch(router, options, req).await,
                                )
                            }
                        });

                        // Auto builder: HTTP/1.1 or HTTP/2, whatever the
                        // client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("dispatch stopped");
        Ok(())
    }
}

/// Resolves on the first shutdown signal: SIGTERM or Ctrl-C on Unix, Ctrl-C
/// only elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
