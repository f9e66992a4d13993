use crate::core::parser::InputParser;
use crate::core::ConvertLengths;
use crate::rpc::protocol::{decode_request, Reply, Request, Response, DEFAULT_MAX_LINE_LENGTH};
use crate::utils::error::Result;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{watch, Semaphore};
use tokio_util::codec::{Framed, LinesCodec};
use tokio_util::task::TaskTracker;

/// Answers protocol requests from a converter.
#[derive(Clone)]
pub struct ConvertHandler {
    converter: Arc<dyn ConvertLengths>,
}

impl ConvertHandler {
    pub fn new(converter: Arc<dyn ConvertLengths>) -> Self {
        Self { converter }
    }

    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::AvailableUnits { id } => {
                Response::ok(id, Reply::Units(self.converter.available_units()))
            }
            Request::Convert { id, input } => {
                tracing::info!("Received: {}", input);
                let output = InputParser::new(self.converter.as_ref()).convert_input(&input);
                tracing::info!("Converted: {}", output);
                Response::ok(id, Reply::Text(output))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerLimits {
    pub max_connections: usize,
    pub max_line_length: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_connections: 64,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

pub struct RpcServer {
    listener: TcpListener,
    handler: ConvertHandler,
    limits: ServerLimits,
}

impl RpcServer {
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        handler: ConvertHandler,
        limits: ServerLimits,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handler,
            limits,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serves until `signal` completes. Open connections finish the request
    /// they are on and are closed before this returns.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let addr = self.local_addr()?;
        tracing::info!("✨ Conversion service listening on {}", addr);

        let permits = Arc::new(Semaphore::new(self.limits.max_connections));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let connections = TaskTracker::new();
        tokio::pin!(signal);

        loop {
            let permit = tokio::select! {
                _ = &mut signal => break,
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (stream, peer) = tokio::select! {
                _ = &mut signal => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            tracing::debug!("Accepted connection from {}", peer);
            let handler = self.handler.clone();
            let shutdown = shutdown_rx.clone();
            let max_line_length = self.limits.max_line_length;

            connections.spawn(async move {
                if let Err(e) = serve_connection(stream, handler, max_line_length, shutdown).await {
                    tracing::warn!("Connection {} ended with error: {}", peer, e);
                } else {
                    tracing::debug!("Connection {} closed", peer);
                }
                drop(permit);
            });
        }

        tracing::info!("🛑 Conversion service on {} shutting down", addr);
        let _ = shutdown_tx.send(true);
        connections.close();
        tracing::debug!("Waiting for {} open connection(s)", connections.len());
        connections.wait().await;
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    handler: ConvertHandler,
    max_line_length: usize,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));

    loop {
        let line = tokio::select! {
            _ = shutdown.changed() => return Ok(()),
            line = framed.next() => line,
        };

        let Some(line) = line else {
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match decode_request(&line) {
            Ok(request) => {
                tracing::debug!("→ {} (id {})", request.method(), request.id());
                handler.handle(request)
            }
            Err(fault) => {
                tracing::warn!("Rejected request line: {:?}", fault.error);
                fault
            }
        };

        framed.send(serde_json::to_string(&response)?).await?;
    }
}
