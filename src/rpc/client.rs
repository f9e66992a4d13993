use crate::core::ConversionService;
use crate::rpc::protocol::{Reply, Request, Response, DEFAULT_MAX_LINE_LENGTH};
use crate::utils::error::{ConvertError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_util::codec::{Framed, LinesCodec};

pub const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_line_length: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Client side of the conversion service: one request in flight at a time.
/// Replies to requests that already timed out are skipped by the next call.
pub struct ConvertClient<T = TcpStream> {
    framed: Framed<T, LinesCodec>,
    next_id: u64,
    options: ClientOptions,
}

impl ConvertClient<TcpStream> {
    pub async fn connect<A: ToSocketAddrs>(addr: A, options: ClientOptions) -> Result<Self> {
        let stream = with_timeout("connect", options.connect_timeout, TcpStream::connect(addr))
            .await??;
        stream.set_nodelay(true)?;
        if let Ok(peer) = stream.peer_addr() {
            tracing::debug!("Connected to conversion service at {}", peer);
        }
        Ok(Self::from_transport(stream, options))
    }

}

impl<T> ConvertClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_transport(io: T, options: ClientOptions) -> Self {
        Self {
            framed: Framed::new(io, LinesCodec::new_with_max_length(options.max_line_length)),
            next_id: 1,
            options,
        }
    }

    pub async fn available_units(&mut self) -> Result<Vec<String>> {
        let id = self.allocate_id();
        match self.call(Request::AvailableUnits { id }).await? {
            Reply::Units(units) => Ok(units),
            Reply::Text(_) => Err(ConvertError::ProtocolError {
                message: "available_units answered with text instead of a unit list".to_string(),
            }),
        }
    }

    pub async fn convert(&mut self, input: &str) -> Result<String> {
        let id = self.allocate_id();
        let request = Request::Convert {
            id,
            input: input.to_string(),
        };
        match self.call(request).await? {
            Reply::Text(text) => Ok(text),
            Reply::Units(_) => Err(ConvertError::ProtocolError {
                message: "convert answered with a unit list instead of text".to_string(),
            }),
        }
    }

    /// 關閉寫入端，讓伺服器看到 EOF
    pub async fn close(mut self) -> Result<()> {
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn call(&mut self, request: Request) -> Result<Reply> {
        let id = request.id();
        let method = request.method();
        let timeout = self.options.request_timeout;
        let line = serde_json::to_string(&request)?;

        let framed = &mut self.framed;
        let exchange = async move {
            framed.send(line).await?;
            loop {
                let reply = framed.next().await.ok_or(ConvertError::ConnectionClosed)??;
                let response = serde_json::from_str::<Response>(&reply)?;
                // 先前逾時的請求遲到的回覆
                if response.id < id {
                    tracing::debug!("Discarding late reply to request {}", response.id);
                    continue;
                }
                return Ok::<_, ConvertError>(response);
            }
        };
        let response = with_timeout(method, timeout, exchange).await??;

        if response.id != id {
            return Err(ConvertError::ProtocolError {
                message: format!("expected response id {}, got {}", id, response.id),
            });
        }

        response.into_result().map_err(|fault| ConvertError::RemoteError {
            kind: fault.kind.to_string(),
            message: fault.message,
        })
    }
}

async fn with_timeout<F: Future>(operation: &str, after: Duration, fut: F) -> Result<F::Output> {
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| ConvertError::TimeoutError {
            operation: operation.to_string(),
            after,
        })
}

/// [`ConversionService`] backed by a remote conversion service.
pub struct RemoteService<T = TcpStream> {
    client: Mutex<ConvertClient<T>>,
}

impl<T> RemoteService<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(client: ConvertClient<T>) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    pub async fn close(self) -> Result<()> {
        self.client.into_inner().close().await
    }
}

#[async_trait]
impl<T> ConversionService for RemoteService<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn available_units(&self) -> Result<Vec<String>> {
        self.client.lock().await.available_units().await
    }

    async fn convert(&self, input: &str) -> Result<String> {
        self.client.lock().await.convert(input).await
    }
}
