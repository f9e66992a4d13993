pub mod client;
pub mod protocol;
pub mod server;

pub use client::{ClientOptions, ConvertClient, RemoteService};
pub use protocol::{Fault, FaultKind, Reply, Request, Response};
pub use server::{ConvertHandler, RpcServer, ServerLimits};
