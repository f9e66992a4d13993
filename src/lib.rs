pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod rpc;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "cli")]
pub use config::{ClientArgs, ConvertArgs, ServerArgs};

pub use app::{Session, SessionMode};
pub use config::ServerConfig;
pub use crate::core::{
    catalog::UnitCatalog, converter::LengthConverter, parser::InputParser, service::LocalService,
    ConversionService, ConvertLengths,
};
pub use rpc::{ConvertClient, ConvertHandler, RemoteService, RpcServer};
pub use utils::error::{ConvertError, Result};
