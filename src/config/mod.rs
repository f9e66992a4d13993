#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{ClientArgs, ConvertArgs, ServerArgs};
pub use toml_config::ServerConfig;
