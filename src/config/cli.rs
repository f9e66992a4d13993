use crate::config::toml_config::ServerConfig;
use crate::rpc::client::{ClientOptions, DEFAULT_HOST};
use crate::rpc::protocol::DEFAULT_PORT;
use crate::utils::error::Result;
use crate::utils::validation::{validate_host, validate_range, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// One-shot converter: `length-convert 10 cm in m`
#[derive(Debug, Clone, Parser)]
#[command(name = "length-convert")]
#[command(about = "Convert a length between units, e.g. `length-convert 10 cm in m`")]
pub struct ConvertArgs {
    /// Expression in the form `<length> <unit> in <unit>`
    #[arg(allow_negative_numbers = true)]
    pub expression: Vec<String>,

    /// Include the extension units (mm, km, mi, cu, my)
    #[arg(long)]
    pub extended: bool,

    /// Server configuration file whose [catalog] section defines the units
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "convert_server")]
#[command(about = "Length conversion service (line-delimited JSON RPC + HTTP API)")]
pub struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long, env = "LENGTH_CONVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override [rpc] bind address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Override [rpc] port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override [http] port
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Disable the HTTP API
    #[arg(long)]
    pub no_http: bool,

    /// Emit JSON logs
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "convert_client")]
#[command(about = "Interactive client for the length conversion service")]
pub struct ClientArgs {
    #[arg(long, default_value = DEFAULT_HOST, env = "LENGTH_CONVERT_HOST")]
    pub host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "LENGTH_CONVERT_PORT")]
    pub port: u16,

    /// Convert a single expression and exit
    #[arg(long)]
    pub once: bool,

    /// Convert in-process instead of calling the service
    #[arg(long)]
    pub local: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerArgs {
    /// 載入設定檔 (若有) 並套用命令列覆蓋
    pub fn load_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                ServerConfig::from_file(path)?
            }
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.rpc.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.rpc.port = port;
        }
        if let Some(port) = self.http_port {
            config.http.port = port;
        }
        if self.no_http {
            config.http.enabled = false;
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if self.verbose {
            config.logging.verbose = true;
        }

        Ok(config)
    }
}

impl ClientArgs {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            request_timeout: Duration::from_secs(self.timeout),
            ..ClientOptions::default()
        }
    }
}

impl Validate for ClientArgs {
    fn validate(&self) -> Result<()> {
        validate_host("host", &self.host)?;
        validate_range("timeout", self.timeout, 1, 3600)?;
        Ok(())
    }
}
