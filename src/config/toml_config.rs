use crate::core::catalog::UnitCatalog;
use crate::core::UnitDefinition;
use crate::rpc::protocol::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_PORT};
use crate::rpc::ServerLimits;
use crate::utils::error::{ConvertError, Result};
use crate::utils::validation::{
    validate_host, validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration. Every section and key is optional.
///
/// ```toml
/// [rpc]
/// bind = "127.0.0.1"
/// port = 9090
///
/// [http]
/// enabled = true
/// port = 8080
///
/// [catalog]
/// extended = true
/// extensions_dir = "./extensions"
///
/// [[catalog.units]]
/// name = "ch"
/// millimetres = 20116.8
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub rpc: RpcConfig,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub bind: String,
    pub port: u16,
    pub max_connections: usize,
    pub max_line_length: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_connections: 64,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 是否載入內建擴充單位 (mm, km, mi, cu, my)
    pub extended: bool,
    pub extensions_dir: Option<PathBuf>,
    pub units: Vec<UnitDefinition>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            extended: true,
            extensions_dir: None,
            units: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub verbose: bool,
}

impl ServerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConvertError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CONVERT_PORT})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            ConvertError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc.bind, self.rpc.port)
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.bind, self.http.port)
    }

    pub fn server_limits(&self) -> ServerLimits {
        ServerLimits {
            max_connections: self.rpc.max_connections,
            max_line_length: self.rpc.max_line_length,
        }
    }

    /// Builds the unit catalog: built-ins, then `[[catalog.units]]`, then the
    /// extensions directory. Earlier sources win on name clashes.
    pub fn build_catalog(&self) -> Result<UnitCatalog> {
        let mut catalog = if self.catalog.extended {
            UnitCatalog::extended()
        } else {
            UnitCatalog::basic()
        };

        catalog.register_definitions(&self.catalog.units)?;

        if let Some(dir) = &self.catalog.extensions_dir {
            catalog.load_extensions_dir(dir)?;
        }

        tracing::info!("📐 Unit catalog ready with {} unit(s)", catalog.len());
        Ok(catalog)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_host("rpc.bind", &self.rpc.bind)?;
        validate_positive_number("rpc.max_connections", self.rpc.max_connections, 1)?;
        validate_range("rpc.max_line_length", self.rpc.max_line_length, 64, 16 * 1024 * 1024)?;

        if self.http.enabled {
            validate_host("http.bind", &self.http.bind)?;
            if self.http.port != 0 && self.http.port == self.rpc.port && self.http.bind == self.rpc.bind {
                return Err(ConvertError::InvalidConfigValueError {
                    field: "http.port".to_string(),
                    value: self.http.port.to_string(),
                    reason: "HTTP API and RPC service cannot share a port".to_string(),
                });
            }
        }

        if let Some(dir) = &self.catalog.extensions_dir {
            validate_non_empty_string("catalog.extensions_dir", &dir.to_string_lossy())?;
        }

        for unit in &self.catalog.units {
            crate::domain::model::Unit::try_from(unit)?;
        }

        Ok(())
    }
}
