use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unknown input format: '{unit}'")]
    UnknownInputUnit { unit: String },

    #[error("Unknown output format: '{unit}'")]
    UnknownOutputUnit { unit: String },

    #[error("Invalid unit definition '{name}': {reason}")]
    InvalidUnitError { name: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Line codec error: {0}")]
    CodecError(#[from] tokio_util::codec::LinesCodecError),

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Remote fault ({kind}): {message}")]
    RemoteError { kind: String, message: String },

    #[error("{operation} timed out after {after:?}")]
    TimeoutError { operation: String, after: Duration },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Conversion,
    Network,
    Protocol,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::UnknownInputUnit { .. }
            | ConvertError::UnknownOutputUnit { .. }
            | ConvertError::InvalidUnitError { .. } => ErrorCategory::Conversion,
            ConvertError::TimeoutError { .. } | ConvertError::ConnectionClosed => {
                ErrorCategory::Network
            }
            ConvertError::SerializationError(_)
            | ConvertError::CodecError(_)
            | ConvertError::ProtocolError { .. }
            | ConvertError::RemoteError { .. } => ErrorCategory::Protocol,
            ConvertError::ConfigValidationError { .. }
            | ConvertError::InvalidConfigValueError { .. }
            | ConvertError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ConvertError::IoError(e) => match e.kind() {
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::TimedOut => ErrorCategory::Network,
                _ => ErrorCategory::System,
            },
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conversion => ErrorSeverity::Low,
            // 網路問題通常重試即可
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Protocol | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 退出碼: Low 0, Medium 2, High 1, Critical 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ConvertError::UnknownInputUnit { .. } | ConvertError::UnknownOutputUnit { .. } => {
                "Ask the service for its available units and use one of those names".to_string()
            }
            ConvertError::InvalidUnitError { .. } => {
                "Unit names must be non-empty without spaces, and millimetres a positive number"
                    .to_string()
            }
            ConvertError::TimeoutError { .. } => {
                "Check that the service is running and reachable, or raise --timeout".to_string()
            }
            ConvertError::ConnectionClosed => {
                "The server went away; restart it and reconnect".to_string()
            }
            ConvertError::IoError(_) => match self.category() {
                ErrorCategory::Network => {
                    "Make sure convert_server is running on the given host and port".to_string()
                }
                _ => "Check file paths and permissions".to_string(),
            },
            ConvertError::SerializationError(_)
            | ConvertError::CodecError(_)
            | ConvertError::ProtocolError { .. } => {
                "Client and server versions may not match; upgrade both".to_string()
            }
            ConvertError::RemoteError { .. } => "Inspect the server logs for details".to_string(),
            ConvertError::ConfigValidationError { field, .. }
            | ConvertError::InvalidConfigValueError { field, .. }
            | ConvertError::MissingConfigError { field } => {
                format!("Fix the '{}' setting in the configuration file", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ConvertError::UnknownInputUnit { unit } => format!("'{}' is not a known unit", unit),
            ConvertError::UnknownOutputUnit { unit } => format!("'{}' is not a known unit", unit),
            ConvertError::TimeoutError { operation, .. } => {
                format!("The conversion service did not answer ({})", operation)
            }
            ConvertError::ConnectionClosed => "Lost connection to the conversion service".into(),
            ConvertError::IoError(_) if self.category() == ErrorCategory::Network => {
                format!("Could not talk to the conversion service: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
