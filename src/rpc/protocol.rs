//! Wire format of the conversion service.
//!
//! One JSON document per line in each direction. A client sends a [`Request`]
//! and reads back exactly one [`Response`] carrying the same `id`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default TCP port of the conversion service.
pub const DEFAULT_PORT: u16 = 9090;

/// Default upper bound for a single protocol line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    AvailableUnits { id: u64 },
    Convert { id: u64, input: String },
}

impl Request {
    pub fn id(&self) -> u64 {
        match self {
            Request::AvailableUnits { id } | Request::Convert { id, .. } => *id,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Request::AvailableUnits { .. } => "available_units",
            Request::Convert { .. } => "convert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Units(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    ParseError,
    UnknownMethod,
    InternalError,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultKind::ParseError => "parse_error",
            FaultKind::UnknownMethod => "unknown_method",
            FaultKind::InternalError => "internal_error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Reply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Fault>,
}

impl Response {
    pub fn ok(id: u64, reply: Reply) -> Self {
        Self {
            id,
            result: Some(reply),
            error: None,
        }
    }

    pub fn fault(id: u64, kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(Fault {
                kind,
                message: message.into(),
            }),
        }
    }

    /// A response must carry exactly one of `result` / `error`.
    pub fn into_result(self) -> Result<Reply, Fault> {
        match (self.result, self.error) {
            (_, Some(fault)) => Err(fault),
            (Some(reply), None) => Ok(reply),
            (None, None) => Err(Fault {
                kind: FaultKind::InternalError,
                message: "response carries neither result nor error".to_string(),
            }),
        }
    }
}

/// Decodes a request line. Failures come back as the fault response to send,
/// keeping the caller's `id` whenever the line was at least a JSON object.
pub fn decode_request(line: &str) -> Result<Request, Response> {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => Ok(request),
        Err(e) => {
            let value = serde_json::from_str::<serde_json::Value>(line).ok();
            let id = value
                .as_ref()
                .and_then(|v| v.get("id"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            let method = value
                .as_ref()
                .and_then(|v| v.get("method"))
                .and_then(|v| v.as_str())
                .map(str::to_string);

            Err(match method {
                Some(m) if m != "available_units" && m != "convert" => Response::fault(
                    id,
                    FaultKind::UnknownMethod,
                    format!("Unknown method '{}'", m),
                ),
                _ => Response::fault(id, FaultKind::ParseError, e.to_string()),
            })
        }
    }
}
