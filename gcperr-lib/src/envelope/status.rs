use std::fmt::{self, Display};

use serde::{Deserialize, Serialize, ser::Error as _};
use serde_json::{Map, Value};
use thiserror::Error;

use super::ErrorReply;
use crate::detail::Detail;

/// Canonical RPC status codes (`google.rpc.Code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

const ALL_CODES: [Code; 17] = [
    Code::Ok,
    Code::Cancelled,
    Code::Unknown,
    Code::InvalidArgument,
    Code::DeadlineExceeded,
    Code::NotFound,
    Code::AlreadyExists,
    Code::PermissionDenied,
    Code::ResourceExhausted,
    Code::FailedPrecondition,
    Code::Aborted,
    Code::OutOfRange,
    Code::Unimplemented,
    Code::Internal,
    Code::Unavailable,
    Code::DataLoss,
    Code::Unauthenticated,
];

impl Code {
    /// Numeric value on the wire. Unknown numbers map to [`Code::Unknown`].
    pub fn from_i32(value: i32) -> Self {
        usize::try_from(value)
            .ok()
            .and_then(|i| ALL_CODES.get(i).copied())
            .unwrap_or(Self::Unknown)
    }

    /// Look up a code by its proto name, e.g. `"PERMISSION_DENIED"`.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_CODES.into_iter().find(|code| code.as_str() == name)
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed detail attachment in its JSON form:
/// `{"@type": "type.googleapis.com/google.rpc.ErrorInfo", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Any {
    #[serde(rename = "@type")]
    pub type_url: String,
    #[serde(flatten)]
    pub value: Map<String, Value>,
}

impl Any {
    /// Encode a detail, tagging it with its type url.
    pub fn pack<D: Detail>(detail: &D) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(detail)? {
            Value::Object(value) => Ok(Self {
                type_url: D::TYPE_URL.to_string(),
                value,
            }),
            _ => Err(serde_json::Error::custom(
                "detail must encode as a JSON object",
            )),
        }
    }

    /// Decode the payload as `D`, ignoring the type url.
    pub fn unpack<D: Detail>(&self) -> Result<D, serde_json::Error> {
        serde_json::from_value(Value::Object(self.value.clone()))
    }

    pub fn is<D: Detail>(&self) -> bool {
        self.type_url == D::TYPE_URL
    }
}

/// RPC error envelope (`google.rpc.Status`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
pub struct Status {
    /// Canonical code as sent on the wire; see [`Status::canonical_code`].
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Any>,
}

impl Status {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code: code.as_i32(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Append a detail attachment.
    pub fn with_detail(mut self, detail: Any) -> Self {
        self.details.push(detail);
        self
    }

    pub fn canonical_code(&self) -> Code {
        Code::from_i32(self.code)
    }

    /// First attachment tagged with `D`'s type url.
    pub fn find_detail<D: Detail>(&self) -> Option<&Any> {
        self.details.iter().find(|any| any.is::<D>())
    }

    /// Build the envelope from the JSON body of a failed HTTP call to an
    /// RPC-backed API.
    ///
    /// Only replies that name their RPC status (`"status": "NOT_FOUND"`)
    /// qualify; anything else is left to [`crate::GoogleApiError`]. Details
    /// without a `@type` tag are dropped.
    pub fn from_response_body(body: &str) -> Option<Self> {
        let reply = ErrorReply::parse(body)?;
        let code = Code::from_name(&reply.status)?;
        let details = reply
            .details
            .into_iter()
            .filter_map(|detail| serde_json::from_value::<Any>(detail).ok())
            .collect();
        Some(Self {
            code: code.as_i32(),
            message: reply.message,
            details,
        })
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rpc error: code = {} desc = {}",
            self.canonical_code(),
            self.message
        )
    }
}
