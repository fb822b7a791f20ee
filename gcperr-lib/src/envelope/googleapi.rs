use std::fmt::{self, Display};

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::ErrorReply;

/// REST error envelope (`googleapi.Error`).
///
/// `body` keeps the raw response text; it usually overlaps with the
/// structured fields but is not guaranteed to match them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Error)]
pub struct GoogleApiError {
    /// HTTP status code
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Value>,
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
    #[serde(default)]
    pub body: String,
    /// Response headers. Never serialized.
    #[serde(skip)]
    pub headers: HeaderMap,
}

/// A single entry of the `errors` list of a REST error reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        rename = "locationType",
        skip_serializing_if = "Option::is_none"
    )]
    pub location_type: Option<String>,
}

impl GoogleApiError {
    /// Build the envelope from a failed HTTP response.
    ///
    /// The raw body is always kept. Structured fields are filled in when the
    /// body is a `{"error": {...}}` reply; otherwise only the HTTP status
    /// code is set.
    pub fn from_response(
        status: u16,
        headers: HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let mut error = Self {
            code: status,
            headers,
            ..Default::default()
        };
        if let Some(reply) = ErrorReply::parse(&body) {
            if reply.code != 0 {
                error.code = reply.code;
            }
            error.message = reply.message;
            error.errors = reply.errors;
            error.details = reply.details;
        }
        error.body = body;
        error
    }
}

impl Display for GoogleApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() && self.message.is_empty() {
            return write!(
                f,
                "googleapi: got HTTP response code {} with body: {}",
                self.code, self.body
            );
        }
        write!(f, "googleapi: Error {}: {}", self.code, self.message)?;
        match self.errors.as_slice() {
            [] => Ok(()),
            [only] if only.message == self.message => {
                write!(f, ", {}", only.reason)
            }
            errors => {
                write!(f, "\nMore details:")?;
                for item in errors {
                    write!(
                        f,
                        "\nReason: {}, Message: {}",
                        item.reason, item.message
                    )?;
                }
                Ok(())
            }
        }
    }
}
