//! # Error envelopes
//!
//! The two machine-readable shapes an API failure can carry:
//! - [`GoogleApiError`], the REST `googleapi.Error` envelope
//! - [`Status`], the RPC `google.rpc.Status` envelope with typed details

mod googleapi;
mod status;

pub use googleapi::*;
pub use status::*;

use serde::Deserialize;
use serde_json::Value;

/// `{"error": {...}}` body returned by Google REST endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorReply {
    pub(crate) error: ErrorReplyBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorReplyBody {
    pub(crate) code: u16,
    pub(crate) message: String,
    pub(crate) status: String,
    pub(crate) errors: Vec<ErrorItem>,
    pub(crate) details: Vec<Value>,
}

impl ErrorReply {
    pub(crate) fn parse(body: &str) -> Option<ErrorReplyBody> {
        serde_json::from_str::<Self>(body).ok().map(|reply| reply.error)
    }
}
