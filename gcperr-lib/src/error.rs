//! # Error types for gcperr
//!
//! Every failure the formatter can report while inspecting a wrapped error.
//! None of these are fatal: lookups hand them back to the caller, and
//! rendering folds them into the display string together with the
//! original error so no information is lost.

use thiserror::Error;

/// Error returned while classifying, rendering or extracting details
/// from a wrapped API error.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The wrapped error is not a `googleapi.Error` envelope.
    #[error("error is not a googleapi.Error")]
    NotGoogleApiError,

    /// The wrapped error is not a `google.rpc.Status` envelope.
    #[error("error is not a google.rpc.Status")]
    NotStatusError,

    /// The status carries no attachment with the requested type url.
    #[error("google.rpc.Status does not include {type_url}")]
    DetailNotPresent { type_url: &'static str },

    /// An attachment with the requested type url exists but its payload
    /// does not match the expected shape.
    #[error("could not decode {type_url}: {source}")]
    DecodeError {
        type_url: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope could not be encoded as JSON text.
    #[error("could not serialize {envelope} [{source}]: [{original}]")]
    SerializationError {
        envelope: &'static str,
        #[source]
        source: serde_json::Error,
        original: String,
    },

    /// The JSON text could not be reindented. `raw` holds the compact text.
    #[error("{envelope}: could not pretty-print [{source}]: {raw}")]
    PrettyPrintError {
        envelope: &'static str,
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// The wrapped error claims to be both envelope kinds at once.
    #[error("error matches both googleapi.Error and google.rpc.Status: {original}")]
    AmbiguousEnvelope { original: String },
}

impl HandlerError {
    /// Stable machine-readable code, e.g. `"DETAIL_NOT_PRESENT"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotGoogleApiError => "NOT_GOOGLE_API_ERROR",
            Self::NotStatusError => "NOT_STATUS_ERROR",
            Self::DetailNotPresent { .. } => "DETAIL_NOT_PRESENT",
            Self::DecodeError { .. } => "DECODE_ERROR",
            Self::SerializationError { .. } => "SERIALIZATION_ERROR",
            Self::PrettyPrintError { .. } => "PRETTY_PRINT_ERROR",
            Self::AmbiguousEnvelope { .. } => "AMBIGUOUS_ENVELOPE",
        }
    }
}
