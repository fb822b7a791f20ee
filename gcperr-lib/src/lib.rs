//! # gcperr Library
//!
//! Classify and pretty-print errors returned by Google Cloud API clients.
//!
//! An API failure may carry one of two machine-readable envelopes:
//!
//! |      Envelope       |                     Contents                      |
//! | :-----------------: | :-----------------------------------------------: |
//! |  `googleapi.Error`  | HTTP code, message, sub-errors, raw response body |
//! | `google.rpc.Status` |  canonical code, message, typed detail payloads   |
//!
//! Wrap the error in a [`GcpError`] to render it or to pull typed details
//! ([`detail::ErrorInfo`], [`detail::RetryInfo`], ...) out of it. Detail
//! rendering is opt-in through [`GOOGLE_ENABLE_ERROR_DETAIL`] or pretty
//! printing.

pub mod client;
mod config;
pub use config::*;
pub mod detail;
mod envelope;
pub use envelope::*;
mod error;
pub use error::*;
mod handler;
pub use handler::*;
pub mod reinterpret;
pub use reinterpret::{ClientKind, Reinterpretation};
#[doc(hidden)]
pub(crate) mod util;
