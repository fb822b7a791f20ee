//! # Error classifier and formatter
//!
//! [`GcpError`] wraps the error returned by an API call, works out which
//! envelope it carries and renders it. The plain error text is returned
//! unless details are enabled, either through [`DetailConfig`] or by asking
//! for pretty printing.
//!
//! ### Example
//! ```rust
//! use gcperr_lib::{Code, DetailConfig, GcpError, Status};
//!
//! let err = anyhow::Error::new(Status::new(Code::NotFound, "no such topic"));
//! let wrapped = GcpError::with_config(err, DetailConfig::default());
//! assert!(wrapped.is_status_error());
//! assert_eq!(wrapped.render(), "rpc error: code = NOT_FOUND desc = no such topic");
//!
//! let wrapped = wrapped.pretty_print(true);
//! assert!(wrapped.render().starts_with("google.rpc.Status: {\n\t\"code\": 5"));
//! ```

use std::{
    error::Error as StdError,
    fmt::{self, Debug, Display},
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::DetailConfig,
    detail::{
        BadRequest, DebugInfo, Detail, ErrorInfo, Help, LocalizedMessage,
        PreconditionFailure, QuotaFailure, RequestInfo, ResourceInfo,
        RetryInfo,
    },
    envelope::{GoogleApiError, Status},
    error::HandlerError,
    util::indent_json,
};

const GOOGLE_API_ERROR: &str = "googleapi.Error";
const RPC_STATUS: &str = "google.rpc.Status";

/// Capability of an error value to expose one of the known envelopes.
///
/// Both methods default to `None`, so any error type can opt in to the
/// shapes it actually carries.
pub trait ErrorEnvelope: Display + Debug {
    fn google_api_error(&self) -> Option<&GoogleApiError> {
        None
    }

    fn status(&self) -> Option<&Status> {
        None
    }
}

impl ErrorEnvelope for GoogleApiError {
    fn google_api_error(&self) -> Option<&GoogleApiError> {
        Some(self)
    }
}

impl ErrorEnvelope for Status {
    fn status(&self) -> Option<&Status> {
        Some(self)
    }
}

/// Looks through the whole cause chain, so envelopes wrapped with
/// `.context(..)` are still found.
impl ErrorEnvelope for anyhow::Error {
    fn google_api_error(&self) -> Option<&GoogleApiError> {
        self.chain().find_map(|cause| cause.downcast_ref())
    }

    fn status(&self) -> Option<&Status> {
        self.chain().find_map(|cause| cause.downcast_ref())
    }
}

impl ErrorEnvelope for Box<dyn StdError + Send + Sync> {
    fn google_api_error(&self) -> Option<&GoogleApiError> {
        find_cause(self.as_ref())
    }

    fn status(&self) -> Option<&Status> {
        find_cause(self.as_ref())
    }
}

fn find_cause<'a, T: StdError + 'static>(
    err: &'a (dyn StdError + 'static),
) -> Option<&'a T> {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(found) = cause.downcast_ref::<T>() {
            return Some(found);
        }
        current = cause.source();
    }
    None
}

/// An API error together with its classification and display settings.
#[derive(Debug)]
pub struct GcpError<E = anyhow::Error> {
    err: E,
    config: DetailConfig,
    is_google_api_error: bool,
    is_status_error: bool,
}

impl<E: ErrorEnvelope> GcpError<E> {
    /// Wrap `err`, reading the detail switch from the environment.
    pub fn new(err: E) -> Self {
        Self::with_config(err, DetailConfig::from_env())
    }

    /// Wrap `err` with an explicit detail switch.
    pub fn with_config(err: E, config: DetailConfig) -> Self {
        let is_google_api_error = err.google_api_error().is_some();
        let is_status_error = err.status().is_some();
        if is_google_api_error && is_status_error {
            warn!(error = %err, "error matches both googleapi.Error and google.rpc.Status");
        } else {
            debug!(is_google_api_error, is_status_error, "classified error");
        }
        Self {
            err,
            config,
            is_google_api_error,
            is_status_error,
        }
    }

    pub fn pretty_print(mut self, pretty: bool) -> Self {
        self.config.pretty_print = pretty;
        self
    }

    pub fn is_google_api_error(&self) -> bool {
        self.is_google_api_error
    }

    pub fn is_status_error(&self) -> bool {
        self.is_status_error
    }

    /// Both envelopes matched. Rendering refuses to pick one.
    pub fn is_ambiguous(&self) -> bool {
        self.is_google_api_error && self.is_status_error
    }

    pub fn details_enabled(&self) -> bool {
        self.config.details_enabled()
    }

    pub fn config(&self) -> DetailConfig {
        self.config
    }

    pub fn inner(&self) -> &E {
        &self.err
    }

    pub fn into_inner(self) -> E {
        self.err
    }

    /// Render the error for display.
    ///
    /// Never fails: if a formatting step breaks, the message says so and
    /// embeds the original error.
    pub fn render(&self) -> String {
        self.render_with(self.config)
    }

    /// Render under different settings without rewrapping the error.
    pub fn render_with(&self, config: DetailConfig) -> String {
        if !config.details_enabled() {
            return self.err.to_string();
        }
        if self.is_ambiguous() {
            return HandlerError::AmbiguousEnvelope {
                original: self.err.to_string(),
            }
            .to_string();
        }

        if self.is_status_error {
            if let Some(status) = self.err.status() {
                return match self.encode(RPC_STATUS, status, config) {
                    Ok(text) => format!("{RPC_STATUS}: {text}"),
                    Err(e) => e.to_string(),
                };
            }
        } else if self.is_google_api_error {
            if let Some(gerr) = self.err.google_api_error() {
                return match self.encode(GOOGLE_API_ERROR, gerr, config) {
                    Ok(text) if config.pretty_print => format!(
                        "{GOOGLE_API_ERROR}: {text}\n{GOOGLE_API_ERROR}.Body:\n{}",
                        gerr.body
                    ),
                    Ok(text) => format!("{GOOGLE_API_ERROR}: {text}"),
                    Err(e) => e.to_string(),
                };
            }
        }

        self.err.to_string()
    }

    fn encode<T: Serialize>(
        &self,
        envelope: &'static str,
        value: &T,
        config: DetailConfig,
    ) -> Result<String, HandlerError> {
        let raw = serde_json::to_string(value).map_err(|source| {
            HandlerError::SerializationError {
                envelope,
                source,
                original: self.err.to_string(),
            }
        })?;
        if !config.pretty_print {
            return Ok(raw);
        }
        indent_json(&raw).map_err(|source| HandlerError::PrettyPrintError {
            envelope,
            source,
            raw,
        })
    }

    /// The REST envelope, if the wrapped error carries one.
    pub fn google_api_error(&self) -> Result<&GoogleApiError, HandlerError> {
        self.err
            .google_api_error()
            .ok_or(HandlerError::NotGoogleApiError)
    }

    /// The RPC envelope, if the wrapped error carries one.
    pub fn status(&self) -> Result<&Status, HandlerError> {
        self.err.status().ok_or(HandlerError::NotStatusError)
    }

    /// Decode the first attachment of type `D`.
    ///
    /// The status is looked up again on every call; the cached
    /// classification is not consulted.
    pub fn detail<D: Detail>(&self) -> Result<D, HandlerError> {
        let any = self.status()?.find_detail::<D>().ok_or(
            HandlerError::DetailNotPresent {
                type_url: D::TYPE_URL,
            },
        )?;
        any.unpack().map_err(|source| {
            debug!(type_url = D::TYPE_URL, %source, "could not decode detail");
            HandlerError::DecodeError {
                type_url: D::TYPE_URL,
                source,
            }
        })
    }

    pub fn help(&self) -> Result<Help, HandlerError> {
        self.detail()
    }

    pub fn error_info(&self) -> Result<ErrorInfo, HandlerError> {
        self.detail()
    }

    pub fn quota_failure(&self) -> Result<QuotaFailure, HandlerError> {
        self.detail()
    }

    pub fn debug_info(&self) -> Result<DebugInfo, HandlerError> {
        self.detail()
    }

    pub fn retry_info(&self) -> Result<RetryInfo, HandlerError> {
        self.detail()
    }

    pub fn precondition_failure(
        &self,
    ) -> Result<PreconditionFailure, HandlerError> {
        self.detail()
    }

    pub fn bad_request(&self) -> Result<BadRequest, HandlerError> {
        self.detail()
    }

    pub fn request_info(&self) -> Result<RequestInfo, HandlerError> {
        self.detail()
    }

    pub fn resource_info(&self) -> Result<ResourceInfo, HandlerError> {
        self.detail()
    }

    pub fn localized_message(&self) -> Result<LocalizedMessage, HandlerError> {
        self.detail()
    }
}

impl<E: ErrorEnvelope> Display for GcpError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<E: ErrorEnvelope> StdError for GcpError<E> {}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{Context as _, anyhow};
    use http::HeaderMap;
    use serde_json::json;

    use super::*;
    use crate::{
        detail::{FieldViolation, Link, QuotaViolation},
        envelope::{Any, Code, ErrorItem},
    };

    fn off() -> DetailConfig {
        DetailConfig::default()
    }

    fn on() -> DetailConfig {
        DetailConfig::default().with_details(true)
    }

    fn forbidden() -> GoogleApiError {
        GoogleApiError {
            code: 403,
            message: "forbidden".into(),
            errors: vec![ErrorItem {
                reason: "forbidden".into(),
                message: "forbidden".into(),
                ..Default::default()
            }],
            body: "{\"error\":{\"code\":403,\"message\":\"forbidden\"}}".into(),
            ..Default::default()
        }
    }

    fn denied() -> Status {
        let info = ErrorInfo {
            domain: "example.com".into(),
            reason: "DENIED".into(),
            metadata: [("consumer".to_string(), "projects/123".to_string())]
                .into(),
        };
        Status::new(Code::PermissionDenied, "denied")
            .with_detail(Any::pack(&info).unwrap())
    }

    /// Strip whitespace outside of string literals.
    fn strip_layout(text: &str) -> String {
        let mut out = String::new();
        let (mut in_string, mut escaped) = (false, false);
        for c in text.chars() {
            if in_string {
                out.push(c);
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
            } else if c == '"' {
                in_string = true;
                out.push(c);
            } else if !c.is_whitespace() {
                out.push(c);
            }
        }
        out
    }

    #[derive(Debug)]
    struct Both(GoogleApiError, Status);

    impl Display for Both {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("both at once")
        }
    }

    impl ErrorEnvelope for Both {
        fn google_api_error(&self) -> Option<&GoogleApiError> {
            Some(&self.0)
        }

        fn status(&self) -> Option<&Status> {
            Some(&self.1)
        }
    }

    #[test]
    fn plain_error_renders_unchanged() {
        let wrapped = GcpError::with_config(anyhow!("disk full"), off());
        assert!(!wrapped.is_google_api_error());
        assert!(!wrapped.is_status_error());
        assert_eq!(wrapped.render(), "disk full");

        let wrapped = GcpError::with_config(anyhow!("disk full"), on());
        assert_eq!(wrapped.render(), "disk full");
        assert_eq!(wrapped.to_string(), "disk full");
    }

    #[test]
    fn plain_error_has_no_envelope() {
        let wrapped = GcpError::with_config(anyhow!("disk full"), on());
        assert!(matches!(
            wrapped.google_api_error(),
            Err(HandlerError::NotGoogleApiError)
        ));
        assert!(matches!(wrapped.help(), Err(HandlerError::NotStatusError)));
    }

    #[test]
    fn details_off_renders_envelope_display() {
        let wrapped = GcpError::with_config(anyhow::Error::new(forbidden()), off());
        assert!(wrapped.is_google_api_error());
        assert_eq!(wrapped.render(), "googleapi: Error 403: forbidden, forbidden");
    }

    #[test]
    fn google_api_error_compact() {
        let wrapped = GcpError::with_config(anyhow::Error::new(forbidden()), on());
        let text = wrapped.render();
        assert!(text.starts_with(
            r#"googleapi.Error: {"code":403,"message":"forbidden","errors":[{"reason":"forbidden","message":"forbidden"}],"body":"#
        ));
        assert!(!text.contains("googleapi.Error.Body:"));
    }

    #[test]
    fn google_api_error_pretty_appends_body() {
        let wrapped =
            GcpError::with_config(anyhow::Error::new(forbidden()), off())
                .pretty_print(true);
        let text = wrapped.render();
        assert!(text.starts_with("googleapi.Error: {\n\t\"code\": 403,\n\t\"message\": \"forbidden\""));
        assert!(text.contains("\n\t\"errors\": [\n\t\t{\n\t\t\t\"reason\": \"forbidden\""));
        assert!(text.ends_with(
            "\ngoogleapi.Error.Body:\n{\"error\":{\"code\":403,\"message\":\"forbidden\"}}"
        ));
    }

    #[test]
    fn status_compact_and_pretty() {
        let compact = GcpError::with_config(anyhow::Error::new(denied()), on()).render();
        assert_eq!(
            compact,
            r#"google.rpc.Status: {"code":7,"message":"denied","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"DENIED","domain":"example.com","metadata":{"consumer":"projects/123"}}]}"#
        );

        let pretty = GcpError::with_config(anyhow::Error::new(denied()), off())
            .pretty_print(true)
            .render();
        assert!(pretty.starts_with("google.rpc.Status: {\n\t\"code\": 7,"));
        assert!(pretty.contains("\n\t\t\t\"metadata\": {\n\t\t\t\t\"consumer\": \"projects/123\"\n\t\t\t}"));
    }

    #[test]
    fn pretty_output_matches_compact_content() {
        for err in [anyhow::Error::new(denied()), anyhow::Error::new(forbidden())] {
            let compact = GcpError::with_config(err, on());
            let compact_text = compact.render();
            let pretty_text = compact.pretty_print(true).render();

            let structured = pretty_text
                .split("\ngoogleapi.Error.Body:\n")
                .next()
                .unwrap();
            assert_eq!(strip_layout(structured), strip_layout(&compact_text));
        }
    }

    #[test]
    fn pretty_print_overrides_disabled_switch() {
        let wrapped =
            GcpError::with_config(anyhow::Error::new(denied()), off()).pretty_print(true);
        assert!(wrapped.details_enabled());
        assert!(wrapped.render().starts_with("google.rpc.Status:"));
    }

    #[test]
    fn render_with_leaves_config_alone() {
        let wrapped = GcpError::with_config(anyhow::Error::new(forbidden()), off());
        let pretty = wrapped.render_with(off().with_pretty_print(true));
        assert!(pretty.contains("googleapi.Error.Body:"));
        assert_eq!(wrapped.config(), off());
        assert_eq!(wrapped.render(), "googleapi: Error 403: forbidden, forbidden");
    }

    #[test]
    fn envelope_found_behind_context() {
        let err = Err::<(), _>(denied())
            .context("listing topics")
            .unwrap_err();
        let wrapped = GcpError::with_config(err, on());
        assert!(wrapped.is_status_error());
        assert_eq!(wrapped.render().split(':').next(), Some("google.rpc.Status"));
        assert_eq!(wrapped.error_info().unwrap().reason, "DENIED");
    }

    #[test]
    fn boxed_errors_are_classified() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(forbidden());
        let wrapped = GcpError::with_config(boxed, on());
        assert!(wrapped.is_google_api_error());
        assert!(!wrapped.is_status_error());
    }

    #[test]
    fn error_info_scenario() {
        let wrapped = GcpError::with_config(anyhow::Error::new(denied()), off());
        let info = wrapped.error_info().unwrap();
        assert_eq!(info.domain, "example.com");
        assert_eq!(info.reason, "DENIED");
        assert_eq!(info.metadata.len(), 1);
        assert_eq!(info.metadata["consumer"], "projects/123");
    }

    #[test]
    fn lookups_are_repeatable() {
        let wrapped = GcpError::with_config(anyhow::Error::new(denied()), off());
        let first = wrapped.error_info().unwrap();
        let second = wrapped.error_info().unwrap();
        assert_eq!(first, second);
        assert_eq!(wrapped.status().unwrap(), &denied());
    }

    #[test]
    fn missing_detail_is_not_a_decode_error() {
        let empty = GcpError::with_config(
            anyhow::Error::new(Status::new(Code::NotFound, "gone")),
            off(),
        );
        assert!(matches!(
            empty.help(),
            Err(HandlerError::DetailNotPresent { type_url })
                if type_url == Help::TYPE_URL
        ));

        let wrapped = GcpError::with_config(anyhow::Error::new(denied()), off());
        for result in [
            wrapped.help().map(|_| ()),
            wrapped.quota_failure().map(|_| ()),
            wrapped.debug_info().map(|_| ()),
            wrapped.retry_info().map(|_| ()),
            wrapped.precondition_failure().map(|_| ()),
            wrapped.bad_request().map(|_| ()),
            wrapped.request_info().map(|_| ()),
            wrapped.resource_info().map(|_| ()),
            wrapped.localized_message().map(|_| ()),
        ] {
            assert!(matches!(result, Err(HandlerError::DetailNotPresent { .. })));
        }
    }

    #[test]
    fn malformed_detail_is_a_decode_error() {
        let any: Any = serde_json::from_value(json!({
            "@type": "type.googleapis.com/google.rpc.RetryInfo",
            "retryDelay": "soon"
        }))
        .unwrap();
        let status = Status::new(Code::Unavailable, "try later").with_detail(any);
        let wrapped = GcpError::with_config(anyhow::Error::new(status), off());
        assert!(matches!(
            wrapped.retry_info(),
            Err(HandlerError::DecodeError { type_url, .. })
                if type_url == RetryInfo::TYPE_URL
        ));
    }

    #[test]
    fn every_detail_kind_decodes() {
        let status = Status::new(Code::ResourceExhausted, "quota")
            .with_detail(
                Any::pack(&Help {
                    links: vec![Link {
                        description: "quota docs".into(),
                        url: "https://cloud.google.com/docs/quota".into(),
                    }],
                })
                .unwrap(),
            )
            .with_detail(
                Any::pack(&QuotaFailure {
                    violations: vec![QuotaViolation {
                        subject: "project:123".into(),
                        description: "daily limit".into(),
                    }],
                })
                .unwrap(),
            )
            .with_detail(
                Any::pack(&RetryInfo {
                    retry_delay: Some(Duration::from_secs(30)),
                })
                .unwrap(),
            )
            .with_detail(
                Any::pack(&BadRequest {
                    field_violations: vec![FieldViolation {
                        field: "name".into(),
                        description: "too long".into(),
                    }],
                })
                .unwrap(),
            );
        let wrapped = GcpError::with_config(anyhow::Error::new(status), off());

        assert_eq!(wrapped.help().unwrap().links[0].url, "https://cloud.google.com/docs/quota");
        assert_eq!(wrapped.quota_failure().unwrap().violations[0].subject, "project:123");
        assert_eq!(
            wrapped.retry_info().unwrap().retry_delay,
            Some(Duration::from_secs(30))
        );
        assert_eq!(wrapped.bad_request().unwrap().field_violations[0].field, "name");
    }

    #[test]
    fn unknown_attachments_are_ignored() {
        let any: Any = serde_json::from_value(json!({
            "@type": "type.googleapis.com/example.Custom",
            "anything": [1, 2, 3]
        }))
        .unwrap();
        let status = denied().with_detail(any);
        let wrapped = GcpError::with_config(anyhow::Error::new(status), on());
        assert!(wrapped.error_info().is_ok());
        assert!(matches!(wrapped.help(), Err(HandlerError::DetailNotPresent { .. })));
    }

    #[test]
    fn ambiguous_envelope_is_reported() {
        let wrapped = GcpError::with_config(Both(forbidden(), denied()), on());
        assert!(wrapped.is_ambiguous());
        assert_eq!(
            wrapped.render(),
            "error matches both googleapi.Error and google.rpc.Status: both at once"
        );
        assert_eq!(wrapped.error_info().unwrap().reason, "DENIED");

        let quiet = GcpError::with_config(Both(forbidden(), denied()), off());
        assert_eq!(quiet.render(), "both at once");
    }

    #[test]
    fn into_inner_returns_original() {
        let wrapped = GcpError::with_config(forbidden(), off());
        assert_eq!(wrapped.inner().code, 403);
        let headers: HeaderMap = wrapped.into_inner().headers;
        assert!(headers.is_empty());
    }
}
