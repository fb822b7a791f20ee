//! # Detail attachments
//!
//! Typed payloads carried in the `details` list of a
//! [`Status`](crate::Status), in their protobuf JSON form
//! (lowerCamelCase names, empty fields omitted).
//!
//! Each type implements [`Detail`], which ties it to its type url.

mod duration;

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A payload that can appear in the `details` list of a status.
pub trait Detail: Serialize + DeserializeOwned {
    /// e.g. `type.googleapis.com/google.rpc.Help`
    const TYPE_URL: &'static str;
}

macro_rules! detail {
    ($ty:ident, $name:literal) => {
        impl Detail for $ty {
            const TYPE_URL: &'static str =
                concat!("type.googleapis.com/google.rpc.", $name);
        }
    };
}

/// Links to documentation for the failing call (`google.rpc.Help`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Help {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub description: String,
    pub url: String,
}

/// Cause of the error with structured metadata (`google.rpc.ErrorInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorInfo {
    /// UPPER_SNAKE_CASE reason, unique within `domain`
    pub reason: String,
    /// Usually the service name, e.g. `pubsub.googleapis.com`
    pub domain: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Quota checks that failed (`google.rpc.QuotaFailure`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaFailure {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<QuotaViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaViolation {
    pub subject: String,
    pub description: String,
}

/// Server-side debugging data (`google.rpc.DebugInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugInfo {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stack_entries: Vec<String>,
    pub detail: String,
}

/// How long the client should wait before retrying (`google.rpc.RetryInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryInfo {
    #[serde(
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub retry_delay: Option<Duration>,
}

/// Preconditions that were not met (`google.rpc.PreconditionFailure`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreconditionFailure {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<PreconditionViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreconditionViolation {
    /// Service-specific precondition type, e.g. `TOS`
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub description: String,
}

/// Invalid request fields (`google.rpc.BadRequest`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BadRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_violations: Vec<FieldViolation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldViolation {
    /// Path to the field, e.g. `analysis_query.scope`
    pub field: String,
    pub description: String,
}

/// Request identification for bug reports (`google.rpc.RequestInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestInfo {
    pub request_id: String,
    pub serving_data: String,
}

/// The resource being accessed (`google.rpc.ResourceInfo`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceInfo {
    pub resource_type: String,
    pub resource_name: String,
    pub owner: String,
    pub description: String,
}

/// Translated error message (`google.rpc.LocalizedMessage`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizedMessage {
    pub locale: String,
    pub message: String,
}

detail!(Help, "Help");
detail!(ErrorInfo, "ErrorInfo");
detail!(QuotaFailure, "QuotaFailure");
detail!(DebugInfo, "DebugInfo");
detail!(RetryInfo, "RetryInfo");
detail!(PreconditionFailure, "PreconditionFailure");
detail!(BadRequest, "BadRequest");
detail!(RequestInfo, "RequestInfo");
detail!(ResourceInfo, "ResourceInfo");
detail!(LocalizedMessage, "LocalizedMessage");

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn type_urls() {
        assert_eq!(Help::TYPE_URL, "type.googleapis.com/google.rpc.Help");
        assert_eq!(
            PreconditionFailure::TYPE_URL,
            "type.googleapis.com/google.rpc.PreconditionFailure"
        );
        assert_eq!(
            LocalizedMessage::TYPE_URL,
            "type.googleapis.com/google.rpc.LocalizedMessage"
        );
    }

    #[test]
    fn decodes_camel_case_fields() {
        let bad: BadRequest = serde_json::from_value(json!({
            "fieldViolations": [
                { "field": "analysis_query.scope", "description": "scope is required" }
            ]
        }))
        .unwrap();
        assert_eq!(bad.field_violations[0].field, "analysis_query.scope");

        let debug: DebugInfo = serde_json::from_value(json!({
            "stackEntries": ["frame 1", "frame 2"],
            "detail": "boom"
        }))
        .unwrap();
        assert_eq!(debug.stack_entries.len(), 2);
        assert_eq!(debug.detail, "boom");
    }

    #[test]
    fn retry_delay_uses_protobuf_duration() {
        let retry: RetryInfo =
            serde_json::from_value(json!({ "retryDelay": "2.5s" })).unwrap();
        assert_eq!(retry.retry_delay, Some(Duration::from_millis(2500)));
        assert_eq!(
            serde_json::to_value(&retry).unwrap(),
            json!({ "retryDelay": "2.5s" })
        );

        assert!(
            serde_json::from_value::<RetryInfo>(json!({ "retryDelay": 5 }))
                .is_err()
        );
    }

    #[test]
    fn precondition_type_field() {
        let failure: PreconditionFailure = serde_json::from_value(json!({
            "violations": [{ "type": "TOS", "subject": "google.com/cloud", "description": "not accepted" }]
        }))
        .unwrap();
        assert_eq!(failure.violations[0].kind, "TOS");
    }

    #[test]
    fn missing_fields_decode_empty() {
        let info: ErrorInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info, ErrorInfo::default());
        let retry: RetryInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(retry.retry_delay, None);
    }
}
