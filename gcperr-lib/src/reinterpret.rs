//! # Client-side reinterpretation (experimental)
//!
//! Turns a `google.rpc.ErrorInfo` into remediation hints using a small table
//! of known `(client, domain, reason, metadata key)` combinations. This is
//! not part of the default rendering path and is best-effort: no match means
//! no hints.

use std::fmt::{self, Display};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    detail::ErrorInfo,
    handler::{ErrorEnvelope, GcpError},
    util::indent_json,
};

/// The API client that produced the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    Storage,
    Compute,
    PubSub,
    Asset,
}

impl ClientKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Compute => "compute",
            Self::PubSub => "pubsub",
            Self::Asset => "asset",
        }
    }
}

impl Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_CLIENTS: &[ClientKind] = &[
    ClientKind::Storage,
    ClientKind::Compute,
    ClientKind::PubSub,
    ClientKind::Asset,
];

struct Rule {
    clients: &'static [ClientKind],
    domain: &'static str,
    reason: &'static str,
    key: &'static str,
    /// Matched against the metadata value; `${1}` in `hint` expands to
    /// the first capture group.
    value: Regex,
    hint: &'static str,
}

impl Rule {
    fn new(
        clients: &'static [ClientKind],
        domain: &'static str,
        reason: &'static str,
        key: &'static str,
        value: &str,
        hint: &'static str,
    ) -> Self {
        Self {
            clients,
            domain,
            reason,
            key,
            value: Regex::new(value).expect("reinterpretation pattern"),
            hint,
        }
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        Rule::new(
            &[ClientKind::PubSub],
            "googleapis.com",
            "USER_PROJECT_DENIED",
            "consumer",
            r"^projects/(.+)$",
            "The API call cannot bill its usage to project [${1}]. Grant the \
             `serviceusage.services.use` permission on that project to the calling principal",
        ),
        Rule::new(
            &[ClientKind::PubSub],
            "googleapis.com",
            "USER_PROJECT_DENIED",
            "service",
            r"^(pubsub\.googleapis\.com)$",
            "Billing for API [${1}] cannot be charged to the selected quota project",
        ),
        Rule::new(
            ALL_CLIENTS,
            "googleapis.com",
            "SERVICE_DISABLED",
            "service",
            r"^(.+\.googleapis\.com)$",
            "API [${1}] is not enabled on the consumer project. Enable it with \
             `gcloud services enable ${1}`",
        ),
        Rule::new(
            ALL_CLIENTS,
            "googleapis.com",
            "SERVICE_DISABLED",
            "consumer",
            r"^projects/(.+)$",
            "Enabling the API on project [${1}] requires the \
             `serviceusage.services.enable` permission",
        ),
        Rule::new(
            ALL_CLIENTS,
            "iam.googleapis.com",
            "IAM_PERMISSION_DENIED",
            "permission",
            r"^(.+)$",
            "The caller is missing the IAM permission [${1}] on the target resource",
        ),
    ];
}

/// Hints produced for one error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reinterpretation {
    #[serde(
        rename = "custom_error",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub hints: Vec<String>,
}

impl Reinterpretation {
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// `{"custom_error": [...]}` indented with tabs.
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        indent_json(&serde_json::to_string(self)?)
    }
}

/// Match `info` against the rule table for `client`.
///
/// Metadata is visited in key order, and every matching rule contributes
/// one hint.
pub fn reinterpret(info: &ErrorInfo, client: ClientKind) -> Reinterpretation {
    let mut hints = Vec::new();
    for (key, value) in &info.metadata {
        for rule in RULES.iter() {
            if rule.key != key.as_str()
                || rule.domain != info.domain
                || rule.reason != info.reason
                || !rule.clients.contains(&client)
            {
                continue;
            }
            if let Some(captures) = rule.value.captures(value) {
                let mut hint = String::new();
                captures.expand(rule.hint, &mut hint);
                hints.push(hint);
            }
        }
    }
    Reinterpretation { hints }
}

impl<E: ErrorEnvelope> GcpError<E> {
    /// Remediation hints for this error as seen from `client`.
    ///
    /// Empty when the error carries no decodable `ErrorInfo`.
    pub fn reinterpret(&self, client: ClientKind) -> Reinterpretation {
        match self.error_info() {
            Ok(info) => reinterpret(&info, client),
            Err(e) => {
                debug!(%client, error = %e, "reinterpreted error not available");
                Reinterpretation::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DetailConfig,
        envelope::{Any, Code, Status},
    };

    fn info(domain: &str, reason: &str, metadata: &[(&str, &str)]) -> ErrorInfo {
        ErrorInfo {
            domain: domain.into(),
            reason: reason.into(),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn every_rule_compiles() {
        assert_eq!(RULES.len(), 5);
    }

    #[test]
    fn user_project_denied_for_pubsub() {
        let info = info(
            "googleapis.com",
            "USER_PROJECT_DENIED",
            &[("consumer", "projects/my-quota"), ("service", "pubsub.googleapis.com")],
        );
        let result = reinterpret(&info, ClientKind::PubSub);
        assert_eq!(result.hints.len(), 2);
        assert!(result.hints[0].contains("project [my-quota]"));
        assert_eq!(
            result.hints[1],
            "Billing for API [pubsub.googleapis.com] cannot be charged to the selected quota project"
        );
    }

    #[test]
    fn other_clients_get_nothing_for_pubsub_rules() {
        let info = info(
            "googleapis.com",
            "USER_PROJECT_DENIED",
            &[("consumer", "projects/my-quota")],
        );
        assert!(reinterpret(&info, ClientKind::Storage).is_empty());
    }

    #[test]
    fn service_disabled_applies_to_every_client() {
        let info = info(
            "googleapis.com",
            "SERVICE_DISABLED",
            &[("service", "cloudasset.googleapis.com")],
        );
        for client in ALL_CLIENTS {
            let result = reinterpret(&info, *client);
            assert_eq!(
                result.hints,
                vec![
                    "API [cloudasset.googleapis.com] is not enabled on the consumer project. \
                     Enable it with `gcloud services enable cloudasset.googleapis.com`"
                        .to_string()
                ]
            );
        }
    }

    #[test]
    fn unmatched_values_yield_no_hint() {
        let info = info(
            "googleapis.com",
            "USER_PROJECT_DENIED",
            &[("consumer", "folders/42"), ("unrelated", "x")],
        );
        assert!(reinterpret(&info, ClientKind::PubSub).is_empty());
        assert!(reinterpret(&ErrorInfo::default(), ClientKind::PubSub).is_empty());
    }

    #[test]
    fn pretty_string_shape() {
        let result = Reinterpretation {
            hints: vec!["a".into()],
        };
        assert_eq!(
            result.to_pretty_string().unwrap(),
            "{\n\t\"custom_error\": [\n\t\t\"a\"\n\t]\n}"
        );
        assert_eq!(Reinterpretation::default().to_pretty_string().unwrap(), "{}");
    }

    #[test]
    fn wrapped_error_reinterpretation() {
        let denied = info(
            "iam.googleapis.com",
            "IAM_PERMISSION_DENIED",
            &[("permission", "pubsub.topics.list")],
        );
        let status = Status::new(Code::PermissionDenied, "denied")
            .with_detail(Any::pack(&denied).unwrap());
        let wrapped =
            GcpError::with_config(anyhow::Error::new(status), DetailConfig::default());
        let result = wrapped.reinterpret(ClientKind::PubSub);
        assert_eq!(result.hints.len(), 1);
        assert!(result.hints[0].contains("[pubsub.topics.list]"));

        let plain = GcpError::with_config(anyhow::anyhow!("disk full"), DetailConfig::default());
        assert!(plain.reinterpret(ClientKind::Storage).is_empty());
    }
}
