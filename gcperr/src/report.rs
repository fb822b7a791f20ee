use std::fmt::Display;

use cnxt::Colorize;
use gcperr_lib::{ClientKind, DetailConfig, GcpError};
use unicode_width::UnicodeWidthStr;

const SEPARATOR: &str = "------------------------------------";

/// Everything the library can tell about `error`, section by section.
///
/// The default rendering follows the configuration the error was wrapped
/// with; the detailed and pretty renderings force their own.
#[must_use]
pub fn explain(
    error: &GcpError,
    client: ClientKind,
    color: bool,
) -> Vec<String> {
    let mut content: Vec<String> = Vec::new();

    section(&mut content, "Plain error", color);
    content.push(error.inner().to_string());

    section(&mut content, "Default rendering", color);
    content.push(error.render());

    section(&mut content, "Rendering with details", color);
    content.push(error.render_with(DetailConfig::default().with_details(true)));

    section(&mut content, "Pretty rendering", color);
    content.push(
        error.render_with(DetailConfig::default().with_pretty_print(true)),
    );

    if let Ok(gerr) = error.google_api_error() {
        section(&mut content, "googleapi.Error", color);
        let mut rows = vec![
            ("Code", gerr.code.to_string()),
            ("Message", gerr.message.clone()),
        ];
        rows.extend(gerr.errors.iter().map(|item| ("Reason", item.reason.clone())));
        content.extend(field_rows(&rows, color));
    }

    if error.is_status_error() {
        explain_details(&mut content, error, color);
    }

    let hints = error.reinterpret(client);
    if !hints.is_empty() {
        section(&mut content, "Reinterpreted", color);
        match hints.to_pretty_string() {
            Ok(pretty) => content.push(pretty),
            Err(e) => content.push(e.to_string().bright_red_if(color).to_string()),
        }
    }

    content
}

fn explain_details(content: &mut Vec<String>, error: &GcpError, color: bool) {
    section(content, "google.rpc.Help", color);
    push_rows(content, error.help().map(|help| {
        help.links
            .into_iter()
            .flat_map(|link| [("Description", link.description), ("Url", link.url)])
            .collect()
    }), color);

    section(content, "google.rpc.BadRequest", color);
    push_rows(content, error.bad_request().map(|bad_request| {
        bad_request
            .field_violations
            .into_iter()
            .flat_map(|v| [("Field", v.field), ("Description", v.description)])
            .collect()
    }), color);

    section(content, "google.rpc.ErrorInfo", color);
    push_rows(content, error.error_info().map(|info| {
        let mut rows = vec![("Domain", info.domain), ("Reason", info.reason)];
        rows.extend(
            info.metadata
                .into_iter()
                .map(|(key, value)| ("Metadata", format!("{key} = {value}"))),
        );
        rows
    }), color);

    section(content, "google.rpc.QuotaFailure", color);
    push_rows(content, error.quota_failure().map(|failure| {
        failure
            .violations
            .into_iter()
            .flat_map(|v| [("Subject", v.subject), ("Description", v.description)])
            .collect()
    }), color);

    section(content, "google.rpc.RetryInfo", color);
    push_rows(content, error.retry_info().map(|retry| {
        retry
            .retry_delay
            .map(|delay| vec![("Retry delay", format!("{delay:?}"))])
            .unwrap_or_default()
    }), color);
}

fn section(content: &mut Vec<String>, title: &str, color: bool) {
    if !content.is_empty() {
        content.push(SEPARATOR.bright_black_if(color).to_string());
    }
    content.push(format!("{}:", title.bright_green_if(color)));
}

fn push_rows<E: Display>(
    content: &mut Vec<String>,
    rows: Result<Vec<(&str, String)>, E>,
    color: bool,
) {
    match rows {
        Ok(rows) => content.extend(field_rows(&rows, color)),
        Err(e) => content.push(format!("  {}", e.to_string().bright_red_if(color))),
    }
}

fn field_rows(rows: &[(&str, String)], color: bool) -> Vec<String> {
    let indent_width =
        rows.iter().map(|(label, _)| label.width()).max().unwrap_or(0) + 2;
    rows.iter()
        .map(|(label, value)| {
            format!(
                "{} | {}",
                calc_indent_content(label, indent_width).bright_green_if(color),
                value
            )
        })
        .collect()
}

fn calc_indent_content(content: &str, indent_width: usize) -> String {
    format!(
        "{}{}",
        " ".repeat(indent_width.saturating_sub(content.width())),
        content
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gcperr_lib::{
        Any, Code, GoogleApiError, Status,
        detail::{ErrorInfo, RetryInfo},
    };

    use super::*;

    fn wrap(err: anyhow::Error) -> GcpError {
        GcpError::with_config(err, DetailConfig::default())
    }

    #[test]
    fn plain_error_has_no_detail_sections() {
        let lines = explain(&wrap(anyhow::anyhow!("disk full")), ClientKind::Storage, false);
        assert_eq!(
            lines,
            vec![
                "Plain error:",
                "disk full",
                SEPARATOR,
                "Default rendering:",
                "disk full",
                SEPARATOR,
                "Rendering with details:",
                "disk full",
                SEPARATOR,
                "Pretty rendering:",
                "disk full",
            ]
        );
    }

    #[test]
    fn google_api_error_rows() {
        let gerr = GoogleApiError {
            code: 403,
            message: "forbidden".into(),
            body: "{}".into(),
            ..GoogleApiError::default()
        };
        let lines = explain(&wrap(gerr.into()), ClientKind::Compute, false);
        let at = lines.iter().position(|l| l == "googleapi.Error:").unwrap();
        assert_eq!(lines[at + 1], "     Code | 403");
        assert_eq!(lines[at + 2], "  Message | forbidden");
        assert!(!lines.iter().any(|l| l == "google.rpc.Help:"));
    }

    #[test]
    fn status_details_and_hints() {
        let info = ErrorInfo {
            reason: "SERVICE_DISABLED".into(),
            domain: "googleapis.com".into(),
            metadata: [("service".to_string(), "pubsub.googleapis.com".to_string())]
                .into_iter()
                .collect(),
        };
        let retry = RetryInfo {
            retry_delay: Some(Duration::from_secs(3)),
        };
        let status = Status::new(Code::PermissionDenied, "disabled")
            .with_detail(Any::pack(&info).unwrap())
            .with_detail(Any::pack(&retry).unwrap());
        let lines = explain(&wrap(status.into()), ClientKind::PubSub, false);

        let help = lines.iter().position(|l| l == "google.rpc.Help:").unwrap();
        assert_eq!(
            lines[help + 1],
            "  google.rpc.Status does not include type.googleapis.com/google.rpc.Help"
        );
        assert!(lines.contains(&"    Domain | googleapis.com".to_string()));
        assert!(lines.contains(&"  Metadata | service = pubsub.googleapis.com".to_string()));
        assert!(lines.contains(&"  Retry delay | 3s".to_string()));

        let hints = lines.iter().position(|l| l == "Reinterpreted:").unwrap();
        assert!(lines[hints + 1].starts_with("{\n\t\"custom_error\": [\n"));
    }
}
