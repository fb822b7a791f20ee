//! # Detail switch
//!
//! Structured detail rendering is opt-in so verbose diagnostic payloads
//! are not printed by default. The switch is read from
//! [`GOOGLE_ENABLE_ERROR_DETAIL`] unless the caller supplies it.

use std::env;

/// Environment variable that enables rendering of the embedded details.
pub const GOOGLE_ENABLE_ERROR_DETAIL: &str = "GOOGLE_ENABLE_ERROR_DETAIL";

/// Construction options for [`crate::GcpError`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailConfig {
    /// Render the structured envelope instead of the plain error text.
    pub enable_details: bool,
    /// Reindent the rendered envelope. Implies `enable_details`.
    pub pretty_print: bool,
}

impl DetailConfig {
    /// Read [`GOOGLE_ENABLE_ERROR_DETAIL`] from the process environment.
    ///
    /// A missing or unparseable value disables details.
    pub fn from_env() -> Self {
        Self {
            enable_details: env::var(GOOGLE_ENABLE_ERROR_DETAIL)
                .ok()
                .as_deref()
                .is_some_and(|value| parse_bool(value).unwrap_or(false)),
            pretty_print: false,
        }
    }

    pub fn with_details(mut self, enable: bool) -> Self {
        self.enable_details = enable;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Whether structured rendering is active.
    pub fn details_enabled(&self) -> bool {
        self.pretty_print || self.enable_details
    }
}

/// Parse the boolean spellings accepted for the detail switch.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_spellings() {
        for v in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(v), Some(true), "{v}");
        }
        for v in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(v), Some(false), "{v}");
        }
        for v in ["", "yes", "on", "tRUE", " true"] {
            assert_eq!(parse_bool(v), None, "{v}");
        }
    }

    #[test]
    fn pretty_print_implies_details() {
        let config = DetailConfig::default().with_pretty_print(true);
        assert!(!config.enable_details);
        assert!(config.details_enabled());

        let config = config.with_details(true);
        assert!(config.details_enabled());
    }

    #[test]
    fn default_is_disabled() {
        assert!(!DetailConfig::default().details_enabled());
    }
}
