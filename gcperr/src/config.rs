use std::{fs, path::Path};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    consts::EXE_DIR,
    sdk::Api,
};

pub const DEFAULT_CONFIG_FILE: &str = "gcperr.toml";
pub const DEFAULT_ZONE: &str = "us-central1-a";
pub const DEFAULT_OBJECT: &str = "foo.txt";

/// Options as read from the command line or from a TOML file.
///
/// Every field is optional here; [`Settings::resolve`] applies the
/// defaults and checks what each API needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Options {
    pub project: Option<String>,
    pub zone: Option<String>,
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub topic: Option<String>,
    pub quota_project: Option<String>,
    pub scope: Option<String>,
    pub resource: Option<String>,
    pub identity: Option<String>,
    pub token: Option<String>,
}

impl Options {
    /// Option names accepted after `--` on the command line.
    pub const KEYS: [&'static str; 10] = [
        "project",
        "zone",
        "bucket",
        "object",
        "topic",
        "quota-project",
        "scope",
        "resource",
        "identity",
        "token",
    ];

    /// Mutable slot for a command line key, `None` for unknown keys.
    pub fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            "project" => &mut self.project,
            "zone" => &mut self.zone,
            "bucket" => &mut self.bucket,
            "object" => &mut self.object,
            "topic" => &mut self.topic,
            "quota-project" => &mut self.quota_project,
            "scope" => &mut self.scope,
            "resource" => &mut self.resource,
            "identity" => &mut self.identity,
            "token" => &mut self.token,
            _ => return None,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Fill every unset field from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            project: self.project.or(fallback.project),
            zone: self.zone.or(fallback.zone),
            bucket: self.bucket.or(fallback.bucket),
            object: self.object.or(fallback.object),
            topic: self.topic.or(fallback.topic),
            quota_project: self.quota_project.or(fallback.quota_project),
            scope: self.scope.or(fallback.scope),
            resource: self.resource.or(fallback.resource),
            identity: self.identity.or(fallback.identity),
            token: self.token.or(fallback.token),
        }
    }
}

/// Load the configuration file given with `--config`, or `gcperr.toml`
/// next to the executable when it exists.
pub fn load_file(explicit: Option<&Path>) -> Result<Options> {
    if let Some(path) = explicit {
        return Options::read(path);
    }
    let path = EXE_DIR.join(DEFAULT_CONFIG_FILE);
    if path.is_file() {
        debug!(path = %path.display(), "using configuration file");
        Options::read(&path)
    } else {
        Ok(Options::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Missing required option `--{0}`")]
    MissingOption(&'static str),
    #[error("No access token, pass `--token` or set GOOGLE_OAUTH_ACCESS_TOKEN")]
    MissingToken,
}

/// Fully resolved options for one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api: Api,
    pub project: String,
    pub zone: String,
    pub bucket: String,
    pub object: String,
    pub topic: String,
    pub quota_project: Option<String>,
    pub scope: String,
    pub resource: String,
    pub identity: String,
    pub token: String,
}

impl Settings {
    /// Apply defaults, the token from `env_token` when none is given, and
    /// check the options `api` needs.
    pub fn resolve(
        api: Api,
        options: Options,
        env_token: Option<String>,
    ) -> Result<Self, SettingsError> {
        let required: &[&'static str] = match api {
            Api::Gcs => &["bucket"],
            Api::Compute => &["project"],
            Api::PubSub => &["project", "topic"],
            Api::Asset => &["scope", "resource", "identity"],
        };
        let mut options = options;
        for key in required {
            let present = options
                .slot(key)
                .is_some_and(|value| value.as_deref().is_some_and(|v| !v.is_empty()));
            if !present {
                return Err(SettingsError::MissingOption(*key));
            }
        }

        let token = options
            .token
            .or(env_token)
            .filter(|token| !token.is_empty())
            .ok_or(SettingsError::MissingToken)?;

        Ok(Self {
            api,
            project: options.project.unwrap_or_default(),
            zone: options.zone.unwrap_or_else(|| DEFAULT_ZONE.to_string()),
            bucket: options.bucket.unwrap_or_default(),
            object: options.object.unwrap_or_else(|| DEFAULT_OBJECT.to_string()),
            topic: options.topic.unwrap_or_default(),
            quota_project: options.quota_project.filter(|p| !p.is_empty()),
            scope: options.scope.unwrap_or_default(),
            resource: options.resource.unwrap_or_default(),
            identity: options.identity.unwrap_or_default(),
            token,
        })
    }
}
