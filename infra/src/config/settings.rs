use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::str::FromStr;

use config::{Config, File, FileFormat};
use fancy_regex::Regex;
use heck::CamelCase;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::config::environment::{self, EnvironmentTag, ResolvedConfig};
use crate::config::profile::DeploymentProfile;
use crate::errors::{Error, Result};

pub const DEFAULT_ENVIRONMENT: &str = "dev";
pub const DEFAULT_SERVICE: &str = "backlog-mcp";
pub const DEFAULT_PROJECT_TAG: &str = "BacklogMCP";
pub const DEFAULT_MANAGED_BY_TAG: &str = "backlog-mcp-infra";
pub const DEFAULT_REGION: &str = "ap-northeast-1";

const API_KEY_PLACEHOLDER: &str = "YOUR_BACKLOG_API_KEY_PLACEHOLDER";
const SPACE_PLACEHOLDER: &str = "YOUR_BACKLOG_SPACE_PLACEHOLDER";
const PROJECT_PLACEHOLDER: &str = "YOUR_BACKLOG_PROJECT_PLACEHOLDER";

// process environment variable -> settings key
const ENVIRONMENT_VARIABLES: [(&str, &str); 9] = [
    ("ENVIRONMENT", "environment"),
    ("ALERT_EMAIL", "alert_email"),
    ("CDK_DEFAULT_ACCOUNT", "account"),
    ("CDK_DEFAULT_REGION", "region"),
    ("BACKLOG_API_KEY", "backlog.api_key"),
    ("BACKLOG_SPACE", "backlog.space"),
    ("BACKLOG_PROJECT", "backlog.project"),
    ("BACKLOG_DISABLE_SSL_VERIFY", "backlog.disable_ssl_verify"),
    ("READ_ONLY_MODE", "backlog.read_only_mode"),
];

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .ok()
            .unwrap();
    static ref SERVICE_NAME: Regex = Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").ok().unwrap();
}

/// Values the application itself reads at runtime. Only the layered profile
/// passes them to the function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BacklogSettings {
    pub api_key: String,
    pub space: String,
    pub project: String,
    pub read_only_mode: String,
    pub disable_ssl_verify: String,
}

impl Default for BacklogSettings {
    fn default() -> Self {
        BacklogSettings {
            api_key: String::from(API_KEY_PLACEHOLDER),
            space: String::from(SPACE_PLACEHOLDER),
            project: String::from(PROJECT_PLACEHOLDER),
            read_only_mode: String::from("False"),
            disable_ssl_verify: String::from("false"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploymentSettings {
    pub environment: String,
    #[serde(default)]
    pub alert_email: Option<String>,
    pub service: String,
    pub profile: String,
    #[serde(default)]
    pub account: Option<String>,
    pub region: String,
    pub project_tag: String,
    pub managed_by_tag: String,
    #[serde(default)]
    pub backlog: BacklogSettings,
}

#[derive(Debug, Clone)]
pub enum SettingsSource<'a> {
    Defaults,
    File(&'a Path),
    Toml(String),
}

/// Values given explicitly on the command line. They win over every other source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub environment: Option<String>,
    pub alert_email: Option<String>,
    pub profile: Option<String>,
    pub service: Option<String>,
}

/// Picks the variables `load` recognises out of `vars`. Unrelated entries and
/// values that are not valid UTF-8 are skipped.
pub fn settings_variables<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| {
            let name = name.into_string().ok()?;
            if !ENVIRONMENT_VARIABLES.iter().any(|(var, _)| *var == name) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((name, value)),
                Err(_) => {
                    log::warn!("ignoring environment variable {} as it is not valid UTF-8", name);
                    None
                }
            }
        })
        .collect()
}

impl DeploymentSettings {
    /// Loads settings from, lowest precedence first, built-in defaults, the
    /// settings `source`, the process environment `vars` and `overrides`.
    pub fn load(
        source: SettingsSource<'_>,
        vars: &HashMap<String, String>,
        overrides: &Overrides,
    ) -> Result<DeploymentSettings> {
        let mut builder = Config::builder()
            .set_default("environment", DEFAULT_ENVIRONMENT)?
            .set_default("service", DEFAULT_SERVICE)?
            .set_default("profile", DeploymentProfile::default().as_str())?
            .set_default("project_tag", DEFAULT_PROJECT_TAG)?
            .set_default("managed_by_tag", DEFAULT_MANAGED_BY_TAG)?
            .set_default("region", DEFAULT_REGION)?;

        builder = match source {
            SettingsSource::Defaults => builder,
            SettingsSource::File(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFoundError(path.display().to_string()));
                }
                log::debug!("reading deployment settings from {}", path.display());
                builder.add_source(File::from(path).required(true))
            }
            SettingsSource::Toml(content) => {
                log::debug!("reading deployment settings from payload");
                builder.add_source(File::from_str(&content, FileFormat::Toml))
            }
        };

        for (var, key) in ENVIRONMENT_VARIABLES.iter() {
            if let Some(value) = vars.get(*var) {
                log::debug!("{} taken from environment variable {}", key, var);
                builder = builder.set_override(*key, value.as_str())?;
            }
        }

        let explicit = [
            ("environment", &overrides.environment),
            ("alert_email", &overrides.alert_email),
            ("profile", &overrides.profile),
            ("service", &overrides.service),
        ];
        for (key, value) in explicit.iter() {
            if let Some(value) = value {
                builder = builder.set_override(*key, value.as_str())?;
            }
        }

        let settings: DeploymentSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.environment_tag()?;
        self.deployment_profile()?;

        if !SERVICE_NAME.is_match(&self.service).unwrap_or(false) {
            return Err(Error::IllegalArguments(format!(
                "Service name `{}` must be lower case words separated by dashes",
                self.service
            )));
        }

        if let Some(email) = self.alert_email() {
            if !EMAIL.is_match(email).unwrap_or(false) {
                return Err(Error::InvalidAlertEmail(email.to_string()));
            }
        }

        Ok(())
    }

    pub fn environment_tag(&self) -> Result<EnvironmentTag> {
        EnvironmentTag::from_str(&self.environment)
    }

    pub fn deployment_profile(&self) -> Result<DeploymentProfile> {
        DeploymentProfile::from_str(&self.profile)
    }

    pub fn alert_email(&self) -> Option<&str> {
        self.alert_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    pub fn resolve(&self) -> Result<ResolvedConfig> {
        environment::resolve(&self.environment, self.alert_email())
    }

    pub fn account(&self) -> Option<&str> {
        self.account
            .as_deref()
            .map(str::trim)
            .filter(|account| !account.is_empty())
    }

    /// Region the stack deploys to. Blank values fall back to the default region.
    pub fn region(&self) -> &str {
        match self.region.trim() {
            "" => DEFAULT_REGION,
            region => region,
        }
    }

    pub fn stack_name(&self) -> String {
        format!("{}Stack-{}", self.service.to_camel_case(), self.environment)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod settings_tests;
