use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::environment::ResolvedConfig;
use crate::errors::{Error, Result};

/// How the service function is packaged and fronted.
///
/// `Container` ships the application as a container image behind a REST API
/// whose methods all require an API key. `Layered` ships it as a python runtime
/// function with dependency layers, leaves API keys optional on methods and
/// disables CDN caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentProfile {
    Container,
    Layered,
}

impl Default for DeploymentProfile {
    fn default() -> Self {
        DeploymentProfile::Container
    }
}

impl DeploymentProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentProfile::Container => "container",
            DeploymentProfile::Layered => "layered",
        }
    }

    pub fn api_key_required(&self) -> bool {
        matches!(self, DeploymentProfile::Container)
    }

    pub fn effective_cache_ttl(&self, config: &ResolvedConfig) -> u32 {
        match self {
            DeploymentProfile::Container => config.cache_ttl_seconds,
            DeploymentProfile::Layered => 0,
        }
    }

    pub fn includes_key_management(&self) -> bool {
        matches!(self, DeploymentProfile::Container)
    }
}

impl fmt::Display for DeploymentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "container" => Ok(DeploymentProfile::Container),
            "layered" => Ok(DeploymentProfile::Layered),
            _ => Err(Error::UnknownProfile(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::EnvironmentTag;

    #[test]
    fn test_cache_ttl_per_profile() {
        let prod = EnvironmentTag::Prod.resolve(true);
        assert_eq!(30, DeploymentProfile::Container.effective_cache_ttl(&prod));
        assert_eq!(0, DeploymentProfile::Layered.effective_cache_ttl(&prod));
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!(DeploymentProfile::Layered, "layered".parse().unwrap());
        assert_eq!(DeploymentProfile::Container, DeploymentProfile::default());
        assert!(matches!(
            "lambda".parse::<DeploymentProfile>(),
            Err(Error::UnknownProfile(_))
        ));
    }
}
