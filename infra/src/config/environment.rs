//! Per-environment sizing and feature selection.
//!
//! Everything that differs between `dev`, `stg` and `prod` is decided here, once,
//! from the environment tag and whether an alert email was supplied. The stack
//! builder only reads the resulting [`ResolvedConfig`].

use std::fmt;
use std::str::FromStr;

use enumflags2::{bitflags, BitFlags};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const FUNCTION_TIMEOUT_SECONDS: u32 = 30;
pub const PROVISIONED_CONCURRENCY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentTag {
    Dev,
    Stg,
    Prod,
}

impl EnvironmentTag {
    pub const ALL: [EnvironmentTag; 3] = [EnvironmentTag::Dev, EnvironmentTag::Stg, EnvironmentTag::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentTag::Dev => "dev",
            EnvironmentTag::Stg => "stg",
            EnvironmentTag::Prod => "prod",
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, EnvironmentTag::Prod)
    }

    /// Function log level handed to the application through its environment.
    pub fn log_level(&self) -> &'static str {
        if self.is_prod() {
            "info"
        } else {
            "debug"
        }
    }

    /// API Gateway stage data tracing logs full payloads, never in prod.
    pub fn data_trace_enabled(&self) -> bool {
        !self.is_prod()
    }

    /// Requests per 5 minute window per client IP before the WAF blocks.
    pub fn waf_rate_limit(&self) -> u32 {
        if self.is_prod() {
            1000
        } else {
            500
        }
    }

    pub fn resolve(self, alert_email_present: bool) -> ResolvedConfig {
        let (memory_size_mb, rate_limit, burst_limit, quota_limit, cache_ttl_seconds) = match self {
            EnvironmentTag::Dev => (512, 50, 25, 5_000, 5),
            EnvironmentTag::Stg => (1024, 100, 50, 10_000, 10),
            EnvironmentTag::Prod => (2048, 500, 100, 1_000_000, 30),
        };

        ResolvedConfig {
            environment: self,
            memory_size_mb,
            timeout_seconds: FUNCTION_TIMEOUT_SECONDS,
            provisioned_concurrency: if self.is_prod() {
                Some(PROVISIONED_CONCURRENCY)
            } else {
                None
            },
            log_retention_days: if self.is_prod() { 30 } else { 14 },
            rate_limit,
            burst_limit,
            quota_limit,
            cache_ttl_seconds,
            price_class_all: self.is_prod(),
            waf_enabled: !matches!(self, EnvironmentTag::Dev),
            alarms_enabled: self.is_prod() && alert_email_present,
        }
    }
}

impl fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(EnvironmentTag::Dev),
            "stg" => Ok(EnvironmentTag::Stg),
            "prod" => Ok(EnvironmentTag::Prod),
            _ => Err(Error::UnknownEnvironment(s.to_string())),
        }
    }
}

#[bitflags]
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Feature {
    Waf = 0b0001,
    Alarms = 0b0010,
    ProvisionedConcurrency = 0b0100,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Waf => "waf",
            Feature::Alarms => "alarms",
            Feature::ProvisionedConcurrency => "provisioned-concurrency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub environment: EnvironmentTag,
    pub memory_size_mb: u32,
    pub timeout_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioned_concurrency: Option<u32>,
    pub log_retention_days: u32,
    pub rate_limit: u32,
    pub burst_limit: u32,
    pub quota_limit: u64,
    pub cache_ttl_seconds: u32,
    pub price_class_all: bool,
    pub waf_enabled: bool,
    pub alarms_enabled: bool,
}

impl ResolvedConfig {
    pub fn features(&self) -> BitFlags<Feature> {
        let mut features = BitFlags::empty();
        if self.waf_enabled {
            features |= Feature::Waf;
        }
        if self.alarms_enabled {
            features |= Feature::Alarms;
        }
        if self.provisioned_concurrency.is_some() {
            features |= Feature::ProvisionedConcurrency;
        }
        features
    }

    pub fn price_class(&self) -> &'static str {
        if self.price_class_all {
            "PriceClass_All"
        } else {
            "PriceClass_100"
        }
    }
}

/// Resolves the deployment configuration for `tag`.
///
/// A blank alert email counts as absent. Any tag other than `dev`, `stg` or
/// `prod` is rejected with [`Error::UnknownEnvironment`]; there is no fallback.
pub fn resolve(tag: &str, alert_email: Option<&str>) -> Result<ResolvedConfig> {
    let environment = EnvironmentTag::from_str(tag)?;
    let alert_email_present = alert_email.map_or(false, |email| !email.trim().is_empty());
    let resolved = environment.resolve(alert_email_present);
    log::debug!("resolved configuration for {}: {:?}", environment, resolved);
    Ok(resolved)
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod environment_tests;
