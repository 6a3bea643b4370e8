pub mod environment;
pub mod profile;
pub mod settings;

pub use environment::{resolve, EnvironmentTag, Feature, ResolvedConfig};
pub use profile::DeploymentProfile;
pub use settings::{settings_variables, DeploymentSettings, Overrides, SettingsSource};
