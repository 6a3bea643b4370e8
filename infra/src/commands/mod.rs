pub mod completions;
pub mod resolve;
pub mod synth;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches};

use crate::config::{settings_variables, DeploymentSettings, Overrides, SettingsSource};
use crate::errors::Result;
use crate::utils::reader::Reader;

//
// Constants
//
// Application metadata
pub const APP_NAME: &str = "backlog-mcp-infra";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
// Commands
pub const RESOLVE: &str = "resolve";
pub const SYNTH: &str = "synth";
pub const COMPLETIONS: &str = "completions";
// Global arguments
pub const VERBOSE: (&str, char) = ("verbose", 'v');
// Arguments for resolve, synth
pub const ENVIRONMENT: (&str, char) = ("environment", 'e');
pub const ALERT_EMAIL: (&str, char) = ("alert-email", 'a');
pub const SETTINGS: (&str, char) = ("settings", 's');
pub const PAYLOAD: (&str, char) = ("payload", 'P');
// Arguments for resolve
pub const OUTPUT_FORMAT: (&str, char) = ("output-format", 'o');
// Arguments for synth
pub const PROFILE: (&str, char) = ("profile", 'p');
pub const SERVICE: &str = "service";
pub const OUTPUT: (&str, char) = ("output", 'O');
pub const PRINT_YAML: (&str, char) = ("print-yaml", 'y');
pub const SHOW_SUMMARY: (&str, char) = ("show-summary", 'S');

pub const SUCCESS_STATUS_CODE: i32 = 0;

/// Where commands take the environment variable layer of the settings from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Variables {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl Variables {
    fn collect(&self) -> HashMap<String, String> {
        match self {
            Variables::Process => settings_variables(std::env::vars_os()),
            Variables::Fixed(vars) => vars.clone(),
        }
    }
}

/// Adds the arguments every command resolving deployment settings accepts.
pub(crate) fn with_settings_args(command: clap::Command) -> clap::Command {
    command
        .arg(
            Arg::new(ENVIRONMENT.0)
                .long(ENVIRONMENT.0)
                .short(ENVIRONMENT.1)
                .action(ArgAction::Set)
                .help("Deployment environment, one of dev, stg, prod. Overrides ENVIRONMENT"),
        )
        .arg(
            Arg::new(ALERT_EMAIL.0)
                .long(ALERT_EMAIL.0)
                .short(ALERT_EMAIL.1)
                .action(ArgAction::Set)
                .help("Address notified by prod alarms. Overrides ALERT_EMAIL"),
        )
        .arg(
            Arg::new(SETTINGS.0)
                .long(SETTINGS.0)
                .short(SETTINGS.1)
                .action(ArgAction::Set)
                .conflicts_with(PAYLOAD.0)
                .help("Read deployment settings from a TOML, YAML or JSON file"),
        )
        .arg(
            Arg::new(PAYLOAD.0)
                .long(PAYLOAD.0)
                .short(PAYLOAD.1)
                .action(ArgAction::SetTrue)
                .help("Read deployment settings as TOML from stdin"),
        )
}

/// Explicit command line values, the highest precedence settings source.
pub(crate) fn overrides(app: &ArgMatches) -> Overrides {
    let value = |id: &str| {
        app.try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(String::to_string)
    };
    Overrides {
        environment: value(ENVIRONMENT.0),
        alert_email: value(ALERT_EMAIL.0),
        profile: value(PROFILE.0),
        service: value(SERVICE),
    }
}

pub(crate) fn load_settings(
    app: &ArgMatches,
    reader: &mut Reader,
    variables: &Variables,
) -> Result<DeploymentSettings> {
    let vars = variables.collect();
    let overrides = overrides(app);

    if app.get_flag(PAYLOAD.0) {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        return DeploymentSettings::load(SettingsSource::Toml(content), &vars, &overrides);
    }

    match app.get_one::<String>(SETTINGS.0) {
        Some(file) => DeploymentSettings::load(SettingsSource::File(Path::new(file)), &vars, &overrides),
        None => DeploymentSettings::load(SettingsSource::Defaults, &vars, &overrides),
    }
}
