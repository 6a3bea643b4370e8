use std::io::Write;

use clap::{Arg, ArgAction, ArgMatches};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::command::Command;
use crate::commands::{
    load_settings, with_settings_args, Variables, OUTPUT_FORMAT, RESOLVE, SUCCESS_STATUS_CODE,
};
use crate::config::{DeploymentSettings, ResolvedConfig};
use crate::errors::{Error, Result};
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum OutputFormatType {
    Table,
    JSON,
    YAML,
}

impl OutputFormatType {
    fn from_arg(value: &str) -> Result<Self> {
        match value {
            "table" => Ok(OutputFormatType::Table),
            "json" => Ok(OutputFormatType::JSON),
            "yaml" => Ok(OutputFormatType::YAML),
            _ => Err(Error::IllegalArguments(format!("Unsupported output format `{value}`"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct Resolution<'a> {
    #[serde(flatten)]
    config: &'a ResolvedConfig,
    region: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<&'a str>,
    features: Vec<&'static str>,
}

impl<'a> Resolution<'a> {
    fn new(settings: &'a DeploymentSettings, config: &'a ResolvedConfig) -> Self {
        Resolution {
            config,
            region: settings.region(),
            account: settings.account(),
            features: config.features().iter().map(|feature| feature.as_str()).collect(),
        }
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Resolve {
    variables: Variables,
}

#[allow(clippy::new_without_default)]
impl Resolve {
    pub fn new() -> Self {
        Resolve::with_variables(Variables::Process)
    }

    pub fn with_variables(variables: Variables) -> Self {
        Resolve { variables }
    }
}

fn print_table(writer: &mut Writer, resolution: &Resolution<'_>) -> Result<()> {
    writeln!(
        writer,
        "{} {}",
        "Resolved configuration for".bold(),
        resolution.config.environment.to_string().bold()
    )?;

    if let Value::Object(fields) = serde_json::to_value(resolution)? {
        let rows: Vec<(String, Value)> = fields
            .into_iter()
            .filter(|(name, _)| name != "features")
            .collect();
        let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, value) in rows {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            writeln!(writer, "  {:<width$}  {}", name, value, width = width)?;
        }
    }

    let features = if resolution.features.is_empty() {
        String::from("none")
    } else {
        resolution.features.join(", ")
    };
    writeln!(writer, "{} {}", "Features:".bold(), features)?;
    Ok(())
}

impl Command for Resolve {
    fn name(&self) -> &'static str {
        RESOLVE
    }

    fn command(&self) -> clap::Command {
        with_settings_args(
            clap::Command::new(RESOLVE).about(
                "Resolves the per-environment deployment configuration and prints it together \
                 with the optional features it enables.",
            ),
        )
        .arg(
            Arg::new(OUTPUT_FORMAT.0)
                .long(OUTPUT_FORMAT.0)
                .short(OUTPUT_FORMAT.1)
                .value_parser(["table", "json", "yaml"])
                .default_value("table")
                .action(ArgAction::Set)
                .help("Format of the resolved configuration"),
        )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let format = OutputFormatType::from_arg(
            app.get_one::<String>(OUTPUT_FORMAT.0)
                .map(String::as_str)
                .unwrap_or("table"),
        )?;

        let settings = load_settings(app, reader, &self.variables)?;
        let config = settings.resolve()?;
        let resolution = Resolution::new(&settings, &config);

        match format {
            OutputFormatType::Table => print_table(writer, &resolution)?,
            OutputFormatType::JSON => {
                serde_json::to_writer_pretty(&mut *writer, &resolution)?;
                writeln!(writer)?;
            }
            OutputFormatType::YAML => serde_yaml::to_writer(&mut *writer, &resolution)?,
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
