use std::fs::File;
use std::io::Write;

use clap::{Arg, ArgAction, ArgMatches};

use crate::command::Command;
use crate::commands::{
    load_settings, with_settings_args, OUTPUT, PRINT_YAML, PROFILE, SERVICE, SHOW_SUMMARY,
    SUCCESS_STATUS_CODE, SYNTH, Variables,
};
use crate::errors::Result;
use crate::stack::{synthesize, Stack};
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

#[derive(Clone, Eq, PartialEq)]
pub struct Synth {
    variables: Variables,
}

#[allow(clippy::new_without_default)]
impl Synth {
    pub fn new() -> Self {
        Synth::with_variables(Variables::Process)
    }

    pub fn with_variables(variables: Variables) -> Self {
        Synth { variables }
    }
}

fn write_template(out: &mut dyn Write, stack: &Stack, yaml: bool) -> Result<()> {
    if yaml {
        serde_yaml::to_writer(&mut *out, &stack.template)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, &stack.template)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_summary(writer: &mut Writer, stack: &Stack) -> Result<()> {
    writer.write_err(format!(
        "{}: {} environment, {} profile",
        stack.name, stack.config.environment, stack.profile
    ))?;
    writer.write_err(format!(
        "Target: account {}, region {}",
        stack.account.as_deref().unwrap_or("from credentials"),
        stack.region
    ))?;
    let counts = stack.template.type_counts();
    let width = counts.keys().map(|name| name.len()).max().unwrap_or(0);
    for (resource_type, count) in counts.iter() {
        writer.write_err(format!("  {:<width$}  {}", resource_type, count, width = width))?;
    }
    writer.write_err(format!(
        "{} resources, {} outputs",
        stack.template.resources.len(),
        stack.template.outputs.len()
    ))?;
    Ok(())
}

impl Command for Synth {
    fn name(&self) -> &'static str {
        SYNTH
    }

    fn command(&self) -> clap::Command {
        with_settings_args(clap::Command::new(SYNTH).about(
            "Synthesizes the tagged template describing every resource of the service for \
             the resolved environment.",
        ))
        .arg(
            Arg::new(PROFILE.0)
                .long(PROFILE.0)
                .short(PROFILE.1)
                .value_parser(["container", "layered"])
                .action(ArgAction::Set)
                .help("Packaging of the service function, container (default) or layered"),
        )
        .arg(
            Arg::new(SERVICE)
                .long(SERVICE)
                .action(ArgAction::Set)
                .help("Service name used as prefix of every physical name"),
        )
        .arg(
            Arg::new(OUTPUT.0)
                .long(OUTPUT.0)
                .short(OUTPUT.1)
                .action(ArgAction::Set)
                .help("Write the template to this file instead of stdout"),
        )
        .arg(
            Arg::new(PRINT_YAML.0)
                .long(PRINT_YAML.0)
                .short(PRINT_YAML.1)
                .action(ArgAction::SetTrue)
                .help("Print the template in YAML format, JSON otherwise"),
        )
        .arg(
            Arg::new(SHOW_SUMMARY.0)
                .long(SHOW_SUMMARY.0)
                .short(SHOW_SUMMARY.1)
                .action(ArgAction::SetTrue)
                .help("Write the number of resources per type to stderr"),
        )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let settings = load_settings(app, reader, &self.variables)?;
        let stack = synthesize(&settings)?;
        let yaml = app.get_flag(PRINT_YAML.0);

        match app.get_one::<String>(OUTPUT.0) {
            Some(path) => {
                let mut file = File::create(path)?;
                write_template(&mut file, &stack, yaml)?;
                log::info!("wrote {} to {}", stack.name, path);
            }
            None => write_template(writer, &stack, yaml)?,
        }

        if app.get_flag(SHOW_SUMMARY.0) {
            write_summary(writer, &stack)?;
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
