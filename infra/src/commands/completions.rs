use std::fs::File;
use std::io::Write;
use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, ValueEnum};

use crate::command::Command;
use crate::commands::{APP_NAME, APP_VERSION, COMPLETIONS, SUCCESS_STATUS_CODE};
use crate::errors::{Error, Result};
use crate::utils::get_infra_commands;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

pub const SHELL: (&str, char) = ("shell", 's');
pub const LOCATION: (&str, char) = ("location", 'l');

#[derive(Copy, Clone, ValueEnum, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Completions {}

#[allow(clippy::new_without_default)]
impl Completions {
    pub fn new() -> Self {
        Completions {}
    }
}

impl Command for Completions {
    fn name(&self) -> &'static str {
        COMPLETIONS
    }

    fn command(&self) -> clap::Command {
        clap::Command::new(COMPLETIONS)
            .about("Generates a shell completions script")
            .arg(
                Arg::new(SHELL.0)
                    .long(SHELL.0)
                    .short(SHELL.1)
                    .value_parser(clap::value_parser!(Shell))
                    .required(true)
                    .action(ArgAction::Set)
                    .help("the shell you are currently running"),
            )
            .arg(
                Arg::new(LOCATION.0)
                    .long(LOCATION.0)
                    .short(LOCATION.1)
                    .action(ArgAction::Set)
                    .help("the directory where the completions script will be written, stdout when absent"),
            )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, _: &mut Reader) -> Result<i32> {
        let mut cli = clap::Command::new(APP_NAME).version(APP_VERSION);
        for each in get_infra_commands() {
            cli = cli.subcommand(each.command());
        }

        let shell = match app.get_one::<Shell>(SHELL.0) {
            Some(shell) => *shell,
            None => return Err(Error::IllegalArguments(String::from("a shell is required"))),
        };

        let mut out: Box<dyn Write + '_> = match app.get_one::<String>(LOCATION.0) {
            Some(location) => {
                let path = Path::new(location);
                if !path.is_dir() {
                    return Err(Error::InvalidCompletionsPath(location.to_string()));
                }
                Box::new(File::create(path.join(format!("{APP_NAME}.sh")))?)
            }
            None => Box::new(writer),
        };

        match shell {
            Shell::Bash => clap_complete::generate(clap_complete::shells::Bash, &mut cli, APP_NAME, &mut out),
            Shell::Zsh => clap_complete::generate(clap_complete::shells::Zsh, &mut cli, APP_NAME, &mut out),
            Shell::Fish => clap_complete::generate(clap_complete::shells::Fish, &mut cli, APP_NAME, &mut out),
            Shell::PowerShell => {
                clap_complete::generate(clap_complete::shells::PowerShell, &mut cli, APP_NAME, &mut out)
            }
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
