use std::collections::HashMap;
use std::process::exit;

use clap::{Arg, ArgAction};
use log::Level;

use backlog_mcp_infra::command::Command;
use backlog_mcp_infra::commands::{APP_NAME, APP_VERSION, VERBOSE};
use backlog_mcp_infra::errors::Error;
use backlog_mcp_infra::utils;
use backlog_mcp_infra::utils::reader::{ReadBuffer, Reader};
use backlog_mcp_infra::utils::writer::{WriteBuffer::Stderr, WriteBuffer::Stdout, Writer};

fn main() -> Result<(), Error> {
    let mut app = clap::Command::new(APP_NAME)
        .version(APP_VERSION)
        .about(
            r#"
  Resolves the per-environment deployment settings of the Backlog MCP service
  (dev, stg, prod) and synthesizes the CloudFormation template describing its
  Lambda function, REST API, CloudFront distribution, WAF and alarms."#,
        )
        .arg(
            Arg::new(VERBOSE.0)
                .long(VERBOSE.0)
                .short(VERBOSE.1)
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity, repeat for more detail"),
        )
        .arg_required_else_help(true);

    let commands: Vec<Box<dyn Command>> = utils::get_infra_commands();

    let mappings = commands.iter().map(|s| (s.name(), s)).fold(
        HashMap::with_capacity(commands.len()),
        |mut map, entry| {
            map.insert(entry.0, entry.1.as_ref());
            map
        },
    );

    for each in &commands {
        app = app.subcommand(each.command());
    }

    let help = app.render_usage();
    let app = app.get_matches();

    let log_level = match app.get_count(VERBOSE.0) {
        0 => Level::Warn,
        1 => Level::Info,
        _ => Level::Debug,
    };
    if let Err(e) = simple_logger::init_with_level(log_level) {
        eprintln!("failed to initialise logging {e}");
    }

    match app.subcommand() {
        Some((name, value)) => {
            if let Some(command) = mappings.get(name) {
                let mut output_writer = Writer::new(Stdout(std::io::stdout()), Stderr(std::io::stderr()));

                match (*command).execute(
                    value,
                    &mut output_writer,
                    &mut Reader::new(ReadBuffer::Stdin(std::io::stdin())),
                ) {
                    Err(e) => {
                        output_writer.write_err(format!("Error occurred {e}"))?;
                        exit(-1);
                    }
                    Ok(code) => exit(code),
                }
            } else {
                println!("{}", help);
            }
        }
        None => {
            println!("{}", help);
        }
    }

    Ok(())
}
