use crate::commands::Variables;
use crate::{command::Command, commands};

pub mod reader;
pub mod writer;

pub fn get_infra_commands() -> Vec<Box<dyn Command>> {
    get_infra_commands_with(Variables::Process)
}

/// Commands reading their settings variables from `variables` instead of the process.
pub fn get_infra_commands_with(variables: Variables) -> Vec<Box<dyn Command>> {
    vec![
        Box::new(commands::resolve::Resolve::with_variables(variables.clone())),
        Box::new(commands::synth::Synth::with_variables(variables)),
        Box::new(commands::completions::Completions::new()),
    ]
}
