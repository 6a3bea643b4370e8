pub mod command;
pub mod commands;
pub mod config;
pub mod errors;
pub mod stack;
pub mod utils;

pub use crate::config::{resolve, DeploymentSettings, ResolvedConfig};
pub use crate::stack::{synthesize, Stack};
