//! Command-line surface for the report composer.

pub mod cli;
pub mod config;

pub use cli::{exit_code, run, Cli, Commands};
pub use config::CliConfig;
