pub mod cli_commands;

pub use cli_commands::{run_cli, Args, Command};
