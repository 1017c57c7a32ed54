use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Find a Chrome profile by typing part of its name and launch it",
    long_about = None,
    name = "cpl",
    bin_name = "cpl"
)]
pub struct Cli {
    /// Override the configuration directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
    /// Use this Chrome executable instead of searching for one.
    #[arg(long, value_name = "PATH", global = true)]
    pub executable: Option<PathBuf>,
    /// Read profiles from this Chrome user data directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub user_data_dir: Option<PathBuf>,
    /// Increase log verbosity (use -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Silence all log output.
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List profiles, optionally filtered by part of their name.
    List(ListCommand),
    /// Launch the single profile matching a query without opening the picker.
    Open(OpenCommand),
    /// Show where the executable, profiles, and configuration are read from.
    Where,
    /// Generate a shell completion script.
    Completions(CompletionsCommand),
}

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only list profiles whose name contains this text.
    pub query: Option<String>,
    /// Emit JSON results.
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct OpenCommand {
    /// Profile name, part of a name, or directory id.
    pub query: String,
    /// Print the command and exit without launching it.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
