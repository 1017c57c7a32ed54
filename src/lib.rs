pub mod cli;
pub mod config;
pub mod dialog;
pub mod filter;
pub mod install;
pub mod launcher;
pub mod locator;
pub mod picker;
pub mod registry;
pub mod test_support;

mod app;
mod tui;
mod util;

use std::io::{self, Write};

use clap::CommandFactory;
use cli::Command;
use color_eyre::Report;

#[cfg(target_os = "macos")]
use clap::{ColorChoice, FromArgMatches};

pub use app::AppError;
pub use cli::Cli;

/// Run the cpl CLI entrypoint.
///
/// # Errors
///
/// Returns an error when initialization or the chosen command fails to execute.
pub fn run(cli: &Cli) -> color_eyre::Result<()> {
    init_tracing(cli);

    if let Some(Command::Completions(cmd)) = &cli.command {
        let mut command = command();
        let name = command.get_name().to_string();
        clap_complete::generate(cmd.shell, &mut command, name, &mut io::stdout());
        return Ok(());
    }

    let app = app::App::bootstrap(cli)?;

    match &cli.command {
        Some(Command::List(cmd)) => app.list(cmd),
        Some(Command::Open(cmd)) => app.open(cmd),
        Some(Command::Where) => app.locations(),
        Some(Command::Completions(_)) => unreachable!("completions handled above"),
        None => app.run_ui(),
    }
}

fn init_tracing(cli: &Cli) {
    let level = desired_level(cli);
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn desired_level(cli: &Cli) -> tracing::level_filters::LevelFilter {
    if cli.quiet {
        return tracing::level_filters::LevelFilter::ERROR;
    }

    match cli.verbose {
        0 => tracing::level_filters::LevelFilter::INFO,
        1 => tracing::level_filters::LevelFilter::DEBUG,
        _ => tracing::level_filters::LevelFilter::TRACE,
    }
}

#[must_use]
pub fn command() -> clap::Command {
    Cli::command()
}

/// Parse command-line arguments, disabling colored help on macOS terminals.
#[cfg(target_os = "macos")]
#[must_use]
pub fn parse_cli() -> Cli {
    let matches = command().color(ColorChoice::Never).get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

#[cfg(not(target_os = "macos"))]
#[must_use]
pub fn parse_cli() -> Cli {
    use clap::Parser;
    Cli::parse()
}

/// Exit code for an error returned by [`run`].
#[must_use]
pub fn exit_code_for_error(err: &Report) -> i32 {
    err.downcast_ref::<AppError>()
        .map_or(1, AppError::exit_code)
}

/// Print an error and its causes the way the binaries report failures.
///
/// # Errors
///
/// Returns any error produced by the writer.
pub fn write_cli_error(err: &Report, mut writer: impl Write) -> io::Result<()> {
    let mut chain = err.chain();
    if let Some(head) = chain.next() {
        writeln!(writer, "cpl: {head}")?;
    }
    for cause in chain {
        writeln!(writer, "    caused by: {cause}")?;
    }
    Ok(())
}
