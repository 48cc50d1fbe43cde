use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use kritanet::cli::Cli;
use kritanet::error::SyncError;
use kritanet::output::{self, Verbosity};
use kritanet::{KritanetContext, commands, logging};
use std::io;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), SyncError> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));
    logging::init(cli.verbose)?;

    let ctx = KritanetContext::from_cli(&cli)?;
    let report = commands::sync::execute(&ctx)?;
    report.ensure_success()
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
