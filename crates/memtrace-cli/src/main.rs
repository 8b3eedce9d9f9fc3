use clap::Parser;
use memtrace_cli::cli::{Cli, Command};
use memtrace_cli::error::exit_code;
use memtrace_cli::{commands, Error};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(cli_err) = e.downcast_ref::<Error>() {
                ExitCode::from(cli_err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Demo { scenario, output } => {
            commands::demo::run(scenario, output.as_deref())?;
        }
        Command::Replay { script, pid, min_block_size, output } => {
            commands::replay::run(&script, pid, min_block_size, output.as_deref())?;
        }
        Command::Stats { trace } => {
            commands::stats::run(&trace)?;
        }
        Command::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "memtrace", &mut std::io::stdout());
        }
    }

    Ok(())
}
