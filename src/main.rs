//! winstrap - main entry point
//!
//! Opens the run transcript, routes all logging into it, dispatches the
//! command and turns the result into the process exit code.

use anyhow::Context;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use winstrap::cli::{Cli, Commands, RunArgs};
use winstrap::command_runner::{CommandRunner, DryRunRunner, SystemRunner};
use winstrap::console::Console;
use winstrap::inspect::{list_catalogs, validate_config};
use winstrap::orchestrator::Orchestrator;
use winstrap::transcript::Transcript;

fn env_filter() -> EnvFilter {
    // RUST_LOG overrides the default level
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Execute the parsed command and return the exit code
fn dispatch(cli: &Cli, console: &mut Console) -> anyhow::Result<i32> {
    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner::default())
    } else {
        Box::new(SystemRunner)
    };

    let summary = match &cli.command {
        None => {
            let options = cli.run_options(&RunArgs::default());
            Orchestrator::new(options, runner.as_ref(), console).run()?
        }
        Some(Commands::Run(args)) => {
            let options = cli.run_options(args);
            Orchestrator::new(options, runner.as_ref(), console).run()?
        }
        Some(Commands::Network(args)) => {
            let options = cli.network_options(args);
            Orchestrator::new(options, runner.as_ref(), console).run_network()?
        }
        Some(Commands::Apps {
            manager,
            categories,
            all,
        }) => {
            let options = cli.apps_options(*manager, categories, *all);
            Orchestrator::new(options, runner.as_ref(), console).run_apps(*manager)?
        }
        Some(Commands::List) => {
            list_catalogs(&cli.config_paths(), console);
            return Ok(0);
        }
        Some(Commands::Validate) => {
            return Ok(validate_config(&cli.config_paths(), console));
        }
    };

    summary.print(console);
    Ok(summary.exit_code())
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let mut console = Console::stdio(!cli.no_color);

    let transcript = Transcript::open(&cli.log_dir)
        .with_context(|| format!("Failed to open transcript in {}", cli.log_dir.display()));

    let (transcript, _guard) = match transcript {
        Ok(transcript) => {
            let subscriber = tracing_subscriber::fmt()
                .with_writer(transcript.clone())
                .with_ansi(false)
                .with_env_filter(env_filter())
                .finish();
            let guard = tracing::subscriber::set_default(subscriber);
            console.info(format!("Transcript: {}", transcript.path().display()));
            (Some(transcript), guard)
        }
        Err(e) => {
            // Without a transcript, warnings and errors still reach stderr
            let subscriber = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(EnvFilter::new("warn"))
                .finish();
            let guard = tracing::subscriber::set_default(subscriber);
            console.warning(format!("{:#}", e));
            (None, guard)
        }
    };

    info!("winstrap {} starting", env!("CARGO_PKG_VERSION"));

    let code = match dispatch(&cli, &mut console) {
        Ok(code) => code,
        Err(e) => {
            error!("Unhandled error: {:#}", e);
            console.error(format!("{:#}", e));
            1
        }
    };

    if let Some(transcript) = transcript {
        if let Err(e) = transcript.close(&format!("exit code {}", code)) {
            eprintln!("Failed to close transcript {}: {}", transcript.path().display(), e);
        }
    }

    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
