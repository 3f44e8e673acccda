mod cli;
mod cmd;
mod error;
mod format;
mod io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, OutputFormat, PathOrStdin};
use cmd::unroll::RouteArgs;
use error::CliError;
use format::{FormatMode, FormatterConfig};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mode = match cli.format {
        OutputFormat::Human => FormatMode::Human,
        OutputFormat::Json => FormatMode::Json,
    };
    let fmt = FormatterConfig::from_flags(mode, cli.no_color, cli.quiet, cli.verbose);

    match &cli.command {
        Command::Validate {
            file,
            document,
            limits,
        } => {
            let content = read(file, cli)?;
            cmd::validate::run(&content, document, limits, &fmt)
        }
        Command::Cycles {
            file,
            document,
            limits,
        } => {
            let content = read(file, cli)?;
            cmd::cycles::run(&content, document, limits, &fmt)
        }
        Command::Unroll {
            file,
            airport,
            start_time,
            max_depth,
            document,
            limits,
        } => {
            let content = read(file, cli)?;
            let route = RouteArgs {
                airport: airport.as_str(),
                start_time: *start_time,
                max_depth: *max_depth,
            };
            cmd::unroll::run(&content, route, document, limits, &fmt)
        }
    }
}

fn read(file: &PathOrStdin, cli: &Cli) -> Result<String, CliError> {
    io::read_input(file, cli.max_file_size)
}
