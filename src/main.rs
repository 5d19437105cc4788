//! pkglens - npm package analysis CLI tool
//!
//! Reports a package's module format, where its type declarations come
//! from, and which of its dependencies trail the `latest` dist-tag.
//!
//! Exit codes:
//! - 0: success
//! - 1: fatal error
//! - 2: some registry lookups failed
//! - 3: `--fail-on-outdated` and at least one dependency is behind

use clap::Parser;
use pkglens::cli::CliArgs;
use pkglens::config::Config;
use pkglens::logging;
use pkglens::orchestrator::{Orchestrator, Report};
use pkglens::output::{create_formatter, OutputConfig};
use pkglens::progress::Progress;
use std::io::{self, Write};
use std::process::ExitCode;

/// Some lookups failed but a report was produced
const EXIT_PARTIAL: u8 = 2;

/// `--fail-on-outdated` tripped
const EXIT_OUTDATED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(args.verbose, args.log_json);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = Config::from_args(&args)?;

    if args.verbose {
        eprintln!("pkglens v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", args.target);
        if args.offline {
            eprintln!("Mode: offline");
        } else {
            eprintln!("Registry: {}", config.registry);
        }
    }

    let orchestrator = Orchestrator::new(config)?;
    let mut progress = Progress::new(args.show_progress());
    let report = orchestrator.run(&mut progress).await?;

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    Ok(exit_code(&report, args.fail_on_outdated))
}

fn exit_code(report: &Report, fail_on_outdated: bool) -> ExitCode {
    if report.is_partial() {
        ExitCode::from(EXIT_PARTIAL)
    } else if fail_on_outdated && report.outdated_count() > 0 {
        ExitCode::from(EXIT_OUTDATED)
    } else {
        ExitCode::SUCCESS
    }
}
