// src/main.rs

use std::process::ExitCode;

use sitebuild::engine::RunReport;
use sitebuild::{cli, logging, run};

/// Exit status after a Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    match run_main().await {
        Ok(report) if report.interrupted => ExitCode::from(EXIT_INTERRUPTED),
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            eprintln!("sitebuild: failed tasks: {}", report.failed.join(", "));
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("sitebuild error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run_main() -> anyhow::Result<RunReport> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
