mod artifact;
mod cli;
mod config;
mod error;
mod remote;
mod runner;
mod state_machine;
mod ui;

use clap::Parser;

use cli::Cli;
use config::ClientConfig;
use error::{ClientError, RunOutcome};
use remote::CompilerClient;
use runner::CompileRunner;
use ui::Progress;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(&cli).await {
        Ok(outcome) => outcome.exit_code(),
        // Local failures (unreadable input, artifact write) exit 1; remote
        // failures never reach this arm.
        Err(e) => {
            eprintln!("[E] {e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: &Cli) -> Result<RunOutcome, ClientError> {
    let config = ClientConfig::load()
        .map_err(|e| ClientError::Config(e.to_string()))?
        .with_overrides(cli);

    let client = CompilerClient::new(config.base_url.clone(), config.transport());
    let progress = Progress::start(&format!("uploading {}...", cli.file.display()));

    let runner = CompileRunner::new(client, &config)
        .with_progress(&progress)
        .with_verbose(cli.verbose);

    let (outcome, report) = runner.run(&cli.file).await?;
    progress.finish(&outcome);
    if cli.report {
        progress.print_report(&report);
    }

    Ok(outcome)
}
