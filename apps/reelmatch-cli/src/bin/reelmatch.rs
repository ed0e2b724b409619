use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use reelmatch_cli::logging::init_tracing;
use reelmatch_cli::{run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.verbose, cli.log_json) {
        eprintln!("Error initializing logging: {e}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out).await {
        Ok(()) => {
            let _ = out.flush();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            // Bad queries exit 2 so scripts can tell them from broken data.
            let caller = e
                .downcast_ref::<reelmatch_core::Error>()
                .is_some_and(reelmatch_core::Error::is_caller_error);
            ExitCode::from(if caller { 2 } else { 1 })
        }
    }
}
