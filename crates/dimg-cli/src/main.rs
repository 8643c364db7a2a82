use dimg_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, logging to stderr: {:#}", err);
    }

    match CliCommand::run_from_args().await {
        Ok(true) => {}
        // Ran to completion but integrity could not be established.
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("dimg error: {:#}", err);
            std::process::exit(1);
        }
    }
}
