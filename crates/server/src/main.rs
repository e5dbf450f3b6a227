use std::process::ExitCode;

use fileserve::{Server, ServerConfig};
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(cause = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server stopped with error");
            ExitCode::FAILURE
        }
    }
}
