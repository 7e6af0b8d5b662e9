//! jupgrade - Main application entry point

use tokio::signal;
use tokio_util::sync::CancellationToken;

mod cli;

use cli::{CliApp, exit_codes};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let app = match CliApp::new().await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    tokio::spawn(cancel_on_ctrl_c(app.cancel_token()));

    let code = match app.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            exit_codes::INTERNAL_ERROR
        }
    };
    std::process::exit(code);
}

/// Trip the token on Ctrl-C so running tools are killed and the run is recorded as cancelled
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            tracing::warn!("Received Ctrl+C, cancelling");
            eprintln!("\nCancelling...");
            cancel.cancel();
        }
        Err(e) => tracing::error!("Failed to install Ctrl+C handler: {}", e),
    }
}
