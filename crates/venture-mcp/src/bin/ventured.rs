use std::process::ExitCode;

use tracing::{error, info};
use venture_mcp::config::log_filter_from_env;
use venture_mcp::{ServerConfig, Transport, VentureServer};

fn main() -> ExitCode {
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter_from_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(v) => v,
        Err(err) => {
            error!(%err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(transport = %config.transport, "ventured starting");

    let server = VentureServer::new();
    let result = match config.transport {
        Transport::Stdio => server.serve_stdio(),
        Transport::Http => server.serve_http(&config.http_addr),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "transport failed");
            ExitCode::FAILURE
        }
    }
}
