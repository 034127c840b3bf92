//! Start the Gatehouse server.

use clap::Args;

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting Gatehouse server...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    gatehouse_api::run_server(config).await
}
