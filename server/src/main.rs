//! Adventus Server - Entry Point
//!
//! Dashboard backend for Vercel-hosted starter apps: authenticated log
//! viewer proxying the provider's deployment-log API.

use std::collections::HashMap;
use std::env;

use adventus_server::app::options::AppOptions;
use adventus_server::app::run::run;
use adventus_server::logs::{init_logging, LogLevel, LogOptions};
use adventus_server::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render version info: {}", e),
        }
        return;
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LogLevel::Info),
        json_format: matches!(env::var("LOG_JSON").as_deref(), Ok("1") | Ok("true")),
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Load configuration from the environment
    let options = match AppOptions::from_env() {
        Ok(options) => options,
        Err(e) => {
            error!("Configuration error: {}", e);
            return;
        }
    };

    info!("Running adventus server v{}", version.version);
    let result = run(options, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the server: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            tokio::signal::ctrl_c().await.ok();
            return;
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl+C received, shutting down...");
    }
}
