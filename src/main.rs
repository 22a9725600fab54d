use std::process;

mod bot;
mod chat;
mod commands;
mod config;
mod error;
mod transfer;

use bot::RelayBot;
use config::BridgeConfig;
use log::info;

#[tokio::main]
async fn main() {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse configuration from file and environment variables
    let config = match BridgeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            if e.is_configuration() {
                print_usage();
            }
            process::exit(1);
        }
    };
    info!("{}", config);

    // Create bot
    let relay = match RelayBot::new(&config) {
        Ok(relay) => relay,
        Err(e) => {
            eprintln!("Failed to create bot: {}", e);
            process::exit(1);
        }
    };

    // Poll until interrupted
    if let Err(e) = relay.run().await {
        eprintln!("Bot error: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    println!("Drive Relay Bot");
    println!("Environment Variables:");
    println!("  TELEGRAM_BOT_TOKEN=123456:ABC-DEF   (required)");
    println!("  SERVER_URL=http://localhost:5000");
    println!("  TELEGRAM_API_URL=http://localhost:8081");
    println!("  DRIVE_RELAY_REPORT_INTERVAL=5");
    println!("  DRIVE_RELAY_TRANSFER_TIMEOUT=0");
    println!("  DRIVE_RELAY_SCRATCH_DIR=/var/tmp");
    println!("  DRIVE_RELAY_CONFIG=drive-relay.toml");
    println!("  RUST_LOG=info");
}
