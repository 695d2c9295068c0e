#![cfg(not(tarpaulin_include))]

use tessera::{Config, app};

/// Main entry point for the web application
///
/// Initializes logging (`RUST_LOG`, default `info`), loads the configuration
/// from the environment and serves the check-in site.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load();

    app::run(config).await
}
