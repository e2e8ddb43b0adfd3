use anyhow::Error;
use log::LevelFilter;

use crate::config::LauncherConfig;
use crate::dependencies::{Resolution, Resolver};

mod config;
mod dependencies;
mod launcher;
mod utils;

fn init_logging() {
    // Single-line diagnostics on stderr, RUST_LOG can override the default level
    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    if let Err(e) = crate::config::load_environment() {
        log::error!("Failed to load environment: {}", e);
        return Err(e);
    }
    let config = LauncherConfig::from_env();

    // Provisioning problems never stop the launcher, the player invocation reports them
    let resolution = match Resolver::new(&config).resolve().await {
        Ok(resolution) => resolution,
        Err(e) => {
            log::error!("Failed to resolve dependencies: {}", e);
            Resolution::new(std::env::var_os("PATH"))
        }
    };
    for (dependency, reason) in resolution.failures() {
        log::warn!("{} is unavailable: {}", dependency, reason);
    }

    let url = std::env::args().nth(1);
    if let Err(e) = launcher::run(&resolution, url).await {
        log::error!("{}", e);
    }

    Ok(())
}
