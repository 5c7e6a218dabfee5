mod charger;
mod config;
mod mqtt;
mod protocol;
mod status;
mod text;
mod wire;

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    env_logger::init();

    let config = config::Config::parse();
    info!("Starting evcharger");

    let conn =
        protocol::ChargerConnection::open(&config.host, Duration::from_secs(config.timeout_secs))?;
    let interval = Duration::from_secs(config.scan_interval_secs);
    let mut pending = Some(conn.first_refresh()?);

    loop {
        let started = Instant::now();
        let result = match pending.take() {
            Some(reading) => Ok(reading),
            None => conn.read(),
        };

        match result {
            Ok(reading) => {
                let presented = reading.present(config.unit_system);
                if let Err(e) = mqtt::publish_reading(&config, &presented) {
                    error!("Failed to publish: {}", e);
                }
            }
            Err(e) => {
                error!("Update failed: {:#}", e);
            }
        }

        if let Some(remaining) = interval.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
