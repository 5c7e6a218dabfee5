use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::charger::{format_status, ChargerReading};
use crate::status::decode_status;

/// Path of the charger's binary status document.
pub const STATUS_PATH: &str = "/web/v1/status";

/// Holds an HTTP client pointed at one charger for repeated readings.
pub struct ChargerConnection {
    client: Client,
    url: String,
}

impl ChargerConnection {
    pub fn open(host: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let url = format!("http://{}{}", host, STATUS_PATH);
        info!("Polling charger status at {}", url);
        Ok(Self { client, url })
    }

    /// Fetch and decode one status document. Any transport or decode failure
    /// fails the whole reading.
    pub fn read(&self) -> Result<ChargerReading> {
        self.fetch()
            .with_context(|| format!("Error fetching data from {}", self.url))
    }

    /// Initial reading taken before polling starts. An unreachable charger or
    /// an undecodable document stops startup here.
    pub fn first_refresh(&self) -> Result<ChargerReading> {
        let reading = self
            .read()
            .context("Charger did not answer the initial status request")?;
        info!(
            "Connected to charger {} (inverter {})",
            if reading.charger_sn.is_empty() { "?" } else { reading.charger_sn.as_str() },
            reading.inverter_sn
        );
        Ok(reading)
    }

    fn fetch(&self) -> Result<ChargerReading> {
        let body = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .bytes()?;
        debug!("Received {} byte status document", body.len());

        let status = decode_status(&body)?;
        debug!("Decoded: {:?}", status);

        let reading = format_status(status);
        info!("Reading complete: {:?}", reading);
        Ok(reading)
    }
}
