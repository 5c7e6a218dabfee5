use clap::{Parser, ValueEnum};

/// How charge power and session energy are presented when published.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnitSystem {
    /// Raw W and Wh
    #[value(name = "w-wh")]
    Watts,
    /// kW and kWh
    #[value(name = "kw-kwh")]
    Kilowatts,
}

#[derive(Parser, Debug)]
#[command(
    name = "evcharger",
    about = "EV charger status bridge: polls the charger's local web API and publishes to MQTT"
)]
pub struct Config {
    /// Charger hostname or IP address
    #[arg(long)]
    pub host: String,

    /// Seconds between status polls (1-3600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub scan_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Units used for charge power and session energy
    #[arg(long, value_enum, default_value_t = UnitSystem::Kilowatts)]
    pub unit_system: UnitSystem,

    /// MQTT broker hostname
    #[arg(long, default_value = "127.0.0.1")]
    pub mqtt_host: String,

    /// MQTT broker port
    #[arg(long, default_value_t = 1883)]
    pub mqtt_port: u16,

    /// MQTT client ID
    #[arg(long, default_value = "EVCHARGER-DATA")]
    pub mqtt_client_id: String,

    /// MQTT topic to publish to
    #[arg(long, default_value = "tele/evcharger")]
    pub mqtt_topic: String,
}
