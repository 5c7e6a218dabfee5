use anyhow::{Context, Result};
use log::info;
use rumqttc::{Client, MqttOptions, QoS};
use std::time::Duration;

use crate::charger::PresentedReading;
use crate::config::Config;

/// JSON document published for one reading.
pub fn reading_payload(reading: &PresentedReading) -> Result<String> {
    serde_json::to_string(reading).context("Failed to serialize reading to JSON")
}

/// Publish a charger reading as JSON to the configured MQTT broker.
/// QoS 0, not retained: a missed reading is replaced by the next poll.
pub fn publish_reading(config: &Config, reading: &PresentedReading) -> Result<()> {
    let payload = reading_payload(reading)?;

    let mut opts = MqttOptions::new(&config.mqtt_client_id, &config.mqtt_host, config.mqtt_port);
    opts.set_keep_alive(Duration::from_secs(60));

    let (client, mut connection) = Client::new(opts, 10);

    client
        .publish(
            &config.mqtt_topic,
            QoS::AtMostOnce,
            false,
            payload.as_bytes(),
        )
        .context("Failed to queue MQTT publish")?;

    // The packet only goes out while the event loop is driven.
    for event in connection.iter() {
        match event {
            Ok(rumqttc::Event::Outgoing(rumqttc::Outgoing::Publish(_))) => {
                info!(
                    "Published {} to {} on {}:{}",
                    reading.charger_status, config.mqtt_topic, config.mqtt_host, config.mqtt_port
                );
                break;
            }
            Ok(rumqttc::Event::Outgoing(rumqttc::Outgoing::Disconnect)) => break,
            Err(e) => return Err(anyhow::anyhow!("MQTT connection error: {}", e)),
            _ => continue,
        }
    }

    client.disconnect().ok();
    Ok(())
}
