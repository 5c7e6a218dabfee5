use chrono::Local;
use serde::Serialize;
use std::fmt;

use crate::config::UnitSystem;
use crate::status::StatusRecord;

/// A status code with a fixed, lowercase label.
pub trait StatusCode: Sized + Copy {
    fn from_code(code: u64) -> Option<Self>;
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarStatus {
    Disconnected = 0,
    Connected = 1,
    ChargingCar = 2,
    RfidReq = 3,
    Undefined = 4,
}

impl StatusCode for CarStatus {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(CarStatus::Disconnected),
            1 => Some(CarStatus::Connected),
            2 => Some(CarStatus::ChargingCar),
            3 => Some(CarStatus::RfidReq),
            4 => Some(CarStatus::Undefined),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CarStatus::Disconnected => "disconnected",
            CarStatus::Connected => "connected",
            CarStatus::ChargingCar => "charging",
            CarStatus::RfidReq => "rfid",
            CarStatus::Undefined => "undefined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargerStatus {
    Ready = 0,
    Initializing = 1,
    Charging = 2,
    ChargingBoost = 3,
    ChargingExcessPv = 4,
    Off = 5,
    Error = 6,
}

impl StatusCode for ChargerStatus {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(ChargerStatus::Ready),
            1 => Some(ChargerStatus::Initializing),
            2 => Some(ChargerStatus::Charging),
            3 => Some(ChargerStatus::ChargingBoost),
            4 => Some(ChargerStatus::ChargingExcessPv),
            5 => Some(ChargerStatus::Off),
            6 => Some(ChargerStatus::Error),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ChargerStatus::Ready => "ready",
            ChargerStatus::Initializing => "initializing",
            ChargerStatus::Charging => "active",
            ChargerStatus::ChargingBoost => "boost",
            ChargerStatus::ChargingExcessPv => "excess_pv",
            ChargerStatus::Off => "off",
            ChargerStatus::Error => "error",
        }
    }
}

/// A raw status code resolved against a known set. Newer firmware may send
/// codes we have no label for; those are kept rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label<T> {
    Known(T),
    Unrecognized(u64),
}

impl<T: StatusCode> Label<T> {
    pub fn resolve(code: u64) -> Self {
        T::from_code(code).map_or(Label::Unrecognized(code), Label::Known)
    }
}

impl<T: StatusCode> fmt::Display for Label<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Known(status) => f.write_str(status.label()),
            Label::Unrecognized(code) => write!(f, "unknown_{}", code),
        }
    }
}

fn status_text<T: StatusCode>(code: Option<u64>) -> String {
    match code {
        Some(code) => Label::<T>::resolve(code).to_string(),
        None => "n/a".to_string(),
    }
}

/// Normalized charger state. Power and energy are raw W / Wh as reported.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChargerReading {
    pub inverter_sn: String,
    pub car_status: String,
    pub charger_status: String,
    pub charge_power: Option<f32>,
    pub session_energy: Option<f32>,
    pub error: String,
    pub charger_sn: String,
}

/// Map a decoded status record to a reading. Never fails; every absent field
/// has a default.
pub fn format_status(status: StatusRecord) -> ChargerReading {
    let inverter_sn = status
        .serial_number
        .filter(|sn| !sn.is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    let evse = status.evse.unwrap_or_default();

    let error = match (evse.subsystem, evse.error_code) {
        (Some(subsystem), Some(code)) if code != 0 => {
            format!("Error code={}, subsystem={}", code, subsystem)
        }
        _ => String::new(),
    };

    ChargerReading {
        inverter_sn,
        car_status: status_text::<CarStatus>(evse.car_status),
        charger_status: status_text::<ChargerStatus>(evse.charger_status),
        charge_power: evse.charge_power,
        session_energy: evse.session_energy,
        error,
        charger_sn: evse.serial_number.unwrap_or_default(),
    }
}

/// A reading as published: power and energy rounded to two decimals in the
/// chosen units, plus the time it was taken.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PresentedReading {
    pub inverter_sn: String,
    pub car_status: String,
    pub charger_status: String,
    pub charge_power: Option<f64>,
    pub charge_power_unit: &'static str,
    pub session_energy: Option<f64>,
    pub session_energy_unit: &'static str,
    pub error: String,
    pub charger_sn: String,
    pub timestamp: String,
}

impl ChargerReading {
    pub fn present(&self, units: UnitSystem) -> PresentedReading {
        let (power_unit, energy_unit, divisor) = match units {
            UnitSystem::Watts => ("W", "Wh", 1.0),
            UnitSystem::Kilowatts => ("kW", "kWh", 1000.0),
        };
        // Exact halves round to even.
        let scaled = |value: Option<f32>| {
            value.map(|v| (f64::from(v) / divisor * 100.0).round_ties_even() / 100.0)
        };

        PresentedReading {
            inverter_sn: self.inverter_sn.clone(),
            car_status: self.car_status.clone(),
            charger_status: self.charger_status.clone(),
            charge_power: scaled(self.charge_power),
            charge_power_unit: power_unit,
            session_energy: scaled(self.session_energy),
            session_energy_unit: energy_unit,
            error: self.error.clone(),
            charger_sn: self.charger_sn.clone(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::EvseRecord;

    fn with_evse(evse: EvseRecord) -> StatusRecord {
        StatusRecord {
            serial_number: Some("7E1234AB".to_string()),
            evse: Some(evse),
        }
    }

    #[test]
    fn car_status_labels() {
        let labels: Vec<String> = (0..5)
            .map(|c| Label::<CarStatus>::resolve(c).to_string())
            .collect();
        assert_eq!(
            labels,
            ["disconnected", "connected", "charging", "rfid", "undefined"]
        );
    }

    #[test]
    fn charger_status_labels() {
        let labels: Vec<String> = (0..7)
            .map(|c| Label::<ChargerStatus>::resolve(c).to_string())
            .collect();
        assert_eq!(
            labels,
            ["ready", "initializing", "active", "boost", "excess_pv", "off", "error"]
        );
    }

    #[test]
    fn unrecognized_codes() {
        assert_eq!(Label::<CarStatus>::resolve(99), Label::Unrecognized(99));
        assert_eq!(Label::<CarStatus>::resolve(99).to_string(), "unknown_99");
        assert_eq!(Label::<ChargerStatus>::resolve(7).to_string(), "unknown_7");
    }

    #[test]
    fn format_statuses() {
        let reading = format_status(with_evse(EvseRecord {
            car_status: Some(2),
            charger_status: Some(6),
            ..Default::default()
        }));
        assert_eq!(reading.car_status, "charging");
        assert_eq!(reading.charger_status, "error");

        let reading = format_status(with_evse(EvseRecord {
            car_status: Some(99),
            ..Default::default()
        }));
        assert_eq!(reading.car_status, "unknown_99");
        assert_eq!(reading.charger_status, "n/a");
    }

    #[test]
    fn format_error_message() {
        let reading = format_status(StatusRecord {
            serial_number: None,
            evse: Some(EvseRecord {
                error_code: Some(7),
                subsystem: Some(3),
                ..Default::default()
            }),
        });
        assert_eq!(reading.error, "Error code=7, subsystem=3");
    }

    #[test]
    fn zero_error_code_is_no_error() {
        let reading = format_status(with_evse(EvseRecord {
            error_code: Some(0),
            subsystem: Some(3),
            ..Default::default()
        }));
        assert_eq!(reading.error, "");
    }

    #[test]
    fn error_needs_subsystem() {
        let reading = format_status(with_evse(EvseRecord {
            error_code: Some(12),
            ..Default::default()
        }));
        assert_eq!(reading.error, "");
    }

    #[test]
    fn format_empty_status() {
        let reading = format_status(StatusRecord::default());
        assert_eq!(
            reading,
            ChargerReading {
                inverter_sn: "N/A".to_string(),
                car_status: "n/a".to_string(),
                charger_status: "n/a".to_string(),
                charge_power: None,
                session_energy: None,
                error: String::new(),
                charger_sn: String::new(),
            }
        );
    }

    #[test]
    fn blank_inverter_serial_is_na() {
        let reading = format_status(StatusRecord {
            serial_number: Some(String::new()),
            evse: None,
        });
        assert_eq!(reading.inverter_sn, "N/A");
    }

    #[test]
    fn passes_through_power_and_serials() {
        let reading = format_status(with_evse(EvseRecord {
            charge_power: Some(1500.0),
            session_energy: Some(3200.5),
            serial_number: Some("EV-0042".to_string()),
            ..Default::default()
        }));
        assert_eq!(reading.inverter_sn, "7E1234AB");
        assert_eq!(reading.charge_power, Some(1500.0));
        assert_eq!(reading.session_energy, Some(3200.5));
        assert_eq!(reading.charger_sn, "EV-0042");
    }

    #[test]
    fn present_in_kilowatts() {
        let reading = format_status(with_evse(EvseRecord {
            charge_power: Some(7360.0),
            session_energy: Some(3250.0),
            ..Default::default()
        }));
        let presented = reading.present(UnitSystem::Kilowatts);
        assert!((presented.charge_power.unwrap() - 7.36).abs() < 1e-9);
        assert!((presented.session_energy.unwrap() - 3.25).abs() < 1e-9);
        assert_eq!(presented.charge_power_unit, "kW");
        assert_eq!(presented.session_energy_unit, "kWh");
        // raw values are untouched
        assert_eq!(reading.charge_power, Some(7360.0));
    }

    #[test]
    fn present_in_watts() {
        let reading = format_status(with_evse(EvseRecord {
            charge_power: Some(1500.125),
            ..Default::default()
        }));
        let presented = reading.present(UnitSystem::Watts);
        assert_eq!(presented.charge_power, Some(1500.12));
        assert_eq!(presented.session_energy, None);
        assert_eq!(presented.charge_power_unit, "W");
        assert_eq!(presented.session_energy_unit, "Wh");
    }

    #[test]
    fn present_rounds_halves_to_even() {
        let reading = format_status(with_evse(EvseRecord {
            charge_power: Some(1500.375),
            session_energy: Some(2.5),
            ..Default::default()
        }));
        let presented = reading.present(UnitSystem::Watts);
        assert_eq!(presented.charge_power, Some(1500.38));
        assert_eq!(presented.session_energy, Some(2.5));

        let reading = format_status(with_evse(EvseRecord {
            session_energy: Some(125.0),
            ..Default::default()
        }));
        let presented = reading.present(UnitSystem::Kilowatts);
        assert_eq!(presented.session_energy, Some(0.12));
    }

    #[test]
    fn presented_json_shape() {
        let presented = format_status(StatusRecord::default()).present(UnitSystem::Watts);
        let json = serde_json::to_value(&presented).unwrap();
        assert_eq!(json["inverter_sn"], "N/A");
        assert_eq!(json["car_status"], "n/a");
        assert!(json["charge_power"].is_null());
        assert_eq!(json["error"], "");
        assert!(json["timestamp"].is_string());
    }
}
