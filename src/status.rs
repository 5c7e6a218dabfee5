use std::ops::Range;

use crate::text::decode_text;
use crate::wire::{decode_fields, DecodeError, WireType};

/// Top-level field carrying the inverter serial number.
pub const STATUS_SERIAL_FIELD: u64 = 1;
/// Top-level field carrying the EV charger submessage. Vendor specific and
/// only known empirically.
pub const STATUS_EVSE_FIELD: u64 = 38;

const EVSE_CAR_STATUS_FIELD: u64 = 1;
const EVSE_CHARGER_STATUS_FIELD: u64 = 2;
const EVSE_CHARGE_POWER_FIELD: u64 = 3;
const EVSE_SESSION_ENERGY_FIELD: u64 = 4;
const EVSE_ERROR_CODE_FIELD: u64 = 5;
const EVSE_SUBSYSTEM_FIELD: u64 = 6;
const EVSE_SERIAL_FIELD: u64 = 7;

/// Charger submessage. `None` means the field was not in the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvseRecord {
    pub car_status: Option<u64>,
    pub charger_status: Option<u64>,
    /// Charge power (W)
    pub charge_power: Option<f32>,
    /// Energy delivered this session (Wh)
    pub session_energy: Option<f32>,
    pub error_code: Option<u64>,
    pub subsystem: Option<u64>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusRecord {
    /// Inverter serial number
    pub serial_number: Option<String>,
    pub evse: Option<EvseRecord>,
}

/// Decode the charger submessage occupying `buf[range]`.
///
/// A known field number seen with an unexpected wire type is skipped rather
/// than coerced.
pub fn decode_evse(buf: &[u8], range: Range<usize>) -> Result<EvseRecord, DecodeError> {
    let mut evse = EvseRecord::default();

    decode_fields(buf, range, |tag, cursor| {
        match (tag.field_number, tag.wire_type) {
            (EVSE_CAR_STATUS_FIELD, WireType::Varint) => {
                evse.car_status = Some(cursor.read_varint()?);
            }
            (EVSE_CHARGER_STATUS_FIELD, WireType::Varint) => {
                evse.charger_status = Some(cursor.read_varint()?);
            }
            (EVSE_CHARGE_POWER_FIELD, WireType::Fixed32) => {
                evse.charge_power = Some(cursor.read_f32()?);
            }
            (EVSE_SESSION_ENERGY_FIELD, WireType::Fixed32) => {
                evse.session_energy = Some(cursor.read_f32()?);
            }
            (EVSE_ERROR_CODE_FIELD, WireType::Varint) => {
                evse.error_code = Some(cursor.read_varint()?);
            }
            (EVSE_SUBSYSTEM_FIELD, WireType::Varint) => {
                evse.subsystem = Some(cursor.read_varint()?);
            }
            (EVSE_SERIAL_FIELD, WireType::LengthDelimited) => {
                let range = cursor.read_length_delimited()?;
                evse.serial_number = Some(decode_text(cursor.bytes(range)));
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;

    Ok(evse)
}

/// Decode a complete status payload as returned by the charger's web API.
pub fn decode_status(buf: &[u8]) -> Result<StatusRecord, DecodeError> {
    let mut status = StatusRecord::default();

    decode_fields(buf, 0..buf.len(), |tag, cursor| {
        match (tag.field_number, tag.wire_type) {
            (STATUS_SERIAL_FIELD, WireType::LengthDelimited) => {
                let range = cursor.read_length_delimited()?;
                status.serial_number = Some(decode_text(cursor.bytes(range)));
            }
            (STATUS_EVSE_FIELD, WireType::LengthDelimited) => {
                let range = cursor.read_length_delimited()?;
                status.evse = Some(decode_evse(buf, range)?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;

    Ok(status)
}
