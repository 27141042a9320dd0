use serde_derive::Deserialize;
use uuid::Uuid;

use crate::presenter::ProximityLevel;

/// https://bitbucket.org/bluetooth-SIG/public/src/main/assigned_numbers/company_identifiers/company_identifiers.yaml
pub const APPLE_COMPANY_ID: u16 = 0x004C;

const IBEACON_FRAME_TYPE: u8 = 0x02;
const IBEACON_FRAME_LEN: u8 = 0x15;

/// Default environment factor for the log-distance path loss model
/// (free-space-ish indoor propagation).
pub const DEFAULT_ENVIRONMENT_FACTOR: f64 = 2.0;

const IMMEDIATE_METERS: f64 = 0.5;
const NEAR_METERS: f64 = 4.0;

/// One decoded iBeacon advertisement frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeaconFrame {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
    /// Calibrated RSSI at 1 m, from the last byte of the frame.
    pub measured_power: i8,
}

/// The uuid/major/minor triple identifying which beacon to range for.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconRegion {
    pub uuid: Uuid,
    pub major: u16,
    pub minor: u16,
}

impl BeaconRegion {
    pub fn matches(&self, frame: &BeaconFrame) -> bool {
        self.uuid == frame.uuid && self.major == frame.major && self.minor == frame.minor
    }
}

/// Decodes an iBeacon frame from the Apple manufacturer-data payload
/// (the bytes after the company id): type 0x02, length 0x15, 16-byte
/// proximity UUID, big-endian major and minor, signed measured power.
pub fn parse_ibeacon(data: &[u8]) -> Option<BeaconFrame> {
    if data.len() < 23 || data[0] != IBEACON_FRAME_TYPE || data[1] != IBEACON_FRAME_LEN {
        return None;
    }
    let uuid = Uuid::from_slice(&data[2..18]).ok()?;
    Some(BeaconFrame {
        uuid,
        major: u16::from_be_bytes([data[18], data[19]]),
        minor: u16::from_be_bytes([data[20], data[21]]),
        measured_power: data[22] as i8,
    })
}

/// A region-matching frame paired with the RSSI the adapter reported for
/// it, if any. Buffered by the run loop until the next ranging tick.
#[derive(Clone, Copy, Debug)]
pub struct BeaconObservation {
    pub frame: BeaconFrame,
    pub rssi: Option<i16>,
}

impl BeaconObservation {
    pub fn level(&self, environment_factor: f64) -> ProximityLevel {
        proximity_from_rssi(self.rssi, self.frame.measured_power, environment_factor)
    }
}

/// Buckets an RSSI reading into a proximity level via the log-distance
/// path loss model: distance = 10^((measured_power - rssi) / (10 * n)).
/// A missing or zero RSSI ranges as Unknown.
pub fn proximity_from_rssi(
    rssi: Option<i16>,
    measured_power: i8,
    environment_factor: f64,
) -> ProximityLevel {
    let rssi = match rssi {
        Some(r) if r != 0 => r,
        _ => return ProximityLevel::Unknown,
    };
    let exponent = (f64::from(measured_power) - f64::from(rssi)) / (10.0 * environment_factor);
    let meters = 10f64.powf(exponent);
    if meters < IMMEDIATE_METERS {
        ProximityLevel::Immediate
    } else if meters < NEAR_METERS {
        ProximityLevel::Near
    } else {
        ProximityLevel::Far
    }
}
