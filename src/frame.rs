//! Pure encode/decode for the SDS011 wire format. No I/O lives here.
//!
//! Command frame (19 bytes):
//!
//! | Byte  | Content                                   |
//! |-------|-------------------------------------------|
//! | 0     | `0xAA` head                               |
//! | 1     | `0xB4` command id                         |
//! | 2     | operation id                              |
//! | 3-14  | data (sub-code, setting, zero padding)    |
//! | 15-16 | device address (`0xFF 0xFF` = broadcast)  |
//! | 17    | checksum over bytes 2-16, mod 256         |
//! | 18    | `0xAB` tail                               |
//!
//! Reply frame (10 bytes):
//!
//! | Byte | Content                                  |
//! |------|------------------------------------------|
//! | 0    | `0xAA` head                              |
//! | 1    | `0xC0` (DATA) or `0xC5` (SETTING)        |
//! | 2-7  | payload                                  |
//! | 8    | checksum over bytes 2-7, mod 256         |
//! | 9    | `0xAB` tail                              |

use crate::constants::{
    COMMAND_DATA_LEN, COMMAND_FRAME_LEN, COMMAND_ID, DATA_RESPONSE, HEAD, RESPONSE_FRAME_LEN,
    SETTING_RESPONSE, TAIL,
};
use crate::error::Error;

/// Whether a reply carries a measurement or a setting acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Measurement frame (`0xC0`).
    Data,
    /// Setting acknowledgement (`0xC5`).
    Setting,
}

/// A validated reply frame with its six payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    pub kind: ResponseKind,
    pub payload: [u8; 6],
}

/// A single particulate measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// PM2.5 concentration in µg/m³.
    pub pm2_5: f32,
    /// PM10 concentration in µg/m³.
    pub pm10: f32,
}

pub(crate) fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Builds a command frame for the given operation, data section, and
/// device address.
pub fn encode_command(
    op: u8,
    data: &[u8; COMMAND_DATA_LEN],
    address: [u8; 2],
) -> [u8; COMMAND_FRAME_LEN] {
    let mut frame = [0u8; COMMAND_FRAME_LEN];
    frame[0] = HEAD;
    frame[1] = COMMAND_ID;
    frame[2] = op;
    frame[3..15].copy_from_slice(data);
    frame[15] = address[0];
    frame[16] = address[1];
    frame[17] = checksum(&frame[2..17]);
    frame[18] = TAIL;
    frame
}

/// Validates a raw 10-byte reply: head/tail markers, checksum, and type
/// byte. Returns the typed frame on success.
pub fn decode_response(raw: &[u8; RESPONSE_FRAME_LEN]) -> Result<ResponseFrame, Error> {
    if raw[0] != HEAD || raw[9] != TAIL {
        return Err(Error::Framing(*raw));
    }

    let computed = checksum(&raw[2..8]);
    if computed != raw[8] {
        return Err(Error::Checksum {
            computed,
            received: raw[8],
        });
    }

    let kind = match raw[1] {
        DATA_RESPONSE => ResponseKind::Data,
        SETTING_RESPONSE => ResponseKind::Setting,
        other => return Err(Error::UnknownResponseType(other)),
    };

    let mut payload = [0u8; 6];
    payload.copy_from_slice(&raw[2..8]);
    Ok(ResponseFrame { kind, payload })
}

impl ResponseFrame {
    /// Interprets a DATA frame as a measurement: payload bytes 0-1 are the
    /// little-endian PM2.5 value and bytes 2-3 the PM10 value, both in
    /// tenths of µg/m³.
    pub fn reading(&self) -> Result<Reading, Error> {
        if self.kind != ResponseKind::Data {
            return Err(Error::UnexpectedReplyType { got: self.kind });
        }
        let pm2_5 = u16::from_le_bytes([self.payload[0], self.payload[1]]) as f32 / 10.0;
        let pm10 = u16::from_le_bytes([self.payload[2], self.payload[3]]) as f32 / 10.0;
        Ok(Reading { pm2_5, pm10 })
    }

    /// Operation id echoed in the first payload byte of a SETTING reply.
    pub fn op_id(&self) -> u8 {
        self.payload[0]
    }

    /// Setting value byte of a SETTING reply (mode, sleep state, or work
    /// period, depending on the operation).
    pub fn setting_value(&self) -> u8 {
        self.payload[2]
    }

    /// Device id bytes carried in the last two payload positions of every
    /// reply. Not required to interpret a measurement.
    pub fn device_id(&self) -> [u8; 2] {
        [self.payload[4], self.payload[5]]
    }
}
