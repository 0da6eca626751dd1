use std::time::Duration;

use thiserror::Error;

use crate::constants::RESPONSE_FRAME_LEN;
use crate::frame::ResponseKind;

/// Errors surfaced by the driver.
#[derive(Debug, Error)]
pub enum Error {
    /// The reply's transmitted checksum byte does not match the sum of its
    /// payload bytes. The frame is corrupt and is not retried.
    #[error("reply checksum mismatch: computed {computed:#04X}, frame carried {received:#04X}")]
    Checksum { computed: u8, received: u8 },

    /// The reply is not delimited by the expected head/tail markers.
    #[error("malformed frame, bad head/tail markers: {0:02X?}")]
    Framing([u8; RESPONSE_FRAME_LEN]),

    /// The reply carries a type byte that is neither DATA nor SETTING.
    #[error("unknown reply type byte {0:#04X}")]
    UnknownResponseType(u8),

    /// A SETTING reply echoed a different operation id than the command
    /// that was issued. Caller and device are likely desynchronized.
    #[error("reply answers operation {got:#04X}, expected {expected:#04X}")]
    UnexpectedReply { expected: u8, got: u8 },

    /// The reply type does not answer the issued command (a SETTING reply
    /// to a data query, or vice versa).
    #[error("reply type {got:?} does not answer the issued command")]
    UnexpectedReplyType { got: ResponseKind },

    /// The device echoed a value other than the one the command requested.
    #[error("device did not confirm command {op:#04X}")]
    NotConfirmed { op: u8 },

    /// No complete frame arrived within the allotted window.
    #[error("no complete frame from the device within {waited:?}")]
    Timeout { waited: Duration },

    /// The underlying serial link failed.
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable configuration notices. A clamped work period is reported
/// alongside the confirmed value rather than failing the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The requested work period fell outside the device's 0-30 minute
    /// range and was pulled to the nearest bound before sending.
    #[error("work period {requested} outside 0-30 minutes, clamped to {applied}")]
    Clamped { requested: i16, applied: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_error_reports_both_bytes() {
        let err = Error::Checksum {
            computed: 0x01,
            received: 0xA5,
        };
        let text = err.to_string();
        assert!(text.contains("0x01"));
        assert!(text.contains("0xA5"));
    }

    #[test]
    fn clamp_notice_names_bounds() {
        let notice = ConfigError::Clamped {
            requested: 45,
            applied: 30,
        };
        assert!(notice.to_string().contains("clamped to 30"));
    }
}
