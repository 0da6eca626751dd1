use std::time::Duration;

use crate::constants::{MODE_ACTIVE, MODE_QUERY};
use crate::error::ConfigError;

/// Factory default baud rate of the SDS011 UART interface.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-read timeout when the driver is the initiator.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Longest work period the device accepts, in minutes.
pub const WORK_PERIOD_MAX: u8 = 30;

/// Represents the reporting mode of the SDS011 sensor.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ReportingMode {
    /// The sensor pushes measurements autonomously at its work period cadence.
    Active,
    /// The sensor only reports a measurement when queried.
    Query,
}

impl ReportingMode {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            ReportingMode::Active => MODE_ACTIVE,
            ReportingMode::Query => MODE_QUERY,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> ReportingMode {
        if byte == MODE_QUERY {
            ReportingMode::Query
        } else {
            ReportingMode::Active
        }
    }
}

/// Two-byte device address carried in every command frame.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct DeviceId(pub [u8; 2]);

impl DeviceId {
    /// The broadcast address, answered by any sensor on the link.
    pub const BROADCAST: DeviceId = DeviceId([0xFF, 0xFF]);
}

impl Default for DeviceId {
    fn default() -> DeviceId {
        DeviceId::BROADCAST
    }
}

/// Device-side configuration as last confirmed by the device. The session
/// updates this only after a confirmed reply, never speculatively.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct DeviceConfig {
    /// Confirmed reporting mode.
    pub reporting_mode: ReportingMode,
    /// Confirmed work period in minutes; 0 means continuous.
    pub work_period: u8,
}

impl Default for DeviceConfig {
    fn default() -> DeviceConfig {
        DeviceConfig {
            reporting_mode: ReportingMode::Query,
            work_period: 0,
        }
    }
}

/// Serial endpoint settings consumed by [`crate::SerialTransport::open`].
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SerialConfig {
    /// Serial endpoint path, e.g. `/dev/ttyUSB0`.
    pub path: String,
    /// Line rate; the SDS011 ships at 9600 baud.
    pub baud_rate: u32,
    /// Default per-read timeout.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Settings for the given endpoint with the factory baud rate and the
    /// default timeout.
    pub fn new(path: impl Into<String>) -> SerialConfig {
        SerialConfig {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Overrides the baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Overrides the per-read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Initial settings applied when a session is established.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct SessionOptions {
    /// Reporting mode written to the device during the opening handshake.
    pub reporting_mode: ReportingMode,
    /// Work period written during the handshake, in minutes.
    pub work_period: u8,
    /// Timeout for replies to driver-initiated commands.
    pub read_timeout: Duration,
    /// Address bytes used in outgoing commands.
    pub address: DeviceId,
}

impl SessionOptions {
    /// Sets the initial reporting mode.
    pub fn reporting_mode(mut self, mode: ReportingMode) -> Self {
        self.reporting_mode = mode;
        self
    }

    /// Sets the initial work period in minutes.
    pub fn work_period(mut self, minutes: u8) -> Self {
        self.work_period = minutes;
        self
    }

    /// Sets the default reply timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Addresses commands to a specific device instead of broadcasting.
    pub fn address(mut self, address: DeviceId) -> Self {
        self.address = address;
        self
    }
}

impl Default for SessionOptions {
    /// Query mode, continuous work period, 2 second timeout, broadcast
    /// addressing.
    fn default() -> SessionOptions {
        SessionOptions {
            reporting_mode: ReportingMode::Query,
            work_period: 0,
            read_timeout: DEFAULT_READ_TIMEOUT,
            address: DeviceId::default(),
        }
    }
}

/// Pulls a requested work period into the device's accepted range,
/// reporting a clamp notice when the value was out of bounds.
pub(crate) fn clamp_work_period(requested: i16) -> (u8, Option<ConfigError>) {
    if requested < 0 {
        (0, Some(ConfigError::Clamped { requested, applied: 0 }))
    } else if requested > i16::from(WORK_PERIOD_MAX) {
        (
            WORK_PERIOD_MAX,
            Some(ConfigError::Clamped {
                requested,
                applied: WORK_PERIOD_MAX,
            }),
        )
    } else {
        (requested as u8, None)
    }
}
