//! Driver for the SDS011 air particulate density sensor over a serial UART
//! link.
//!
//! The sensor speaks a fixed-size binary command/reply protocol: 19-byte
//! commands, 10-byte replies, both delimited by `0xAA`/`0xAB` markers and
//! protected by a modular checksum. A [`DeviceSession`] owns the serial
//! [`Transport`], issues commands, correlates replies, and caches the
//! configuration the device has confirmed (reporting mode and work period).
//! [`DeviceSession::read`] picks between polling the device and waiting for
//! an autonomous push based on that confirmed state.
//!
//! ```no_run
//! use sds011_serial::{DeviceSession, SerialConfig, SessionOptions};
//!
//! fn main() -> Result<(), sds011_serial::Error> {
//!     let serial = SerialConfig::new("/dev/ttyUSB0");
//!     let mut sensor = DeviceSession::connect(&serial, SessionOptions::default())?;
//!     let reading = sensor.query()?;
//!     println!("PM2.5 {} µg/m³, PM10 {} µg/m³", reading.pm2_5, reading.pm10);
//!     Ok(())
//! }
//! ```
//!
//! In active mode the device is the initiator; [`DeviceSession::read`] then
//! blocks for up to a full work period plus one second of slack:
//!
//! ```no_run
//! use sds011_serial::{DeviceSession, ReportingMode, SerialConfig, SessionOptions};
//!
//! # fn main() -> Result<(), sds011_serial::Error> {
//! let options = SessionOptions::default()
//!     .reporting_mode(ReportingMode::Active)
//!     .work_period(1);
//! let mut sensor = DeviceSession::connect(&SerialConfig::new("/dev/ttyUSB0"), options)?;
//! let reading = sensor.read()?; // blocks up to 61 seconds
//! # Ok(())
//! # }
//! ```

use std::time::{Duration, Instant};

use log::{debug, error, warn};

mod config;
pub use config::*;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod frame;
pub use frame::*;

mod scheduler;

mod transport;
pub use transport::*;

use scheduler::ReadPlan;

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

// Total send+read attempts wake() makes before giving up on a silent device.
const WAKE_ATTEMPTS: u32 = 5;

// In active mode the device pushes measurements on its own cadence, so a
// stray DATA frame can land in the middle of a setting exchange. Bound how
// many of them a correlation read will skip before calling the session
// desynchronized.
const STRAY_FRAME_LIMIT: u32 = 5;

/// Whether the device is in its low-power sleep state or measuring, as
/// tracked from confirmed wake/sleep exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Fan and laser off; the device only answers a wake command.
    Asleep,
    /// Measuring, in the configured reporting mode.
    Awake,
}

/// Device acknowledgement of a work period write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPeriodAck {
    /// Work period the device confirmed, in minutes.
    pub minutes: u8,
    /// Present when the requested value was pulled into the 0-30 range
    /// before sending.
    pub clamped: Option<ConfigError>,
}

/// A session with one SDS011 sensor.
///
/// The session exclusively owns its [`Transport`]. Every operation is a
/// strictly ordered write-then-read exchange; a second command is never
/// issued before the reply to the first has been consumed, since the wire
/// has no framing beyond byte order.
pub struct DeviceSession<T> {
    transport: T,
    address: DeviceId,
    device: DeviceConfig,
    default_timeout: Duration,
    power: PowerState,
}

impl DeviceSession<SerialTransport> {
    /// Opens the serial endpoint described by `serial` and establishes a
    /// session over it.
    pub fn connect(serial: &SerialConfig, options: SessionOptions) -> Result<Self> {
        let transport = SerialTransport::open(serial)?;
        DeviceSession::open(transport, options)
    }
}

impl<T: Transport> DeviceSession<T> {
    /// Establishes a session over an already-open transport: flushes the
    /// link, wakes the device, and applies the configured work period and
    /// reporting mode. The cached [`DeviceConfig`] afterwards holds only
    /// device-confirmed values.
    pub fn open(transport: T, options: SessionOptions) -> Result<Self> {
        let mut session = DeviceSession {
            transport,
            address: options.address,
            device: DeviceConfig::default(),
            default_timeout: options.read_timeout,
            power: PowerState::Asleep,
        };

        session.transport.flush()?;
        session.wake()?;
        session.set_work_period(i16::from(options.work_period))?;
        session.set_reporting_mode(options.reporting_mode)?;

        debug!("session established: {:?}", session.device);
        Ok(session)
    }

    /// The device configuration as last confirmed by the device.
    pub fn config(&self) -> &DeviceConfig {
        &self.device
    }

    /// Whether the device is believed asleep or awake.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// Closes the session, releasing the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Wakes the device from sleep. A sleeping device often swallows the
    /// first command, so up to five fresh send+read attempts are made
    /// before surfacing [`Error::Timeout`].
    pub fn wake(&mut self) -> Result<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.sleep_setting(STATE_WORK) {
                Ok(()) => {
                    self.power = PowerState::Awake;
                    return Ok(());
                }
                Err(Error::Timeout { .. }) if attempt < WAKE_ATTEMPTS => {
                    debug!(
                        "wake attempt {} of {} went unanswered, sending again",
                        attempt, WAKE_ATTEMPTS
                    );
                }
                Err(e) => {
                    if matches!(e, Error::Timeout { .. }) {
                        error!("device has not woken after {} attempts", WAKE_ATTEMPTS);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Puts the device into its low-power sleep state. Single attempt.
    pub fn sleep(&mut self) -> Result<()> {
        self.sleep_setting(STATE_SLEEP)?;
        self.power = PowerState::Asleep;
        Ok(())
    }

    fn sleep_setting(&mut self, state: u8) -> Result<()> {
        let mut data = [0u8; COMMAND_DATA_LEN];
        data[0] = SUB_WRITE;
        data[1] = state;
        self.send_command(OP_SLEEP_SETTING, &data)?;
        self.get_reply(Some(OP_SLEEP_SETTING), self.default_timeout)?;
        Ok(())
    }

    /// Writes the reporting mode and updates the cache from the device's
    /// acknowledgement.
    pub fn set_reporting_mode(&mut self, mode: ReportingMode) -> Result<()> {
        let mut data = [0u8; COMMAND_DATA_LEN];
        data[0] = SUB_WRITE;
        data[1] = mode.to_byte();
        self.send_command(OP_REPORTING_MODE, &data)?;

        let reply = self.get_reply(Some(OP_REPORTING_MODE), self.default_timeout)?;
        self.device.reporting_mode = ReportingMode::from_byte(reply.setting_value());
        debug!("reporting mode confirmed: {:?}", self.device.reporting_mode);
        Ok(())
    }

    /// Reads the reporting mode back from the device, refreshing the cache.
    pub fn get_reporting_mode(&mut self) -> Result<ReportingMode> {
        let mut data = [0u8; COMMAND_DATA_LEN];
        data[0] = SUB_READ;
        self.send_command(OP_REPORTING_MODE, &data)?;

        let reply = self.get_reply(Some(OP_REPORTING_MODE), self.default_timeout)?;
        let mode = ReportingMode::from_byte(reply.setting_value());
        self.device.reporting_mode = mode;
        Ok(mode)
    }

    /// Writes the work period, clamping out-of-range requests to the 0-30
    /// minute range the device accepts. A clamp is reported in the returned
    /// acknowledgement rather than failing the operation; the `minutes`
    /// field is the value the device confirmed.
    pub fn set_work_period(&mut self, minutes: i16) -> Result<WorkPeriodAck> {
        let (applied, clamped) = clamp_work_period(minutes);
        if let Some(notice) = clamped {
            warn!("{}", notice);
        }

        let mut data = [0u8; COMMAND_DATA_LEN];
        data[0] = SUB_WRITE;
        data[1] = applied;
        self.send_command(OP_WORK_PERIOD, &data)?;

        let reply = self.get_reply(Some(OP_WORK_PERIOD), self.default_timeout)?;
        let confirmed = reply.setting_value();
        self.device.work_period = confirmed;
        debug!("work period confirmed: {} minutes", confirmed);
        Ok(WorkPeriodAck {
            minutes: confirmed,
            clamped,
        })
    }

    /// Reads the work period back from the device, refreshing the cache.
    pub fn get_work_period(&mut self) -> Result<u8> {
        let mut data = [0u8; COMMAND_DATA_LEN];
        data[0] = SUB_READ;
        self.send_command(OP_WORK_PERIOD, &data)?;

        let reply = self.get_reply(Some(OP_WORK_PERIOD), self.default_timeout)?;
        let period = reply.setting_value();
        self.device.work_period = period;
        Ok(period)
    }

    /// Writes a new device id. Subsequent commands from this session are
    /// addressed to it instead of broadcast.
    pub fn set_device_id(&mut self, id: DeviceId) -> Result<()> {
        let mut data = [0u8; COMMAND_DATA_LEN];
        data[10] = id.0[0];
        data[11] = id.0[1];
        self.send_command(OP_SET_DEVICE_ID, &data)?;

        let reply = self.get_reply(Some(OP_SET_DEVICE_ID), self.default_timeout)?;
        if reply.device_id() != id.0 {
            error!(
                "device echoed id {:02X?} instead of {:02X?}",
                reply.device_id(),
                id.0
            );
            return Err(Error::NotConfirmed {
                op: OP_SET_DEVICE_ID,
            });
        }
        self.address = id;
        Ok(())
    }

    /// Explicitly polls the device for a measurement. The reply must be a
    /// DATA frame; a SETTING reply here means the session is answering some
    /// other command and is surfaced as a protocol error.
    pub fn query(&mut self) -> Result<Reading> {
        self.send_command(OP_QUERY_DATA, &[0u8; COMMAND_DATA_LEN])?;
        let reply = self.get_reply(None, self.default_timeout)?;
        reply.reading()
    }

    /// Obtains a measurement according to the confirmed reporting mode: in
    /// query mode this polls like [`DeviceSession::query`]; in active mode
    /// it sends nothing and waits up to a full work period plus one second
    /// for the device to push one.
    pub fn read(&mut self) -> Result<Reading> {
        match scheduler::plan_read(&self.device, self.default_timeout) {
            ReadPlan::Query { .. } => self.query(),
            ReadPlan::AwaitPush { timeout } => {
                debug!("waiting up to {:?} for a pushed measurement", timeout);
                let reply = self.get_reply(None, timeout)?;
                reply.reading()
            }
        }
    }

    fn send_command(&mut self, op: u8, data: &[u8; COMMAND_DATA_LEN]) -> Result<()> {
        if self.power == PowerState::Asleep && op != OP_SLEEP_SETTING {
            warn!(
                "sending command {:#04X} while the device is asleep; it may not answer",
                op
            );
        }
        let command = encode_command(op, data, self.address.0);
        debug!("command: {:02X?}", command);
        self.transport.send(&command)?;
        self.transport.flush()?;
        Ok(())
    }

    // Reads and validates one reply. With `expect_op` set, the reply must
    // be a SETTING frame echoing that operation id; stray pushed DATA
    // frames are skipped up to STRAY_FRAME_LIMIT. With `expect_op` unset,
    // the reply must be a DATA frame.
    fn get_reply(&mut self, expect_op: Option<u8>, timeout: Duration) -> Result<ResponseFrame> {
        for _ in 0..STRAY_FRAME_LIMIT {
            let raw = self.read_frame(timeout)?;
            let reply = decode_response(&raw)?;
            debug!("reply: {:02X?}", raw);

            match (reply.kind, expect_op) {
                (ResponseKind::Setting, Some(op)) => {
                    if reply.op_id() != op {
                        return Err(Error::UnexpectedReply {
                            expected: op,
                            got: reply.op_id(),
                        });
                    }
                    return Ok(reply);
                }
                (ResponseKind::Data, Some(op)) => {
                    debug!(
                        "stray measurement while awaiting reply to {:#04X}, reading on",
                        op
                    );
                }
                (ResponseKind::Data, None) => return Ok(reply),
                (ResponseKind::Setting, None) => {
                    return Err(Error::UnexpectedReplyType { got: reply.kind });
                }
            }
        }

        Err(Error::UnexpectedReplyType {
            got: ResponseKind::Data,
        })
    }

    // Reads exactly one 10-byte frame, accumulating partial reads until
    // the deadline. Silence or an incomplete frame both time out.
    fn read_frame(&mut self, timeout: Duration) -> Result<[u8; RESPONSE_FRAME_LEN]> {
        let mut raw = [0u8; RESPONSE_FRAME_LEN];
        let mut filled = 0;
        let deadline = Instant::now() + timeout;

        while filled < raw.len() {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(Error::Timeout { waited: timeout })?;
            let n = self.transport.receive(&mut raw[filled..], remaining)?;
            if n == 0 {
                return Err(Error::Timeout { waited: timeout });
            }
            filled += n;
        }
        Ok(raw)
    }
}
