// HEAD is the byte that marks the beginning of any frame (command or reply).
pub const HEAD: u8 = 0xAA;

// TAIL is the byte that marks the end of any frame (command or reply).
pub const TAIL: u8 = 0xAB;

// COMMAND_ID is the byte that identifies a command frame sent to the sensor.
pub const COMMAND_ID: u8 = 0xB4;

// DATA_RESPONSE is the type byte of a measurement frame, pushed autonomously
// in active mode or sent as the reply to a data query.
pub const DATA_RESPONSE: u8 = 0xC0;

// SETTING_RESPONSE is the type byte of a reply to a configuration command.
pub const SETTING_RESPONSE: u8 = 0xC5;

// Operation ids, carried in byte 2 of a command frame and echoed in the
// first payload byte of a SETTING reply.
pub const OP_REPORTING_MODE: u8 = 0x02;
pub const OP_QUERY_DATA: u8 = 0x04;
pub const OP_SET_DEVICE_ID: u8 = 0x05;
pub const OP_SLEEP_SETTING: u8 = 0x06;
pub const OP_WORK_PERIOD: u8 = 0x08;

// Sub-codes selecting whether a setting command reads or writes.
pub const SUB_READ: u8 = 0x00;
pub const SUB_WRITE: u8 = 0x01;

// Setting values for OP_REPORTING_MODE.
pub const MODE_ACTIVE: u8 = 0x00;
pub const MODE_QUERY: u8 = 0x01;

// Setting values for OP_SLEEP_SETTING.
pub const STATE_SLEEP: u8 = 0x00;
pub const STATE_WORK: u8 = 0x01;

/// Length of an outgoing command frame on the wire.
pub const COMMAND_FRAME_LEN: usize = 19;

/// Length of an incoming reply frame on the wire.
pub const RESPONSE_FRAME_LEN: usize = 10;

/// Length of the data section of a command frame (sub-code and setting
/// bytes followed by zero padding).
pub const COMMAND_DATA_LEN: usize = 12;
