// libix3tpc/src/constants.rs
//! Protocol constants shared across the crate

/// Terminator appended to every command body.
pub const COMMAND_TERMINATOR: &str = "\r\n";

/// Capacity of the command body buffer in a command record.
pub const MAX_COMMAND_SIZE: usize = 256;

/// Capacity of the response buffer in a command record.
pub const MAX_RESPONSE_SIZE: usize = 256;

/// Capacity of the command tag buffer.
pub const MAX_TAG_SIZE: usize = 32;

/// Width of the short `from`/`to` routing identifiers.
pub const SZ_SMALL: usize = 8;

/// Default command timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default poll interval of the blocking send, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Value returned to PortManager from every callback.
pub const CALLBACK_ACK: i32 = 0;

/// Login sequence: (command, expected response).
///
/// Login succeeds for window statuses 1 and 2; then focus and XY control,
/// the touch panel, and finally the remote IDLE state are enabled.
pub const LOGIN_SEQUENCE: &[(&str, &str)] = &[
    ("L 1,0", "L +"),
    ("EN6 1,1", "EN6 +"),
    ("EN5 1", "EN5 +"),
    ("OPE 0", "OPE +"),
];

/// Configuration sequence run after login. Turns off the screen illumination.
pub const CONFIGURE_SEQUENCE: &[(&str, &str)] = &[("TPIL 0", "TPIL +")];

/// Logout command sent during shutdown.
pub const LOGOUT_COMMAND: &str = "L 0,0";

/// Name under which the LED light source is exposed by the controller.
pub const LED_DEVICE_NAME: &str = "LHLEDC";

/// LED shutter: `DSH 0` opens (on), `DSH 1` closes (off).
pub const LED_SHUTTER_OPEN: &str = "DSH 0";
pub const LED_SHUTTER_CLOSE: &str = "DSH 1";
pub const LED_SHUTTER_QUERY: &str = "DSH?";
pub const LED_SHUTTER_ACK: &str = "DSH +";

/// LED intensity register (8-bit).
pub const LED_INTENSITY_PREFIX: &str = "DIL1";
pub const LED_INTENSITY_QUERY: &str = "DIL1?";
pub const LED_INTENSITY_ACK: &str = "DIL1 +";
pub const LED_INTENSITY_MAX: u8 = 255;
