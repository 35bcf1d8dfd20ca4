// fixtures.rs: commonly used command/response pairs

/// Shutter query answers.
pub const SHUTTER_OPEN: &str = "DSH 0";
pub const SHUTTER_CLOSED: &str = "DSH 1";

pub fn intensity_reply(level: u8) -> String {
    format!("DIL1 {}", level)
}

/// Commands the controller sends on a successful open, in order.
pub fn open_sequence() -> Vec<&'static str> {
    vec!["L 1,0", "EN6 1,1", "EN5 1", "OPE 0", "TPIL 0"]
}

/// A command body exactly as long as the record allows.
pub fn longest_command() -> String {
    "X".repeat(libix3tpc::constants::MAX_COMMAND_SIZE - libix3tpc::constants::COMMAND_TERMINATOR.len())
}
