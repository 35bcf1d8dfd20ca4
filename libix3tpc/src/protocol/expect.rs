// libix3tpc/src/protocol/expect.rs

//! Exact-match checks for command replies. The controller answers with short
//! ASCII acknowledgements (`"L +"`, `"DSH +"`); anything else is an error.

use crate::types::CommandStatus;
use crate::{Error, Result};

/// Require `Succeeded` and a response equal to `expected`.
pub fn expect_exact(
    command: &str,
    status: CommandStatus,
    response: &str,
    expected: &str,
) -> Result<()> {
    if status == CommandStatus::Succeeded && response == expected {
        Ok(())
    } else {
        Err(Error::unexpected(command, status, response))
    }
}

/// Require `Succeeded` and a response equal to one of `allowed`. Returns the
/// index of the matching literal.
pub fn expect_one_of(
    command: &str,
    status: CommandStatus,
    response: &str,
    allowed: &[&str],
) -> Result<usize> {
    if status != CommandStatus::Succeeded {
        return Err(Error::unexpected(command, status, response));
    }
    allowed
        .iter()
        .position(|a| *a == response)
        .ok_or_else(|| Error::unexpected(command, status, response))
}

/// Parse the integer argument of a `"<PREFIX> <n>"` reply, requiring the
/// prefix to match exactly.
pub fn parse_numeric_reply(prefix: &str, response: &str) -> Option<i64> {
    let (head, value) = response.rsplit_once(' ')?;
    if head != prefix {
        return None;
    }
    value.parse().ok()
}
