// libix3tpc/src/protocol/mod.rs

pub mod codec;
pub mod expect;
pub mod record;

pub use codec::{build_command_record, decode_response, decode_text, encode_command};
pub use expect::{expect_exact, expect_one_of, parse_numeric_reply};
pub use record::CommandRecord;
