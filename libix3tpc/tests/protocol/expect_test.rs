use libix3tpc::protocol::{expect_exact, expect_one_of, parse_numeric_reply};
use libix3tpc::{CommandStatus, Error};

#[test]
fn exact_match_requires_success() {
    assert!(expect_exact("DSH 0", CommandStatus::Succeeded, "DSH +", "DSH +").is_ok());
    assert!(matches!(
        expect_exact("DSH 0", CommandStatus::TimedOut, "DSH +", "DSH +"),
        Err(Error::UnexpectedResponse { status: CommandStatus::TimedOut, .. })
    ));
    assert!(expect_exact("DSH 0", CommandStatus::Pending, "", "DSH +").is_err());
}

#[test]
fn one_of_reports_index() {
    let options = ["DSH 0", "DSH 1"];
    assert_eq!(
        expect_one_of("DSH?", CommandStatus::Succeeded, "DSH 1", &options).unwrap(),
        1
    );
    assert!(expect_one_of("DSH?", CommandStatus::Succeeded, "DSH 2", &options).is_err());
}

#[test]
fn numeric_reply() {
    assert_eq!(parse_numeric_reply("DIL1", "DIL1 128"), Some(128));
    assert_eq!(parse_numeric_reply("DIL1", "DIL1 x"), None);
    assert_eq!(parse_numeric_reply("DIL1", "DSH 1"), None);
}
