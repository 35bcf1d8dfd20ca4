#[path = "../common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use libix3tpc::transport::mock::Reply;
use libix3tpc::{CommandStatus, ControllerConfig, Error, ms, poll_ceiling};

#[test]
fn default_ceiling_is_51_polls() {
    assert_eq!(poll_ceiling(10_000, Duration::from_millis(200)), 51);
}

#[test]
fn answered_command_returns_response() {
    common::init_logging();
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("DSH 0", Reply::respond("DSH +"));
    let (status, response) = d.send_blocking("DSH 0", 1000).unwrap();
    assert_eq!(status, CommandStatus::Succeeded);
    assert_eq!(response, "DSH +");
    mock.wait_idle();
    assert!(d.table().is_empty());
}

#[test]
fn library_timeout_is_reported() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("DSH?", Reply::TimeOut);
    let (status, response) = d.send_blocking("DSH?", 1000).unwrap();
    assert_eq!(status, CommandStatus::TimedOut);
    assert_eq!(response, "");
}

#[test]
fn silent_library_gives_up_without_error() {
    let (mock, d) = common::mock_dispatcher(&ControllerConfig::new());
    mock.set_default_reply(Reply::Silent);
    let started = Instant::now();
    let (status, response) = d
        .send_blocking_with("DSH?", 20, ms(10))
        .unwrap();
    // ceil(20 / 10) + 1 polls.
    assert!(started.elapsed() >= ms(30));
    assert_eq!(status, CommandStatus::Pending);
    assert!(response.is_empty());
    // The entry is still waiting for a callback that never comes.
    assert_eq!(d.table().len(), 1);
}

#[test]
fn rejected_submission_still_returns_a_key() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("OPE 0", Reply::Reject);
    let key = d.send("OPE 0", None, 1000).unwrap();
    assert_eq!(d.table().status(key), Some(CommandStatus::Pending));
}

#[test]
fn oversized_command_is_not_registered() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    let body = common::fixtures::longest_command() + "X";
    assert!(matches!(
        d.send(&body, None, 1000),
        Err(Error::PayloadTooLarge { max: 256, actual: 257 })
    ));
    assert!(d.table().is_empty());
    assert!(mock.sent_commands().is_empty());

    // One byte less fits exactly.
    d.send(&common::fixtures::longest_command(), None, 1000).unwrap();
    assert_eq!(mock.sent_records()[0].cmd_size, 256);
}

#[test]
fn parallel_blocking_sends_all_resolve() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("OPE?", Reply::respond("OPE 0"));
    std::thread::scope(|s| {
        let workers: Vec<_> = (0..16)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..10 {
                        let (status, response) = d.send_blocking("OPE?", 1000).unwrap();
                        assert_eq!(status, CommandStatus::Succeeded);
                        assert_eq!(response, "OPE 0");
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
    });
    mock.wait_idle();
    assert!(d.table().is_empty());
    assert_eq!(mock.sent_records().len(), 160);
}
