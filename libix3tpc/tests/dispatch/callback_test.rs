#[path = "../common/mod.rs"]
mod common;

use std::sync::mpsc;

use libix3tpc::callback;
use libix3tpc::protocol::build_command_record;
use libix3tpc::transport::mock::Reply;
use libix3tpc::{CommandKey, CommandStatus, Error, bind_args};

#[test]
fn handler_runs_once_with_bound_args() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("DIL1?", Reply::respond("DIL1 128"));
    let (tx, rx) = mpsc::channel();
    let handler = bind_args(
        move |status, response: &str, (tag, tx): (&'static str, mpsc::Sender<_>)| {
            tx.send((status, response.to_string(), tag)).unwrap();
        },
        ("intensity", tx),
    );
    let key = d.send("DIL1?", Some(handler), 1000).unwrap();
    mock.wait_idle();

    let (status, response, tag) = rx.recv().unwrap();
    assert_eq!(status, CommandStatus::Succeeded);
    assert_eq!(response, "DIL1 128");
    assert_eq!(tag, "intensity");
    assert!(rx.try_recv().is_err());
    assert!(!d.table().contains(key));
}

#[test]
fn panicking_handler_still_retires_entry() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("OPE?", Reply::respond("OPE 0"));
    let key = d
        .send("OPE?", Some(Box::new(|_: CommandStatus, _: &str| panic!("handler failure"))), 1000)
        .unwrap();
    mock.wait_idle();
    assert!(!d.table().contains(key));
}

#[test]
fn completion_for_unknown_key_is_ignored() {
    let (_mock, d) = common::mock_dispatcher(&common::fast_config());
    let record = build_command_record("OPE?", CommandKey::new(7), d.table().id(), 100).unwrap();
    assert_eq!(callback::on_command(&record, Some(d.table().id())), 0);
    assert!(d.table().is_empty());
}

#[test]
fn zero_handle_resolves_key_zero() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("OPE?", Reply::Hold);
    let key = d.send("OPE?", None, 1000).unwrap();
    assert_eq!(key, CommandKey::new(0));
    mock.expire_held();
    mock.wait_idle();
    assert!(d.table().is_empty());
}

#[test]
fn error_callback_fails_waiters_and_new_sends() {
    let (mock, d) = common::mock_dispatcher(&common::fast_config());
    mock.script("DSH?", Reply::Hold);
    std::thread::scope(|s| {
        let waiter = s.spawn(|| d.send_blocking("DSH?", 5_000));
        while mock.held_count() == 0 {
            std::thread::yield_now();
        }
        assert!(matches!(mock.raise_error(), Error::DeviceCommunication(_)));
        assert!(matches!(
            waiter.join().unwrap(),
            Err(Error::DeviceCommunication(_))
        ));
    });
    assert!(matches!(
        d.send("DSH?", None, 1000),
        Err(Error::DeviceCommunication(_))
    ));
}
