#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use libix3tpc::transport::mock::{MOCK_INTERFACE, MockPortManager, Reply};
use libix3tpc::{Controller, ControllerBuilder, ControllerState, Error};

#[test]
fn open_logs_in_and_configures() -> anyhow::Result<()> {
    common::init_logging();
    let (mock, controller) = common::ready_mock_controller(common::fast_config())?;
    assert_eq!(controller.state(), ControllerState::Ready);
    assert_eq!(controller.interface(), MOCK_INTERFACE);
    assert_eq!(mock.sent_commands(), common::fixtures::open_sequence());
    assert_eq!(
        mock.calls()[..5],
        ["initialize", "enum_interfaces", "interface_info", "open_interface", "register_callbacks"]
    );
    mock.wait_idle();
    assert_eq!(controller.in_flight(), 0);
    controller.check_health()?;
    Ok(())
}

#[test]
fn no_interfaces_fails_initialisation() {
    let mock = Arc::new(MockPortManager::new());
    mock.set_interface_count(0);
    match Controller::open(mock.clone(), common::fast_config()) {
        Err(Error::Initialise(msg)) => assert!(msg.contains("IEEE 1394")),
        other => panic!("expected Initialise, got {:?}", other),
    }
    assert!(mock.sent_commands().is_empty());
}

#[test]
fn multiple_interfaces_unsupported_before_login() {
    let mock = Arc::new(common::scripted_port_manager());
    mock.set_interface_count(2);
    assert!(matches!(
        Controller::open(mock.clone(), common::fast_config()),
        Err(Error::UnsupportedFeature(_))
    ));
    assert!(mock.sent_commands().is_empty());
}

#[test]
fn failed_library_init_is_initialise_error() {
    let mock = Arc::new(MockPortManager::new());
    mock.set_init_code(3);
    match Controller::open(mock, common::fast_config()) {
        Err(Error::Initialise(msg)) => assert!(msg.contains("code 3")),
        other => panic!("expected Initialise, got {:?}", other),
    }
}

#[test]
fn failed_open_names_the_interface() {
    let mock = Arc::new(MockPortManager::new());
    mock.set_fail_open(true);
    match Controller::open(mock, common::fast_config()) {
        Err(Error::Initialise(msg)) => assert!(msg.contains("0x1394")),
        other => panic!("expected Initialise, got {:?}", other),
    }
}

#[test]
fn login_mismatch_aborts_without_logout() {
    let mock = Arc::new(MockPortManager::new());
    mock.script("L 1,0", Reply::respond("L !,E01"));
    match ControllerBuilder::new()
        .with_port(mock.clone())
        .with_config(common::fast_config())
        .build()
    {
        Err(Error::Initialise(msg)) => {
            assert_eq!(
                msg,
                "Error logging in. Command: 'L 1,0'. Status: 'Succeeded'. Response: 'L !,E01'."
            );
        }
        other => panic!("expected Initialise, got {:?}", other),
    }
    // Never logged in, so nothing but the login attempt went out.
    assert_eq!(mock.sent_commands(), vec!["L 1,0"]);
    assert!(mock.is_closed());
}

#[test]
fn login_timeout_aborts() {
    let mock = Arc::new(MockPortManager::new());
    mock.script_all(&[("L 1,0", "L +")]);
    mock.script("EN6 1,1", Reply::TimeOut);
    assert!(matches!(
        Controller::open(mock.clone(), common::fast_config()),
        Err(Error::Initialise(_))
    ));
    assert_eq!(mock.sent_commands(), vec!["L 1,0", "EN6 1,1"]);
}

#[test]
fn shutdown_logs_out_then_closes() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    controller.shutdown();
    assert_eq!(controller.state(), ControllerState::Closed);
    assert!(controller.is_shutting_down());

    // The LED stays silent during teardown; only the logout goes out.
    let sent = mock.sent_commands();
    assert_eq!(sent.last().map(String::as_str), Some("L 0,0"));
    assert!(!sent.contains(&"DSH 1".to_string()));
    let logout = mock.sent_records().last().copied().unwrap();
    assert_eq!(logout.timeout_ms, 0);

    let calls = mock.calls();
    let n = calls.len();
    assert_eq!(calls[n - 2..], ["send_command", "close_interface"]);
    assert!(mock.is_closed());
    Ok(())
}

#[test]
fn drop_shuts_down() -> anyhow::Result<()> {
    let (mock, controller) = common::ready_mock_controller(common::fast_config())?;
    drop(controller);
    assert!(mock.is_closed());
    assert_eq!(
        mock.sent_commands().last().map(String::as_str),
        Some("L 0,0")
    );
    Ok(())
}

#[test]
fn close_failure_is_logged_not_raised() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    mock.set_fail_close(true);
    controller.shutdown();
    assert_eq!(controller.state(), ControllerState::Closed);
    assert!(!mock.is_closed());
    Ok(())
}

#[test]
fn communication_loss_surfaces_on_controller() -> anyhow::Result<()> {
    let (mock, controller) = common::ready_mock_controller(common::fast_config())?;
    mock.wait_idle();
    mock.raise_error();
    assert!(matches!(
        controller.check_health(),
        Err(Error::DeviceCommunication(_))
    ));
    assert!(matches!(
        controller.send_blocking("DSH?"),
        Err(Error::DeviceCommunication(_))
    ));
    Ok(())
}
