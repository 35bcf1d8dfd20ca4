#[path = "../common/mod.rs"]
mod common;

use libix3tpc::constants::LED_DEVICE_NAME;
use libix3tpc::transport::mock::Reply;
use libix3tpc::{Error, LightSource};

#[test]
fn controller_exposes_led() -> anyhow::Result<()> {
    let (_mock, controller) = common::ready_mock_controller(common::fast_config())?;
    assert_eq!(controller.device_names(), vec![LED_DEVICE_NAME]);
    assert!(controller.device("LHLEDC").is_some());
    assert!(controller.device("FW").is_none());
    Ok(())
}

#[test]
fn enable_and_disable_toggle_shutter() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    mock.script_all(&[("DSH 0", "DSH +"), ("DSH 1", "DSH +")]);
    let led = controller.led().unwrap();
    led.enable()?;
    assert!(led.is_enabled());
    led.disable()?;
    assert!(!led.is_enabled());
    let sent = mock.sent_commands();
    assert_eq!(sent[sent.len() - 2..], ["DSH 0", "DSH 1"]);
    Ok(())
}

#[test]
fn enable_rejects_wrong_ack() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    mock.script("DSH 0", Reply::respond("DSH !,E02"));
    let led = controller.led().unwrap();
    match led.enable() {
        Err(Error::UnexpectedResponse { command, response, .. }) => {
            assert_eq!(command, "DSH 0");
            assert_eq!(response, "DSH !,E02");
        }
        other => panic!("expected UnexpectedResponse, got {:?}", other),
    }
    assert!(!led.is_enabled());
    Ok(())
}

#[test]
fn shutter_state_query() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    let led = controller.led().unwrap();
    mock.script("DSH?", Reply::respond(common::fixtures::SHUTTER_OPEN));
    mock.script("DSH?", Reply::respond(common::fixtures::SHUTTER_CLOSED));
    assert!(led.is_on()?);
    assert!(!led.is_on()?);
    Ok(())
}

#[test]
fn power_round_trips_through_register() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    mock.script("DIL1 255", Reply::respond("DIL1 +"));
    mock.script("DIL1?", Reply::respond(&common::fixtures::intensity_reply(51)));
    let led = controller.led().unwrap();
    led.set_power(1.7)?;
    assert!((led.power()? - 0.2).abs() < 1e-9);
    assert!(led.status().is_empty());
    Ok(())
}

#[test]
fn out_of_range_power_reply_is_rejected() -> anyhow::Result<()> {
    let (mock, mut controller) = common::ready_mock_controller(common::fast_config())?;
    mock.script("DIL1?", Reply::respond("DIL1 300"));
    let led = controller.led().unwrap();
    assert!(matches!(led.power(), Err(Error::UnexpectedResponse { .. })));
    Ok(())
}
