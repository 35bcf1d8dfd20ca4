#![cfg(feature = "portmanager")]

//! Simple probe example for the IX3 touch panel controller.
//!
//! Usage:
//!   cargo run -p libix3tpc --example tpc_probe --features portmanager --release [gtlib dir]

use std::sync::Arc;

use libix3tpc::transport::native::{NativePortManager, default_library_dir};
use libix3tpc::{ControllerBuilder, LightSource, Result};

fn main() -> Result<()> {
    env_logger::init();

    let dir = match std::env::args().nth(1) {
        Some(dir) => dir.into(),
        None => default_library_dir()?,
    };
    let port = NativePortManager::load_from(&dir)?;
    println!("Loaded PortManager from {}", dir.display());

    let mut controller = ControllerBuilder::new().with_port(Arc::new(port)).build()?;
    println!(
        "Controller ready on interface {:#X}; devices: {:?}",
        controller.interface(),
        controller.device_names()
    );

    // Raw query, printed as-is.
    let (status, response) = controller.send_blocking("OPE?")?;
    println!("OPE? -> {} '{}'", status, response);

    if let Some(led) = controller.led() {
        match led.is_on() {
            Ok(on) => println!("LED shutter open: {}", on),
            Err(e) => println!("LED shutter query failed (non-fatal): {:?}", e),
        }
        match led.power() {
            Ok(p) => println!("LED power: {:.3}", p),
            Err(e) => println!("LED power query failed (non-fatal): {:?}", e),
        }
    }

    controller.shutdown();
    Ok(())
}
