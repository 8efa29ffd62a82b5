// SPDX-License-Identifier: MPL-2.0

//! Test program: send one command to a fan, then print its broadcasts.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example fan_control -- <host> <action> [value]
//! ```
//!
//! Actions: `on`, `off`, `speed <0-6>`, `delta <-1..5>`, `led <on|off>`,
//! `timer <0-4>`, `sleep <on|off>`, `watch`.
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=atomberg_lib=debug cargo run --example fan_control -- 192.168.29.14 speed 4
//! ```

use std::env;
use std::time::Duration;

use atomberg_lib::event::DeviceEvent;
use atomberg_lib::{CommandDelta, ControllerConfig, DeviceRegistry, FanController};
use tracing_subscriber::EnvFilter;

const FAN_NAME: &str = "fan";
const LISTEN_FOR: Duration = Duration::from_secs(10);

fn parse_switch(value: Option<&String>) -> Result<bool, String> {
    match value.map(String::as_str) {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        other => Err(format!("expected on/off, got {other:?}")),
    }
}

fn parse_action(action: &str, value: Option<&String>) -> Result<Option<CommandDelta>, String> {
    let number = |v: Option<&String>| -> Result<i64, String> {
        v.ok_or("missing value")?
            .parse::<i64>()
            .map_err(|e| e.to_string())
    };

    let delta = match action {
        "on" => CommandDelta::power_on(),
        "off" => CommandDelta::power_off(),
        "speed" => CommandDelta::new()
            .with_speed(u8::try_from(number(value)?).map_err(|e| e.to_string())?),
        "delta" => CommandDelta::new()
            .with_speed_delta(i8::try_from(number(value)?).map_err(|e| e.to_string())?),
        "led" => CommandDelta::new().with_led(parse_switch(value)?),
        "timer" => CommandDelta::new()
            .with_timer(u8::try_from(number(value)?).map_err(|e| e.to_string())?),
        "sleep" => CommandDelta::new().with_sleep(parse_switch(value)?),
        "watch" => return Ok(None),
        other => return Err(format!("unknown action {other:?}")),
    };
    Ok(Some(delta))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <host> <action> [value]", args[0]);
        eprintln!();
        eprintln!("Actions: on, off, speed <0-6>, delta <-1..5>, led <on|off>,");
        eprintln!("         timer <0-4>, sleep <on|off>, watch");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example fan_control -- 192.168.29.14 speed 4");
        std::process::exit(1);
    }

    let host = &args[1];
    let command = match parse_action(&args[2], args.get(3)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Invalid action: {e}");
            std::process::exit(1);
        }
    };

    let registry = DeviceRegistry::builder()
        .device(FAN_NAME, host.parse()?)
        .build()?;
    let controller = FanController::new(registry, ControllerConfig::default());
    let mut events = controller.on_state_changed();

    match controller.start_listening().await {
        Ok(addr) => println!("Listening for broadcasts on {addr}"),
        Err(e) => println!("Not listening ({e}), sending only"),
    }

    if let Some(delta) = command {
        controller.request_change(FAN_NAME, &delta).await?;
        println!("Command sent to {host}: {delta}");
    }

    if !controller.listener_state().is_listening() {
        return Ok(());
    }

    println!("Waiting {} seconds for broadcasts...", LISTEN_FOR.as_secs());
    let deadline = tokio::time::sleep(LISTEN_FOR);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = events.recv() => match event {
                Some(DeviceEvent::StateChanged(update)) => {
                    println!("[{}] {}: {}", update.received_at.format("%H:%M:%S"), update.display_name(), update.state);
                }
                Some(DeviceEvent::Diagnostic(diagnostic)) => println!("Diagnostic: {diagnostic}"),
                Some(_) => {}
                None => break,
            },
        }
    }

    controller.stop_listening().await;
    let stats = controller.diagnostics();
    println!(
        "Done! received={} accepted={} malformed={}",
        stats.received, stats.accepted, stats.malformed
    );
    Ok(())
}
