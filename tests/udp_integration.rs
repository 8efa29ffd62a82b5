// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests over loopback UDP.
//!
//! Each test plays the fan side with plain sockets: one socket receives the
//! commands, another sends telemetry to the controller's listener.

use std::net::SocketAddr;
use std::time::Duration;

use atomberg_lib::event::DeviceEvent;
use atomberg_lib::{
    CommandDelta, ControllerConfig, DeviceRegistry, Error, FanController, ListenerState,
    StateUpdate, Subscription,
};
use tokio::net::UdpSocket;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

/// A fan simulated with two sockets.
struct FakeFan {
    commands: UdpSocket,
    telemetry: UdpSocket,
}

impl FakeFan {
    async fn bind(ip: &str) -> Self {
        Self {
            commands: UdpSocket::bind(format!("{ip}:0")).await.unwrap(),
            telemetry: UdpSocket::bind(format!("{ip}:0")).await.unwrap(),
        }
    }

    fn command_addr(&self) -> SocketAddr {
        self.commands.local_addr().unwrap()
    }

    async fn broadcast(&self, listener: SocketAddr, packed: u32) {
        let payload = format!(r#"{{"device_id":"a1b2c3","state_string":"{packed}"}}"#);
        self.telemetry
            .send_to(payload.as_bytes(), listener)
            .await
            .unwrap();
    }

    async fn broadcast_raw(&self, listener: SocketAddr, payload: &[u8]) {
        self.telemetry.send_to(payload, listener).await.unwrap();
    }

    async fn next_command(&self) -> serde_json::Value {
        let mut buf = [0u8; 512];
        let (len, _) = timeout(WAIT, self.commands.recv_from(&mut buf))
            .await
            .expect("no command received")
            .unwrap();
        serde_json::from_slice(&buf[..len]).unwrap()
    }
}

async fn controller_for(fans: &[(&str, &FakeFan)]) -> (FanController, SocketAddr) {
    let mut builder = DeviceRegistry::builder();
    for (name, fan) in fans {
        builder = builder.device(*name, fan.command_addr().into());
    }
    let config = ControllerConfig::default().with_telemetry_bind("127.0.0.1:0".parse().unwrap());
    let controller = FanController::new(builder.build().unwrap(), config);
    let listen_addr = controller.start_listening().await.unwrap();
    (controller, listen_addr)
}

async fn next_update(sub: &mut Subscription) -> StateUpdate {
    timeout(WAIT, sub.next_state())
        .await
        .expect("no state update received")
        .expect("event bus closed")
}

// ============================================================================
// Command path
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn single_field_command_is_exact_json() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;

        controller
            .request_change("Sofa Fan", &CommandDelta::new().with_speed(4))
            .await
            .unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = timeout(WAIT, fan.commands.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], br#"{"speed":4}"#);
    }

    #[tokio::test]
    async fn batched_command_carries_every_field() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;

        let delta = CommandDelta::power_on()
            .with_speed(6)
            .with_led(false)
            .with_sleep(true)
            .with_timer(2);
        controller.request_change("Sofa Fan", &delta).await.unwrap();

        assert_eq!(
            fan.next_command().await,
            serde_json::json!({"power": true, "speed": 6, "led": false, "sleep": true, "timer": 2})
        );
    }

    #[tokio::test]
    async fn repeated_command_is_sent_twice() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;
        let delta = CommandDelta::new().with_power(true);

        controller.request_change("Sofa Fan", &delta).await.unwrap();
        controller.request_change("Sofa Fan", &delta).await.unwrap();

        let first = fan.next_command().await;
        let second = fan.next_command().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn invalid_speed_sends_nothing() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;

        let err = controller
            .request_change("Sofa Fan", &CommandDelta::new().with_speed(9))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Value(_)));

        let mut buf = [0u8; 64];
        let nothing = timeout(
            Duration::from_millis(200),
            fan.commands.recv_from(&mut buf),
        )
        .await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn speed_delta_is_forwarded() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;

        controller
            .request_change("Sofa Fan", &CommandDelta::new().with_speed_delta(-1))
            .await
            .unwrap();
        assert_eq!(
            fan.next_command().await,
            serde_json::json!({"speedDelta": -1})
        );
    }
}

// ============================================================================
// Telemetry path
// ============================================================================

mod telemetry {
    use super::*;

    #[tokio::test]
    async fn broadcast_updates_named_state() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut sub = controller.on_state_changed();

        // power on, LED on, speed 6
        fan.broadcast(listen, 0x36).await;

        let update = next_update(&mut sub).await;
        assert_eq!(update.name.as_deref(), Some("Sofa Fan"));
        assert_eq!(update.device_id.as_deref(), Some("a1b2c3"));
        assert!(update.state.power());
        assert!(update.state.led());
        assert_eq!(update.state.speed().value(), 6);
        assert_eq!(controller.current_state("Sofa Fan"), Some(update.state));
        assert!(controller.record("Sofa Fan").unwrap().is_observed());
    }

    #[tokio::test]
    async fn command_then_broadcast_round_trip() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut sub = controller.on_state_changed();

        controller
            .request_change("Sofa Fan", &CommandDelta::new().with_timer(3))
            .await
            .unwrap();
        let command = fan.next_command().await;
        assert_eq!(command["timer"], 3);
        assert_eq!(controller.current_state("Sofa Fan"), None);

        // The fan reports the timer with 45 minutes elapsed
        fan.broadcast(listen, (45 << 24) | (3 << 16) | 0x10).await;

        let update = next_update(&mut sub).await;
        assert_eq!(update.state.timer().value(), 3);
        assert_eq!(update.state.timer_elapsed_minutes(), 45);
        assert_eq!(update.state.timer_remaining_minutes(), Some(135));
    }

    #[tokio::test]
    async fn malformed_broadcasts_do_not_stop_listener() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut sub = controller.on_state_changed();

        fan.broadcast_raw(listen, b"\xff\xfe").await;
        fan.broadcast_raw(listen, br#"{"other":1}"#).await;
        fan.broadcast_raw(listen, br#"{"state_string":"fast"}"#).await;
        fan.broadcast(listen, 0x11).await;

        let update = next_update(&mut sub).await;
        assert_eq!(update.state.speed().value(), 1);

        let diagnostics = controller.diagnostics();
        assert_eq!(diagnostics.received, 4);
        assert_eq!(diagnostics.malformed, 3);
        assert_eq!(diagnostics.accepted, 1);
        assert!(controller.listener_state().is_listening());
    }

    #[tokio::test]
    async fn two_fans_are_cached_separately() {
        let sofa = FakeFan::bind("127.0.0.1").await;
        let table = FakeFan::bind("127.0.0.2").await;
        let (controller, listen) =
            controller_for(&[("Sofa Fan", &sofa), ("Table Fan", &table)]).await;
        let mut sub = controller.on_state_changed();

        sofa.broadcast(listen, 0x12).await;
        next_update(&mut sub).await;
        table.broadcast(listen, 0x24).await;
        next_update(&mut sub).await;

        let sofa_state = controller.current_state("Sofa Fan").unwrap();
        let table_state = controller.current_state("Table Fan").unwrap();
        assert!(sofa_state.power());
        assert_eq!(sofa_state.speed().value(), 2);
        assert!(!table_state.power());
        assert!(table_state.led());
        assert_eq!(table_state.speed().value(), 4);
    }

    #[tokio::test]
    async fn toggle_uses_observed_state() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut sub = controller.on_state_changed();

        assert!(matches!(
            controller.toggle_power("Sofa Fan").await,
            Err(Error::StateUnknown(_))
        ));

        fan.broadcast(listen, 0x13).await;
        next_update(&mut sub).await;

        controller.toggle_power("Sofa Fan").await.unwrap();
        assert_eq!(fan.next_command().await, serde_json::json!({"power": false}));

        controller.step_speed("Sofa Fan", 1).await.unwrap();
        assert_eq!(fan.next_command().await, serde_json::json!({"speed": 4}));
    }
}

// ============================================================================
// Subscribers and lifecycle
// ============================================================================

mod subscribers {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_every_update_in_order() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut subs: Vec<Subscription> = (0..4).map(|_| controller.on_state_changed()).collect();

        for speed in 0..=6u32 {
            fan.broadcast(listen, 0x10 | speed).await;
            // Loopback keeps order, but give the listener a moment per datagram
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        for sub in &mut subs {
            let mut seen = Vec::new();
            for _ in 0..=6 {
                seen.push(next_update(sub).await.state.speed().value());
            }
            assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6]);
        }
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_torn_state() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        let controller = std::sync::Arc::new(controller);
        let mut sub = controller.on_state_changed();

        // Two states that differ in every field; any mix would be detectable
        let a: u32 = 0x0000_0000;
        let b: u32 = (200 << 24) | (4 << 16) | 0xB6;

        let reader = {
            let controller = std::sync::Arc::clone(&controller);
            tokio::spawn(async move {
                for _ in 0..2000 {
                    if let Some(state) = controller.current_state("Sofa Fan") {
                        let packed = state.to_packed();
                        assert!(packed == a || packed == b, "torn state {packed:#x}");
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for i in 0..50 {
            fan.broadcast(listen, if i % 2 == 0 { a } else { b }).await;
            next_update(&mut sub).await;
        }

        reader.await.unwrap();
    }

    #[tokio::test]
    async fn subscribers_see_listener_stop() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, _) = controller_for(&[("Sofa Fan", &fan)]).await;
        let mut sub = controller.on_state_changed();

        controller.stop_listening().await;
        assert_eq!(controller.listener_state(), ListenerState::Stopped);

        let event = timeout(WAIT, sub.recv()).await.unwrap().unwrap();
        assert_eq!(event, DeviceEvent::ListenerStopped);
    }

    #[tokio::test]
    async fn restart_on_same_port_after_stop() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;
        controller.stop_listening().await;

        let registry = DeviceRegistry::builder()
            .device("Sofa Fan", fan.command_addr().into())
            .build()
            .unwrap();
        let again = FanController::new(
            registry,
            ControllerConfig::default().with_telemetry_bind(listen),
        );
        let rebound = timeout(WAIT, again.start_listening()).await.unwrap().unwrap();
        assert_eq!(rebound, listen);

        let mut sub = again.on_state_changed();
        fan.broadcast(listen, 0x10).await;
        assert!(next_update(&mut sub).await.state.power());
        again.stop_listening().await;
    }

    #[tokio::test]
    async fn second_listener_on_busy_port_fails_to_bind() {
        let fan = FakeFan::bind("127.0.0.1").await;
        let (_controller, listen) = controller_for(&[("Sofa Fan", &fan)]).await;

        let other = FanController::new(
            DeviceRegistry::default(),
            ControllerConfig::default().with_telemetry_bind(listen),
        );
        assert!(matches!(other.start_listening().await, Err(Error::Bind(_))));
        assert_eq!(other.listener_state(), ListenerState::Stopped);
    }
}
