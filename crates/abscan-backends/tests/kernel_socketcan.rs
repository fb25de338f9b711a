//! Socket transport tests on a real kernel CAN interface
//!
//! Run with: ABSCAN_TEST_CAN_IFACE=vcan0 cargo test -p abscan-backends --test kernel_socketcan -- --test-threads=1
//!
//! Note: Requires an existing interface, e.g.
//! `ip link add dev vcan0 type vcan && ip link set up vcan0`. Tests are
//! skipped when `ABSCAN_TEST_CAN_IFACE` is unset.

#![cfg(all(target_os = "linux", feature = "socketcan"))]

mod common;

use std::time::Duration;

use abscan_backends::{
    create_transport, CanTransport, ErrorKind, Frame, SocketConfig, SocketTransport,
    TransportConfig,
};
use pretty_assertions::assert_eq;
use serial_test::serial;

use common::{init_tracing, wait_until};

const IFACE_ENV: &str = "ABSCAN_TEST_CAN_IFACE";

fn test_interface() -> Option<String> {
    std::env::var(IFACE_ENV).ok().filter(|s| !s.is_empty())
}

/// Skip the test if no interface is configured
macro_rules! require_iface {
    () => {
        match test_interface() {
            Some(iface) => iface,
            None => {
                eprintln!("Skipping test: {} not set", IFACE_ENV);
                return;
            }
        }
    };
}

#[test]
#[serial]
fn test_open_and_capture_between_two_sockets() {
    init_tracing();
    let iface = require_iface!();

    let config = SocketConfig::new(iface.clone());
    let mut receiver = SocketTransport::open(&config).unwrap();
    let mut sender = SocketTransport::open(&config).unwrap();
    receiver.start().unwrap();
    assert!(wait_until(Duration::from_secs(1), || receiver.is_running()));

    let frames = [
        Frame::standard(0x100, &[0x01, 0x02]).unwrap(),
        Frame::extended(0x18DA_F110, &[0x02, 0x3E, 0x00]).unwrap(),
        Frame::standard(0x7FF, &[]).unwrap(),
    ];
    for frame in &frames {
        assert_eq!(sender.send(frame).unwrap(), 16);
    }

    let mut received = Vec::new();
    assert!(wait_until(Duration::from_secs(2), || {
        received.extend(receiver.poll_incoming().frames);
        received.len() >= frames.len()
    }));
    assert_eq!(received, frames.to_vec());

    receiver.stop();
    assert!(!receiver.is_running());
}

#[test]
#[serial]
fn test_factory_opens_socket() {
    init_tracing();
    let iface = require_iface!();

    let config = TransportConfig::Socket(SocketConfig {
        capture_on_open: true,
        ..SocketConfig::new(iface.clone())
    });
    let transport = create_transport(&config).unwrap();
    assert!(transport.is_alive());
    assert_eq!(transport.name(), iface);
}

#[test]
#[serial]
fn test_unknown_interface_fails_initialization() {
    init_tracing();
    let _iface = require_iface!();

    let err = SocketTransport::open(&SocketConfig::new("nocan9")).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Initialization);
    assert!(err.code().is_some());
}
