//! Configuration loading and transport factory tests
//!
//! Run with: cargo test -p abscan-backends --test config_factory

mod common;

use std::io::Write;

use abscan_backends::vendor::{SimulatedDriver, Status};
use abscan_backends::{
    config::ConfigError, create_transport, create_vendor_transport, CanTransport, ErrorKind,
    Frame, MockConfig, TransportConfig, VendorConfig,
};
use pretty_assertions::assert_eq;

use common::init_tracing;

#[test]
fn test_mock_transport_from_config() {
    init_tracing();
    let config = TransportConfig::from_toml_str(
        r#"
        type = "mock"
        bitrate = 125000
        "#,
    )
    .unwrap();

    let mut transport = create_transport(&config).unwrap();
    assert!(transport.is_running());
    assert_eq!(transport.name(), "vendor:0x51");

    let frame = Frame::standard(0x7E0, &[0x02, 0x10, 0x03]).unwrap();
    assert_eq!(transport.send(&frame).unwrap(), 3);

    let incoming = transport.poll_incoming();
    assert_eq!(incoming.frames, vec![frame]);
}

#[test]
fn test_mock_without_loopback() {
    init_tracing();
    let config = TransportConfig::Mock(MockConfig {
        vendor: VendorConfig::default(),
        loopback: false,
    });

    let mut transport = create_transport(&config).unwrap();
    transport.send(&Frame::standard(0x1, &[]).unwrap()).unwrap();
    assert!(!transport.poll_incoming().has_frames());
}

#[test]
fn test_default_config_is_mock() {
    init_tracing();
    let transport = create_transport(&TransportConfig::default()).unwrap();
    assert!(transport.is_alive());
}

#[test]
fn test_vendor_config_needs_driver() {
    init_tracing();
    let config = TransportConfig::Vendor(VendorConfig::default());
    let err = create_transport(&config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_vendor_transport_with_supplied_driver() {
    init_tracing();
    let driver = SimulatedDriver::new();
    let handle = driver.handle();

    let mut transport = create_vendor_transport(driver, &VendorConfig::default()).unwrap();
    assert!(handle.is_initialized());

    handle.inject(&Frame::extended(0x18DB_33F1, &[0x02, 0x01, 0x00]).unwrap());
    assert_eq!(transport.poll_incoming().frames.len(), 1);
}

#[test]
fn test_vendor_transport_init_failure() {
    init_tracing();
    let driver = SimulatedDriver::new();
    driver.handle().set_reset_status(Some(Status::ILLHW));

    let err = create_vendor_transport(driver, &VendorConfig::default())
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Initialization);
}

#[test]
fn test_invalid_config_rejected_before_open() {
    init_tracing();
    let config = TransportConfig::Mock(MockConfig {
        vendor: VendorConfig {
            bitrate: 123,
            ..Default::default()
        },
        loopback: true,
    });
    let err = create_transport(&config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn test_load_from_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
type = "vendor"
channel = 0x52
bitrate = 500000
listen_only = true
"#
    )
    .unwrap();

    let config = TransportConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config,
        TransportConfig::Vendor(VendorConfig {
            channel: 0x52,
            bitrate: 500_000,
            listen_only: true,
        })
    );
}

#[test]
fn test_missing_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let err = TransportConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_invalid_values_in_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "type = \"socket\"\ninterface = \"\"").unwrap();

    let err = TransportConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[cfg(not(all(target_os = "linux", feature = "socketcan")))]
#[test]
fn test_socket_unsupported_without_socketcan() {
    let config = TransportConfig::Socket(abscan_backends::SocketConfig::new("can0"));
    let err = create_transport(&config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}
