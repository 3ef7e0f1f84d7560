//! Security validator boundary cases exercised through the public API.

use janus::security::{SecurityConfig, SecurityValidator};

#[test]
fn socket_path_length_boundary_108_vs_109() {
    let config = SecurityConfig::default();
    let ok = format!("/tmp/{}", "a".repeat(103));
    assert_eq!(ok.len(), 108);
    assert!(SecurityValidator::validate_socket_path(&ok, &config).is_ok());

    let too_long = format!("/tmp/{}", "a".repeat(104));
    assert_eq!(too_long.len(), 109);
    assert!(SecurityValidator::validate_socket_path(&too_long, &config).is_err());
}

#[test]
fn timeout_boundary_0_1_and_300_seconds() {
    let config = SecurityConfig::default();
    assert!(SecurityValidator::validate_timeout(0.1, &config).is_ok());
    assert!(SecurityValidator::validate_timeout(0.099, &config).is_err());
    assert!(SecurityValidator::validate_timeout(300.0, &config).is_ok());
    assert!(SecurityValidator::validate_timeout(300.01, &config).is_err());
}

#[test]
fn uuid_must_be_version_4() {
    assert!(SecurityValidator::validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
    assert!(SecurityValidator::validate_uuid("not-a-uuid").is_err());
}

#[test]
fn timestamp_rejects_impossible_calendar_dates() {
    assert!(SecurityValidator::validate_timestamp("2025-02-30T00:00:00.000Z").is_err());
    assert!(SecurityValidator::validate_timestamp("2025-07-29T10:50:00.000Z").is_ok());
}
