//! Feature Unit Control Tests
//!
//! Tests for the mute/volume request table.

use sdr_dev_firmware::audio::control::{
    handle_get, handle_set, request, selector, ControlRequest, VOLUME_MAX, VOLUME_MIN, VOLUME_RES,
};
use sdr_dev_firmware::config::entities::{FEATURE_UNIT, INPUT_TERMINAL};

fn get(code: u8, entity: u8, sel: u8, length: u16) -> Option<Vec<u8>> {
    let req = ControlRequest::from_setup(code, u16::from(sel) << 8, u16::from(entity) << 8 | 2, length);
    handle_get(&req).map(|reply| reply.to_vec())
}

fn set(code: u8, entity: u8, sel: u8, data: &[u8]) -> bool {
    let req = ControlRequest::from_setup(
        code,
        u16::from(sel) << 8,
        u16::from(entity) << 8 | 2,
        data.len() as u16,
    );
    handle_set(&req, data)
}

// =============================================================================
// Request decoding
// =============================================================================

#[test]
fn setup_fields_decoded() {
    // wValue = selector << 8 | channel, wIndex = entity << 8 | interface
    let req = ControlRequest::from_setup(request::GET_CUR, 0x0200, 0x0302, 2);
    assert_eq!(req.request, request::GET_CUR);
    assert_eq!(req.selector, selector::VOLUME);
    assert_eq!(req.entity, FEATURE_UNIT);
    assert_eq!(req.length, 2);
    assert!(req.is_get());
}

#[test]
fn set_codes_are_not_gets() {
    let req = ControlRequest::from_setup(request::SET_CUR, 0x0100, 0x0302, 1);
    assert!(!req.is_get());
}

// =============================================================================
// Mute
// =============================================================================

#[test]
fn mute_reports_unmuted() {
    assert_eq!(get(request::GET_CUR, FEATURE_UNIT, selector::MUTE, 1), Some(vec![0]));
}

#[test]
fn mute_has_no_range() {
    assert_eq!(get(request::GET_MIN, FEATURE_UNIT, selector::MUTE, 1), None);
    assert_eq!(get(request::GET_MAX, FEATURE_UNIT, selector::MUTE, 1), None);
    assert_eq!(get(request::GET_RES, FEATURE_UNIT, selector::MUTE, 1), None);
}

// =============================================================================
// Volume
// =============================================================================

#[test]
fn volume_current_is_unity() {
    assert_eq!(
        get(request::GET_CUR, FEATURE_UNIT, selector::VOLUME, 2),
        Some(vec![0x00, 0x00])
    );
}

#[test]
fn volume_range() {
    assert_eq!(
        get(request::GET_MIN, FEATURE_UNIT, selector::VOLUME, 2),
        Some(VOLUME_MIN.to_le_bytes().to_vec())
    );
    assert_eq!(
        get(request::GET_MIN, FEATURE_UNIT, selector::VOLUME, 2),
        Some(vec![0x00, 0x80])
    );
    assert_eq!(
        get(request::GET_MAX, FEATURE_UNIT, selector::VOLUME, 2),
        Some(VOLUME_MAX.to_le_bytes().to_vec())
    );
    assert_eq!(
        get(request::GET_RES, FEATURE_UNIT, selector::VOLUME, 2),
        Some(vec![0x00, 0x01])
    );
    assert_eq!(VOLUME_RES, 0x0100);
}

#[test]
fn reply_truncated_to_requested_length() {
    assert_eq!(
        get(request::GET_MIN, FEATURE_UNIT, selector::VOLUME, 1),
        Some(vec![0x00])
    );
    assert_eq!(
        get(request::GET_MIN, FEATURE_UNIT, selector::VOLUME, 0),
        Some(vec![])
    );
}

#[test]
fn reply_not_padded_to_longer_length() {
    assert_eq!(
        get(request::GET_CUR, FEATURE_UNIT, selector::VOLUME, 64),
        Some(vec![0x00, 0x00])
    );
    assert_eq!(get(request::GET_CUR, FEATURE_UNIT, selector::MUTE, 64), Some(vec![0]));
}

// =============================================================================
// Unhandled requests
// =============================================================================

#[test]
fn unknown_entity_stalls() {
    assert_eq!(get(request::GET_CUR, INPUT_TERMINAL, selector::MUTE, 1), None);
    assert_eq!(get(request::GET_CUR, 0x7F, selector::VOLUME, 2), None);
}

#[test]
fn unknown_selector_stalls() {
    // Bass control
    assert_eq!(get(request::GET_CUR, FEATURE_UNIT, 0x03, 1), None);
    assert_eq!(get(request::GET_CUR, FEATURE_UNIT, 0x00, 1), None);
}

#[test]
fn set_code_is_not_answered_as_get() {
    assert_eq!(get(request::SET_CUR, FEATURE_UNIT, selector::MUTE, 1), None);
}

// =============================================================================
// SET requests
// =============================================================================

#[test]
fn set_on_known_controls_accepted() {
    assert!(set(request::SET_CUR, FEATURE_UNIT, selector::MUTE, &[1]));
    assert!(set(request::SET_CUR, FEATURE_UNIT, selector::VOLUME, &[0x00, 0xF0]));
    assert!(set(request::SET_RES, FEATURE_UNIT, selector::VOLUME, &[0x00, 0x01]));
}

#[test]
fn set_has_no_effect() {
    assert!(set(request::SET_CUR, FEATURE_UNIT, selector::MUTE, &[1]));
    assert_eq!(get(request::GET_CUR, FEATURE_UNIT, selector::MUTE, 1), Some(vec![0]));
}

#[test]
fn set_on_unknown_controls_rejected() {
    assert!(!set(request::SET_CUR, INPUT_TERMINAL, selector::MUTE, &[1]));
    assert!(!set(request::SET_CUR, FEATURE_UNIT, 0x05, &[1]));
}

#[test]
fn get_code_is_not_accepted_as_set() {
    assert!(!set(request::GET_CUR, FEATURE_UNIT, selector::MUTE, &[]));
    // SET_MEM is outside the supported set
    assert!(!set(0x05, FEATURE_UNIT, selector::MUTE, &[0]));
}
