//! Feature Unit Control Requests
//!
//! Hosts query mute and volume on the microphone's feature unit before
//! they start recording, and some refuse to stream if those requests fail.
//! The device has no real gain stage: queries get fixed answers and sets
//! are accepted without effect.
//!
//! Requests are looked up by (entity, control selector) in a static table.
//! Anything not in the table is reported as not handled, which the USB
//! shell turns into a STALL.

use heapless::Vec;

use crate::config::entities::FEATURE_UNIT;

/// UAC1 class-specific request codes
pub mod request {
    //! bRequest values

    /// Set current value
    pub const SET_CUR: u8 = 0x01;
    /// Set resolution
    pub const SET_RES: u8 = 0x04;
    /// Get current value
    pub const GET_CUR: u8 = 0x81;
    /// Get minimum
    pub const GET_MIN: u8 = 0x82;
    /// Get maximum
    pub const GET_MAX: u8 = 0x83;
    /// Get resolution
    pub const GET_RES: u8 = 0x84;
}

/// Feature unit control selectors
pub mod selector {
    //! High byte of wValue

    /// Mute control
    pub const MUTE: u8 = 0x01;
    /// Volume control
    pub const VOLUME: u8 = 0x02;
}

/// Volume at maximum attenuation (1/256 dB units, 0x8000)
pub const VOLUME_MIN: i16 = i16::MIN;

/// Volume at unity gain
pub const VOLUME_MAX: i16 = 0;

/// Volume step (1 dB)
pub const VOLUME_RES: i16 = 0x0100;

/// Largest reply payload
pub const MAX_REPLY_LEN: usize = 4;

/// Reply payload
pub type ControlReply = Vec<u8, MAX_REPLY_LEN>;

/// Decoded class request addressed to an audio entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlRequest {
    /// bRequest
    pub request: u8,
    /// Target unit/terminal ID
    pub entity: u8,
    /// Control selector
    pub selector: u8,
    /// Host-requested data length
    pub length: u16,
}

impl ControlRequest {
    /// Decode from SETUP fields (entity in wIndex high byte, selector in
    /// wValue high byte)
    #[must_use]
    pub const fn from_setup(request: u8, value: u16, index: u16, length: u16) -> Self {
        Self {
            request,
            entity: (index >> 8) as u8,
            selector: (value >> 8) as u8,
            length,
        }
    }

    /// Check if this is a GET request
    #[must_use]
    pub const fn is_get(&self) -> bool {
        self.request & 0x80 != 0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControlRequest {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "req={:#x} entity={} sel={} len={}",
            self.request,
            self.entity,
            self.selector,
            self.length
        );
    }
}

/// Value returned by a control
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ControlValue {
    /// Layout 1 (one byte)
    U8(u8),
    /// Layout 2 (little-endian word)
    I16(i16),
}

/// GET handler: request code to value, None if unsupported
type GetHandler = fn(u8) -> Option<ControlValue>;

struct ControlEntry {
    entity: u8,
    selector: u8,
    get: GetHandler,
}

fn get_mute(code: u8) -> Option<ControlValue> {
    // Always unmuted
    (code == request::GET_CUR).then_some(ControlValue::U8(0))
}

fn get_volume(code: u8) -> Option<ControlValue> {
    match code {
        request::GET_CUR | request::GET_MAX => Some(ControlValue::I16(VOLUME_MAX)),
        request::GET_MIN => Some(ControlValue::I16(VOLUME_MIN)),
        request::GET_RES => Some(ControlValue::I16(VOLUME_RES)),
        _ => None,
    }
}

static CONTROLS: [ControlEntry; 2] = [
    ControlEntry {
        entity: FEATURE_UNIT,
        selector: selector::MUTE,
        get: get_mute,
    },
    ControlEntry {
        entity: FEATURE_UNIT,
        selector: selector::VOLUME,
        get: get_volume,
    },
];

fn lookup(entity: u8, selector: u8) -> Option<&'static ControlEntry> {
    CONTROLS
        .iter()
        .find(|entry| entry.entity == entity && entry.selector == selector)
}

/// Answer a GET request, None if not handled
///
/// The reply is truncated to the host's requested length.
#[must_use]
pub fn handle_get(req: &ControlRequest) -> Option<ControlReply> {
    if !req.is_get() {
        return None;
    }
    let Some(entry) = lookup(req.entity, req.selector) else {
        debug!("control: unhandled GET {:?}", req);
        return None;
    };
    let value = (entry.get)(req.request)?;

    // Payloads never exceed MAX_REPLY_LEN
    let mut reply = ControlReply::new();
    match value {
        ControlValue::U8(v) => {
            let _ = reply.push(v);
        }
        ControlValue::I16(v) => {
            let _ = reply.extend_from_slice(&v.to_le_bytes());
        }
    }
    reply.truncate(usize::from(req.length));
    Some(reply)
}

/// Accept a SET request, false if not handled
///
/// Known controls accept any value and keep no state.
#[must_use]
pub fn handle_set(req: &ControlRequest, data: &[u8]) -> bool {
    let known = !req.is_get()
        && (request::SET_CUR..=request::SET_RES).contains(&req.request)
        && lookup(req.entity, req.selector).is_some();
    if known {
        trace!("control: SET ignored ({} bytes)", data.len());
    } else {
        debug!("control: unhandled SET {:?}", req);
    }
    known
}
