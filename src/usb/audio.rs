//! USB Audio Class 1.0 Microphone
//!
//! Builds the audio function (control + streaming interfaces), answers
//! feature unit requests from the control table, and runs the isochronous
//! IN pipe on top of `StreamScheduler`.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::descriptor::{SynchronizationType, UsageType};
use embassy_usb::driver::{Driver, Endpoint, EndpointIn, EndpointType};
use embassy_usb::types::InterfaceNumber;
use embassy_usb::{Builder, Handler};
use heapless::Vec;

use crate::audio::control::{self, ControlRequest};
use crate::audio::scheduler::{IsoTransport, StreamScheduler};
use crate::config::interfaces::{ALT_STREAMING, AUDIO_STREAMING};
use crate::config::{entities, PACKET_BYTES, PACKET_INTERVAL_MS};
use crate::usb::{UsbDriver, LINK};

/// Isochronous IN endpoint type of the driver
pub type IsoEndpoint = <UsbDriver as Driver<'static>>::EndpointIn;

/// Latest SET_INTERFACE on the streaming interface
static ALT_SETTING: Signal<CriticalSectionRawMutex, u8> = Signal::new();

const AUDIO_CLASS: u8 = 0x01;
const SUBCLASS_CONTROL: u8 = 0x01;
const SUBCLASS_STREAMING: u8 = 0x02;
const CS_INTERFACE: u8 = 0x24;
const CS_ENDPOINT: u8 = 0x25;

/// Class-specific descriptor bodies (length and type are added by the
/// builder)
mod descriptors {
    use super::entities;

    /// AC header: UAC 1.00, 39 bytes total, one streaming interface
    pub const fn ac_header(streaming_interface: u8) -> [u8; 7] {
        [0x01, 0x00, 0x01, 0x27, 0x00, 0x01, streaming_interface]
    }

    /// Input terminal: radio receiver, stereo (L/R carry I/Q)
    pub const INPUT_TERMINAL: [u8; 10] = [
        0x02,
        entities::INPUT_TERMINAL,
        0x10, 0x07, // wTerminalType = Radio Receiver
        0x00,
        0x02, // bNrChannels
        0x03, 0x00, // Left Front | Right Front
        0x00,
        0x00,
    ];

    /// Feature unit with master mute
    pub const FEATURE_UNIT: [u8; 7] = [
        0x06,
        entities::FEATURE_UNIT,
        entities::INPUT_TERMINAL,
        0x01, // bControlSize
        0x01, // master: mute
        0x00,
        0x00,
    ];

    /// Output terminal: USB streaming
    pub const OUTPUT_TERMINAL: [u8; 7] = [
        0x03,
        entities::OUTPUT_TERMINAL,
        0x01, 0x01, // wTerminalType = USB Streaming
        0x00,
        entities::FEATURE_UNIT,
        0x00,
    ];

    /// AS general: linked to the output terminal, PCM
    pub const AS_GENERAL: [u8; 5] = [0x01, entities::OUTPUT_TERMINAL, 0x01, 0x01, 0x00];

    /// Format type I: 2 channels, 2-byte subframes, 16 bits, 48 kHz
    pub const FORMAT_TYPE_I: [u8; 9] = [0x02, 0x01, 0x02, 0x02, 0x10, 0x01, 0x80, 0xBB, 0x00];

    /// Class-specific isochronous endpoint: no controls, no lock delay
    pub const AS_ENDPOINT: [u8; 5] = [0x01, 0x00, 0x00, 0x00, 0x00];
}

/// Routes class requests and alternate settings of the audio function
pub struct AudioHandler {
    /// Audio control interface
    control_iface: InterfaceNumber,
    /// Audio streaming interface
    stream_iface: InterfaceNumber,
}

impl Handler for AudioHandler {
    fn configured(&mut self, configured: bool) {
        info!("usb: configured={}", configured);
        LINK.set_mounted(configured);
    }

    fn suspended(&mut self, suspended: bool) {
        info!("usb: suspended={}", suspended);
        LINK.set_suspended(suspended);
    }

    fn set_alternate_setting(&mut self, iface: InterfaceNumber, alternate_setting: u8) {
        if iface == self.stream_iface {
            ALT_SETTING.signal(alternate_setting);
        }
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        if !self.is_ours(&req) {
            return None;
        }
        let request = ControlRequest::from_setup(req.request, req.value, req.index, req.length);
        if control::handle_set(&request, data) {
            Some(OutResponse::Accepted)
        } else {
            Some(OutResponse::Rejected)
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if !self.is_ours(&req) {
            return None;
        }
        let request = ControlRequest::from_setup(req.request, req.value, req.index, req.length);
        match control::handle_get(&request) {
            Some(reply) => {
                let n = reply.len().min(buf.len());
                buf[..n].copy_from_slice(&reply[..n]);
                Some(InResponse::Accepted(&buf[..n]))
            }
            None => Some(InResponse::Rejected),
        }
    }
}

impl AudioHandler {
    /// Class request addressed to the audio control interface
    fn is_ours(&self, req: &Request) -> bool {
        req.request_type == RequestType::Class
            && req.recipient == Recipient::Interface
            && (req.index & 0xFF) as u8 == self.control_iface.0
    }
}

/// Add the UAC1 microphone function to `builder`
///
/// Returns the control handler (to be registered with the builder once it
/// has a `'static` home) and the isochronous IN endpoint.
pub fn build(builder: &mut Builder<'static, UsbDriver>) -> (AudioHandler, IsoEndpoint) {
    let mut func = builder.function(AUDIO_CLASS, SUBCLASS_CONTROL, 0x00);

    // Streaming interface number must be known for the AC header, and
    // interfaces are numbered in allocation order.
    let mut control_iface = func.interface();
    let control_number = control_iface.interface_number();
    let stream_number = InterfaceNumber(control_number.0 + 1);
    {
        let mut alt = control_iface.alt_setting(AUDIO_CLASS, SUBCLASS_CONTROL, 0x00, None);
        alt.descriptor(CS_INTERFACE, &descriptors::ac_header(stream_number.0));
        alt.descriptor(CS_INTERFACE, &descriptors::INPUT_TERMINAL);
        alt.descriptor(CS_INTERFACE, &descriptors::FEATURE_UNIT);
        alt.descriptor(CS_INTERFACE, &descriptors::OUTPUT_TERMINAL);
    }

    let mut stream_iface = func.interface();
    // Alt 0: zero bandwidth
    let _ = stream_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, 0x00, None);
    let mut alt = stream_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, 0x00, None);
    alt.descriptor(CS_INTERFACE, &descriptors::AS_GENERAL);
    alt.descriptor(CS_INTERFACE, &descriptors::FORMAT_TYPE_I);
    let endpoint = alt.alloc_endpoint_in(
        EndpointType::Isochronous,
        PACKET_BYTES as u16,
        PACKET_INTERVAL_MS as u8,
    );
    alt.endpoint_descriptor(
        endpoint.info(),
        SynchronizationType::Asynchronous,
        UsageType::DataEndpoint,
        &[0x00, 0x00],
    );
    alt.descriptor(CS_ENDPOINT, &descriptors::AS_ENDPOINT);

    (
        AudioHandler {
            control_iface: control_number,
            stream_iface: stream_number,
        },
        endpoint,
    )
}

/// Holds the packet queued for the next isochronous write
struct PacketSlot {
    packet: Vec<u8, PACKET_BYTES>,
}

impl IsoTransport for PacketSlot {
    fn transmit(&mut self, packet: &[u8]) {
        self.packet.clear();
        // Packets are exactly PACKET_BYTES long
        let _ = self.packet.extend_from_slice(packet);
    }
}

/// Feed the isochronous IN pipe
///
/// The completion of each `write` is the transfer-complete event for the
/// scheduler. An endpoint error counts as a missed interval: the next block
/// is produced anyway.
#[embassy_executor::task]
pub async fn stream_task(mut endpoint: IsoEndpoint, mut scheduler: StreamScheduler<'static>) -> ! {
    let mut slot = PacketSlot { packet: Vec::new() };

    loop {
        let alt = ALT_SETTING.wait().await;
        if alt == ALT_STREAMING {
            endpoint.wait_enabled().await;
        }
        scheduler.on_set_interface(AUDIO_STREAMING, alt, &mut slot);
        LINK.set_streaming(scheduler.is_active());

        while scheduler.is_active() {
            match select(endpoint.write(&slot.packet), ALT_SETTING.wait()).await {
                Either::First(result) => {
                    if result.is_err() {
                        endpoint.wait_enabled().await;
                    }
                    scheduler.on_transfer_complete(&mut slot);
                }
                Either::Second(alt) => {
                    scheduler.on_set_interface(AUDIO_STREAMING, alt, &mut slot);
                    LINK.set_streaming(scheduler.is_active());
                }
            }
        }
    }
}
