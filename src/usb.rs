//! USB Subsystem
//!
//! Composite device built on embassy-usb:
//! - CDC ACM for the command console
//! - UAC1 IN-only microphone carrying the I/Q test signal
//!
//! Link state (mounted / suspended / streaming) is tracked here for the
//! console gate and the status LED.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_stm32::peripherals;
use embassy_stm32::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::UsbDevice;

use crate::config::{
    USB_DEVICE_RELEASE, USB_EP0_PACKET_SIZE, USB_MANUFACTURER, USB_PID, USB_PRODUCT, USB_SERIAL,
    USB_VID,
};

pub mod audio;
pub mod cdc;

/// USB OTG FS driver used by every class
pub type UsbDriver = Driver<'static, peripherals::USB_OTG_FS>;

/// Device-wide link state
pub struct LinkState {
    /// Host configured the device
    mounted: AtomicBool,
    /// Bus suspended
    suspended: AtomicBool,
    /// Microphone stream open
    streaming: AtomicBool,
    /// Raised on any change
    changed: Signal<CriticalSectionRawMutex, ()>,
}

impl LinkState {
    /// Create link state for a detached device
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mounted: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
            changed: Signal::new(),
        }
    }

    /// Record configuration change
    pub fn set_mounted(&self, mounted: bool) {
        self.mounted.store(mounted, Ordering::Relaxed);
        if !mounted {
            self.streaming.store(false, Ordering::Relaxed);
        }
        self.changed.signal(());
    }

    /// Record suspend/resume
    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Relaxed);
        self.changed.signal(());
    }

    /// Record stream start/stop
    pub fn set_streaming(&self, streaming: bool) {
        self.streaming.store(streaming, Ordering::Relaxed);
        self.changed.signal(());
    }

    /// Check if the host can talk to the device
    pub fn is_usable(&self) -> bool {
        self.mounted.load(Ordering::Relaxed) && !self.suspended.load(Ordering::Relaxed)
    }

    /// Check if the microphone stream is open
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Relaxed)
    }

    /// Status indicator: lit while mounted and waiting, dark while
    /// streaming, suspended or detached
    pub fn indicator(&self) -> bool {
        self.is_usable() && !self.is_streaming()
    }

    /// Wait for the next change
    pub async fn wait_changed(&self) {
        self.changed.wait().await;
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// Global link state
pub static LINK: LinkState = LinkState::new();

/// Device descriptor configuration
#[must_use]
pub fn device_config() -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(USB_VID, USB_PID);
    config.manufacturer = Some(USB_MANUFACTURER);
    config.product = Some(USB_PRODUCT);
    config.serial_number = Some(USB_SERIAL);
    config.device_release = USB_DEVICE_RELEASE;
    config.max_power = 100;
    config.max_packet_size_0 = USB_EP0_PACKET_SIZE;

    // Miscellaneous / common class / IAD
    config.device_class = 0xEF;
    config.device_sub_class = 0x02;
    config.device_protocol = 0x01;
    config.composite_with_iads = true;
    config
}

/// Run the USB device state machine
#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}
