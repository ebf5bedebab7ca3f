//! System configuration and constants
//!
//! This module defines compile-time constants for the test-signal device.
//! Stream geometry, signal levels, console limits and USB identity are
//! centralized here.

/// Audio sample rate (48 kHz, fixed; no rate negotiation)
pub const AUDIO_SAMPLE_RATE: u32 = 48_000;

/// Channels per frame (I and Q)
pub const AUDIO_CHANNELS: usize = 2;

/// Bytes per sample (16-bit signed PCM)
pub const BYTES_PER_SAMPLE: usize = 2;

/// Sample resolution in bits
pub const BIT_RESOLUTION: u8 = 16;

/// Isochronous service interval in milliseconds
pub const PACKET_INTERVAL_MS: u32 = 1;

/// Frames carried in one isochronous packet (1 ms at 48 kHz)
pub const FRAMES_PER_PACKET: usize = (AUDIO_SAMPLE_RATE / 1000 * PACKET_INTERVAL_MS) as usize;

/// Interleaved samples in one packet
pub const SAMPLES_PER_PACKET: usize = FRAMES_PER_PACKET * AUDIO_CHANNELS;

/// Packet payload size in bytes
pub const PACKET_BYTES: usize = SAMPLES_PER_PACKET * BYTES_PER_SAMPLE;

/// Test tone frequency
pub const TONE_FREQUENCY_HZ: u32 = 1_000;

/// Test tone level (S9+20 on a typical receiver)
pub const TONE_LEVEL_DBFS: f32 = -53.0;

/// Injected noise floor level
pub const NOISE_LEVEL_DBFS: f32 = -96.0;

/// Noise generator seed applied at power-up
pub const NOISE_SEED: u32 = 0x1234_5678;

/// Largest tone period (in samples) the oscillator table can hold
pub const MAX_TONE_PERIOD: usize = 480;

/// Console line buffer capacity in characters
pub const CONSOLE_LINE_CAPACITY: usize = 15;

/// Bounded wait for console write capacity, per character
pub const CONSOLE_WRITE_TIMEOUT_MS: u32 = 10;

/// Console prompt
pub const CONSOLE_PROMPT: &str = "SDR_DEV> ";

/// Console greeting banner
pub const CONSOLE_BANNER: &str = "\r\nSDR_DEV ready.\r\n";

/// Command summary shown after the banner
pub const CONSOLE_COMMAND_SUMMARY: &str = "Commands:\r\n gen_on\r\n gen_off\r\n";

/// USB VID
pub const USB_VID: u16 = 0xCAFE;

/// USB PID
pub const USB_PID: u16 = 0x4003;

/// USB device release (BCD)
pub const USB_DEVICE_RELEASE: u16 = 0x0100;

/// USB manufacturer string
pub const USB_MANUFACTURER: &str = "R9OFG";

/// USB product string
pub const USB_PRODUCT: &str = "SDR_DEV";

/// USB serial number string
pub const USB_SERIAL: &str = "1234567890";

/// Control endpoint max packet size
pub const USB_EP0_PACKET_SIZE: u8 = 64;

/// USB CDC ACM packet size
pub const USB_CDC_PACKET_SIZE: u16 = 64;

/// CDC receive/transmit FIFO size
pub const CDC_FIFO_SIZE: usize = 64;

/// Interface numbers of the composite device
pub mod interfaces {
    //! Interface numbering fixed by the configuration descriptor

    /// CDC communication interface
    pub const CDC_CONTROL: u8 = 0;

    /// CDC data interface
    pub const CDC_DATA: u8 = 1;

    /// Audio control interface
    pub const AUDIO_CONTROL: u8 = 2;

    /// Audio streaming interface (microphone)
    pub const AUDIO_STREAMING: u8 = 3;

    /// Zero-bandwidth alternate setting
    pub const ALT_IDLE: u8 = 0;

    /// Operational alternate setting
    pub const ALT_STREAMING: u8 = 1;
}

/// Audio function entity identifiers
pub mod entities {
    //! Unit and terminal IDs of the audio control topology

    /// Input terminal (radio receiver)
    pub const INPUT_TERMINAL: u8 = 1;

    /// Output terminal (USB streaming)
    pub const OUTPUT_TERMINAL: u8 = 2;

    /// Feature unit carrying mute/volume
    pub const FEATURE_UNIT: u8 = 3;
}
