//! SDR_DEV Test-Signal Firmware Library
//!
//! This library provides the core of a composite USB device that looks,
//! to a host, like a virtual serial console plus a stereo microphone. The
//! microphone carries a synthetic I/Q "received signal" so SDR software can
//! be exercised without a radio front end.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FOREGROUND (polled)                       │
//! │  ConsoleSession ── parses gen_on / gen_off                   │
//! ├──────────────────────────┬──────────────────────────────────┤
//! │                    SharedMode (atomic)                       │
//! ├──────────────────────────┴──────────────────────────────────┤
//! │                 TIME-CRITICAL (transfer done)                │
//! │  StreamScheduler ── SignalGenerator ── 192-byte ISO packet   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   USB SHELL (embedded only)                  │
//! │  embassy-usb: CDC ACM  │  UAC1 microphone  │  control table  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only state the two contexts share is the generator mode. Everything
//! above the USB shell is portable and tested on the host with the `std`
//! feature.

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

#[macro_use]
mod fmt;

/// Digital Signal Processing
///
/// Tone oscillator, noise floor and the block signal generator.
pub mod dsp;

/// Audio Streaming
///
/// Isochronous packet scheduling and the feature-unit control table.
pub mod audio;

/// Serial Console
///
/// Line-oriented command interpreter over a byte transport.
pub mod console;

/// Console command protocol
pub mod protocol;

/// USB Subsystem
///
/// embassy-usb glue for the CDC ACM console and the UAC1 microphone.
#[cfg(feature = "embedded")]
pub mod usb;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
