//! Shared types used across the firmware
//!
//! This module defines the small state enums that cross module boundaries,
//! and the one cell shared between the console and the audio path.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::SAMPLES_PER_PACKET;

/// One isochronous packet worth of interleaved I/Q samples
pub type AudioBlock = [i16; SAMPLES_PER_PACKET];

/// Test signal generator mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GeneratorMode {
    /// Noise floor only
    #[default]
    Off = 0,
    /// Tone plus noise floor
    On = 1,
}

impl GeneratorMode {
    /// Convert from the raw atomic representation
    #[must_use]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::On,
            _ => Self::Off,
        }
    }

    /// Check if the tone is enabled
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for GeneratorMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// Generator mode cell shared between the console and the audio path
///
/// Single writer (console dispatch), single reader (block fill). Both sides
/// use relaxed ordering: a change only has to become visible by some later
/// block, never by a particular one.
#[derive(Debug, Default)]
pub struct SharedMode(AtomicU8);

impl SharedMode {
    /// Create a new cell holding `mode`
    #[must_use]
    pub const fn new(mode: GeneratorMode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    /// Read the current mode
    pub fn load(&self) -> GeneratorMode {
        GeneratorMode::from_u8(self.0.load(Ordering::Relaxed))
    }

    /// Replace the current mode
    pub fn store(&self, mode: GeneratorMode) {
        self.0.store(mode as u8, Ordering::Relaxed);
    }
}

/// Audio streaming interface state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Zero-bandwidth alternate setting; nothing is produced
    #[default]
    Idle,
    /// Host opened the stream; one packet per transfer interval
    Active,
}

#[cfg(feature = "embedded")]
impl defmt::Format for StreamState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Active => defmt::write!(f, "Active"),
        }
    }
}

/// Console session state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No terminal open on the host
    #[default]
    NotConnected,
    /// Terminal just opened; greeting pending
    ConnectedFresh,
    /// Greeting sent; line buffer empty
    ConnectedGreeted,
    /// Characters pending in the line buffer
    ConnectedReading,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SessionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::NotConnected => defmt::write!(f, "NotConnected"),
            Self::ConnectedFresh => defmt::write!(f, "ConnectedFresh"),
            Self::ConnectedGreeted => defmt::write!(f, "ConnectedGreeted"),
            Self::ConnectedReading => defmt::write!(f, "ConnectedReading"),
        }
    }
}
