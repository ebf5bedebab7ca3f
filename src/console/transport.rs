//! Console byte transport
//!
//! The session never blocks on the transport. Writes that cannot be
//! accepted within `CONSOLE_WRITE_TIMEOUT_MS` are abandoned.

use crate::config::CONSOLE_WRITE_TIMEOUT_MS;

/// Console write failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    /// Peer did not accept the byte within the write timeout
    Timeout,
    /// Peer went away
    Disconnected,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ConsoleError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Timeout => defmt::write!(f, "Timeout"),
            Self::Disconnected => defmt::write!(f, "Disconnected"),
        }
    }
}

/// Non-blocking byte transport under the console
pub trait ConsoleTransport {
    /// Check if a terminal is open on the host side
    fn is_peer_connected(&self) -> bool;

    /// Number of received bytes ready to read
    fn bytes_available(&self) -> usize;

    /// Read one received byte
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one byte for transmission, false if there is no room
    fn write_byte(&mut self, byte: u8) -> bool;

    /// Push queued bytes to the host
    fn flush(&mut self);

    /// Monotonic millisecond clock used for write timeouts
    fn now_ms(&self) -> u32;

    /// Service the transport while waiting for write capacity
    fn service(&mut self) {}
}

/// Write one byte, waiting at most `CONSOLE_WRITE_TIMEOUT_MS` for room
pub fn write_byte_bounded<T: ConsoleTransport + ?Sized>(
    transport: &mut T,
    byte: u8,
) -> Result<(), ConsoleError> {
    let start = transport.now_ms();
    loop {
        if !transport.is_peer_connected() {
            return Err(ConsoleError::Disconnected);
        }
        if transport.write_byte(byte) {
            return Ok(());
        }
        if transport.now_ms().wrapping_sub(start) > CONSOLE_WRITE_TIMEOUT_MS {
            return Err(ConsoleError::Timeout);
        }
        transport.service();
    }
}

/// Write a string byte by byte and flush
///
/// The first byte that cannot be written abandons the rest of the string.
/// Whatever was queued is still flushed.
pub fn write_str_bounded<T: ConsoleTransport + ?Sized>(
    transport: &mut T,
    text: &str,
) -> Result<(), ConsoleError> {
    let result = text
        .bytes()
        .try_for_each(|byte| write_byte_bounded(transport, byte));
    transport.flush();
    result
}
