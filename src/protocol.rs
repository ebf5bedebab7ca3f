//! Console Protocol
//!
//! Line editing and command parsing for the text console. The byte-level
//! editor knows nothing about the transport; it turns each received byte
//! into a [`LineEvent`] that the session renders.

use heapless::Vec;

use crate::config::CONSOLE_LINE_CAPACITY;
use crate::types::GeneratorMode;

/// Backspace
const BS: u8 = 0x08;
/// Delete (sent by most terminals for the backspace key)
const DEL: u8 = 0x7F;

/// Terminal sequence that visually erases the last character
pub const ERASE_SEQUENCE: &str = "\x08 \x08";

/// Blank line emitted after every line terminator
pub const LINE_BREAK: &str = "\r\n\r\n";

/// Help text for unrecognized commands
pub const HELP_TEXT: &str = "Unknown command.\r\nAvailable:\r\n gen_on\r\n gen_off\r\n";

/// Outcome of feeding one byte to the line editor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEvent {
    /// Printable character; echo it (stored only if capacity remains)
    Echo(u8),
    /// Last character removed; erase it on the terminal
    Erase,
    /// Line terminated; dispatch `line()` then `clear()`
    Submit,
    /// Control character discarded the pending line
    Cancel,
    /// Nothing to do
    Ignored,
}

/// Bounded line editor
///
/// Holds up to `CONSOLE_LINE_CAPACITY` printable characters. Extra
/// characters are echoed but silently dropped.
#[derive(Clone, Debug, Default)]
pub struct LineEditor {
    /// Pending characters (printable ASCII only)
    buffer: Vec<u8, CONSOLE_LINE_CAPACITY>,
}

impl LineEditor {
    /// Create an empty line editor
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one received byte
    ///
    /// CR and LF each terminate a line, so CR LF submits twice.
    pub fn feed(&mut self, byte: u8) -> LineEvent {
        match byte {
            0x20..=0x7E => {
                // Full buffer drops the character, the echo still happens
                let _ = self.buffer.push(byte);
                LineEvent::Echo(byte)
            }
            b'\r' | b'\n' => LineEvent::Submit,
            BS | DEL if !self.buffer.is_empty() => {
                self.buffer.pop();
                LineEvent::Erase
            }
            DEL => LineEvent::Ignored,
            _ if byte < 0x20 => {
                if self.buffer.is_empty() {
                    LineEvent::Ignored
                } else {
                    self.buffer.clear();
                    LineEvent::Cancel
                }
            }
            // 0x80..=0xFF: not part of the console alphabet
            _ => LineEvent::Ignored,
        }
    }

    /// Get the pending line
    #[must_use]
    pub fn line(&self) -> &str {
        // Only printable ASCII is ever stored
        core::str::from_utf8(&self.buffer).unwrap_or("")
    }

    /// Get the number of pending characters
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if no characters are pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the pending line
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Console command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `gen_on`: tone plus noise
    GenOn,
    /// `gen_off`: noise floor only
    GenOff,
    /// Anything else
    Unknown,
}

impl ConsoleCommand {
    /// Parse a line (exact, case-sensitive match after trimming)
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "gen_on" => Self::GenOn,
            "gen_off" => Self::GenOff,
            _ => Self::Unknown,
        }
    }

    /// Get the generator mode this command selects, if any
    #[must_use]
    pub const fn target_mode(self) -> Option<GeneratorMode> {
        match self {
            Self::GenOn => Some(GeneratorMode::On),
            Self::GenOff => Some(GeneratorMode::Off),
            Self::Unknown => None,
        }
    }

    /// Get the response text for this command
    #[must_use]
    pub const fn response(self) -> &'static str {
        match self {
            Self::GenOn => "Audio generator: ON (IQ +1kHz S9+20 sine)\r\n",
            Self::GenOff => "Audio generator: OFF\r\n",
            Self::Unknown => HELP_TEXT,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ConsoleCommand {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::GenOn => defmt::write!(f, "gen_on"),
            Self::GenOff => defmt::write!(f, "gen_off"),
            Self::Unknown => defmt::write!(f, "unknown"),
        }
    }
}
