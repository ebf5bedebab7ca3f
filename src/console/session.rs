//! Console Session State Machine
//!
//! Drives the text console from the foreground loop. Each `poll` does one
//! step: open a session, greet, or consume all pending input. The only
//! side effect outside the console is the generator mode store.

use crate::config::{CONSOLE_BANNER, CONSOLE_COMMAND_SUMMARY, CONSOLE_PROMPT};
use crate::console::transport::{write_byte_bounded, write_str_bounded, ConsoleTransport};
use crate::protocol::{ConsoleCommand, LineEditor, LineEvent, ERASE_SEQUENCE, LINE_BREAK};
use crate::types::{SessionState, SharedMode};

/// Polled console session
pub struct ConsoleSession<'a> {
    /// Mode cell read by the signal generator
    mode: &'a SharedMode,
    /// Session state
    state: SessionState,
    /// Pending command line
    editor: LineEditor,
}

impl<'a> ConsoleSession<'a> {
    /// Create a session bound to the shared generator mode
    #[must_use]
    pub const fn new(mode: &'a SharedMode) -> Self {
        Self {
            mode,
            state: SessionState::NotConnected,
            editor: LineEditor::new(),
        }
    }

    /// Get session state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Get the pending (not yet submitted) line
    #[must_use]
    pub fn pending_line(&self) -> &str {
        self.editor.line()
    }

    /// Run one step of the session; never blocks beyond write timeouts
    pub fn poll<T: ConsoleTransport + ?Sized>(&mut self, transport: &mut T) {
        let connected = transport.is_peer_connected();

        match (self.state, connected) {
            (SessionState::NotConnected, false) => {}
            (_, false) => {
                info!("console: terminal closed");
                self.reset();
            }
            (SessionState::NotConnected, true) => {
                info!("console: terminal opened");
                Self::discard_input(transport);
                self.editor.clear();
                self.state = SessionState::ConnectedFresh;
            }
            (SessionState::ConnectedFresh, true) => {
                Self::emit(transport, CONSOLE_BANNER);
                Self::emit(transport, CONSOLE_COMMAND_SUMMARY);
                Self::emit(transport, CONSOLE_PROMPT);
                self.state = SessionState::ConnectedGreeted;
            }
            (SessionState::ConnectedGreeted | SessionState::ConnectedReading, true) => {
                self.process_input(transport);
            }
        }
    }

    /// Return to not-connected; the next connection is greeted again
    pub fn reset(&mut self) {
        self.state = SessionState::NotConnected;
        self.editor.clear();
    }

    /// Drop input left over from a previous session
    fn discard_input<T: ConsoleTransport + ?Sized>(transport: &mut T) {
        while transport.bytes_available() > 0 {
            if transport.read_byte().is_none() {
                break;
            }
        }
    }

    fn process_input<T: ConsoleTransport + ?Sized>(&mut self, transport: &mut T) {
        let mut echoed = false;

        while transport.bytes_available() > 0 {
            let Some(byte) = transport.read_byte() else {
                break;
            };

            match self.editor.feed(byte) {
                LineEvent::Echo(ch) => {
                    if let Err(e) = write_byte_bounded(transport, ch) {
                        trace!("console: echo dropped ({:?})", e);
                    }
                    echoed = true;
                }
                LineEvent::Erase => Self::emit(transport, ERASE_SEQUENCE),
                LineEvent::Submit => {
                    Self::emit(transport, LINE_BREAK);
                    if !self.editor.is_empty() {
                        self.dispatch(transport);
                    }
                    Self::emit(transport, CONSOLE_PROMPT);
                    self.editor.clear();
                }
                LineEvent::Cancel | LineEvent::Ignored => {}
            }
        }

        if echoed {
            transport.flush();
        }

        self.state = if self.editor.is_empty() {
            SessionState::ConnectedGreeted
        } else {
            SessionState::ConnectedReading
        };
    }

    fn dispatch<T: ConsoleTransport + ?Sized>(&mut self, transport: &mut T) {
        let command = ConsoleCommand::parse(self.editor.line());

        match command.target_mode() {
            Some(mode) => {
                self.mode.store(mode);
                info!("console: generator {:?}", mode);
            }
            None => debug!("console: unknown command"),
        }

        Self::emit(transport, command.response());
    }

    fn emit<T: ConsoleTransport + ?Sized>(transport: &mut T, text: &str) {
        if let Err(e) = write_str_bounded(transport, text) {
            trace!("console: write abandoned ({:?})", e);
        }
    }
}
