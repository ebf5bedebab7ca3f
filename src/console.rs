//! Serial Console
//!
//! Provides the polled command console:
//! - Transport trait the USB CDC shell (or a test peer) implements
//! - Session state machine with greeting, echo and command dispatch

pub mod transport;
pub mod session;
