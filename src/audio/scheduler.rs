//! Isochronous Stream Scheduler
//!
//! Keeps exactly one packet queued on the isochronous IN pipe while the
//! host has the streaming interface open. The transport calls in from its
//! transfer-complete context, so the steady-state path does no logging, no
//! allocation and takes no locks: fill one block, hand it over, return.

use crate::config::interfaces::{ALT_STREAMING, AUDIO_STREAMING};
use crate::config::SAMPLES_PER_PACKET;
use crate::dsp::generator::SignalGenerator;
use crate::types::{AudioBlock, StreamState};

/// Isochronous IN pipe
pub trait IsoTransport {
    /// Queue `packet` for the next service interval (fire-and-forget)
    fn transmit(&mut self, packet: &[u8]);
}

/// Stream counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Packets handed to the transport since power-up
    pub packets: u32,
    /// Packets handed to the transport since the last activation
    pub session_packets: u32,
    /// Number of times the host opened the stream
    pub activations: u32,
}

/// Packet scheduler for the microphone stream
pub struct StreamScheduler<'a> {
    /// Block source
    generator: SignalGenerator<'a>,
    /// The single transmit buffer
    block: AudioBlock,
    /// Streaming interface state
    state: StreamState,
    /// Counters
    stats: StreamStats,
}

impl<'a> StreamScheduler<'a> {
    /// Create an idle scheduler around `generator`
    #[must_use]
    pub fn new(generator: SignalGenerator<'a>) -> Self {
        Self {
            generator,
            block: [0; SAMPLES_PER_PACKET],
            state: StreamState::Idle,
            stats: StreamStats::default(),
        }
    }

    /// Host selected the operational alternate setting
    ///
    /// The pipe only starts repeating once a first payload is queued, so one
    /// block is produced right here. Re-activation re-primes the pipe.
    pub fn on_stream_activated<T: IsoTransport + ?Sized>(&mut self, transport: &mut T) {
        self.state = StreamState::Active;
        self.stats.activations = self.stats.activations.wrapping_add(1);
        self.stats.session_packets = 0;
        info!("stream: active (mode {:?})", self.generator.mode());
        self.produce(transport);
    }

    /// Host selected the zero-bandwidth alternate setting
    pub fn on_stream_deactivated(&mut self) {
        if self.state == StreamState::Active {
            info!("stream: idle after {} packets", self.stats.session_packets);
        }
        self.state = StreamState::Idle;
    }

    /// Previous packet went out; queue the next one
    ///
    /// Returns false (and produces nothing) while idle.
    pub fn on_transfer_complete<T: IsoTransport + ?Sized>(&mut self, transport: &mut T) -> bool {
        if self.state != StreamState::Active {
            return false;
        }
        self.produce(transport);
        true
    }

    /// Route a SET_INTERFACE request
    ///
    /// Only the audio streaming interface is acted on; the request is
    /// always accepted.
    pub fn on_set_interface<T: IsoTransport + ?Sized>(
        &mut self,
        interface: u8,
        alt_setting: u8,
        transport: &mut T,
    ) -> bool {
        if interface == AUDIO_STREAMING {
            if alt_setting == ALT_STREAMING {
                self.on_stream_activated(transport);
            } else {
                self.on_stream_deactivated();
            }
        }
        true
    }

    fn produce<T: IsoTransport + ?Sized>(&mut self, transport: &mut T) {
        self.generator.fill_block(&mut self.block);
        transport.transmit(bytemuck::cast_slice(&self.block[..]));
        self.stats.packets = self.stats.packets.wrapping_add(1);
        self.stats.session_packets = self.stats.session_packets.wrapping_add(1);
    }

    /// Get streaming state
    #[must_use]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    /// Check if the host has the stream open
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == StreamState::Active
    }

    /// Get counters
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Get the generator
    #[must_use]
    pub const fn generator(&self) -> &SignalGenerator<'a> {
        &self.generator
    }

    /// Get the last produced block
    #[must_use]
    pub const fn block(&self) -> &AudioBlock {
        &self.block
    }
}
