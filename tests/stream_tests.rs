//! Stream Scheduler Tests
//!
//! Tests for isochronous packet production against a recording pipe.
//! Run with: cargo test --features std --test stream_tests

use sdr_dev_firmware::audio::scheduler::{IsoTransport, StreamScheduler, StreamStats};
use sdr_dev_firmware::config::interfaces::{ALT_IDLE, ALT_STREAMING, AUDIO_STREAMING, CDC_DATA};
use sdr_dev_firmware::config::{FRAMES_PER_PACKET, PACKET_BYTES, SAMPLES_PER_PACKET};
use sdr_dev_firmware::dsp::generator::SignalGenerator;
use sdr_dev_firmware::types::{GeneratorMode, SharedMode, StreamState};

/// Isochronous pipe that records every queued packet
#[derive(Default)]
struct Recorder {
    packets: Vec<Vec<u8>>,
}

impl IsoTransport for Recorder {
    fn transmit(&mut self, packet: &[u8]) {
        self.packets.push(packet.to_vec());
    }
}

fn samples(packet: &[u8]) -> Vec<i16> {
    packet
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

// =============================================================================
// Idle
// =============================================================================

#[test]
fn starts_idle() {
    let mode = SharedMode::default();
    let scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    assert_eq!(scheduler.state(), StreamState::Idle);
    assert!(!scheduler.is_active());
    assert_eq!(scheduler.stats(), StreamStats::default());
}

#[test]
fn transfer_complete_while_idle_does_nothing() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    assert!(!scheduler.on_transfer_complete(&mut pipe));
    assert!(pipe.packets.is_empty());
    assert_eq!(scheduler.generator().phase(), 0);
}

// =============================================================================
// Activation
// =============================================================================

#[test]
fn activation_primes_one_packet() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);

    assert!(scheduler.is_active());
    assert_eq!(pipe.packets.len(), 1);
    assert_eq!(pipe.packets[0].len(), PACKET_BYTES);
}

#[test]
fn first_packet_reflects_current_mode() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);

    // Default mode is OFF: noise floor only
    let first = samples(&pipe.packets[0]);
    assert_eq!(first.len(), SAMPLES_PER_PACKET);
    assert!(first.iter().all(|s| s.abs() == 1));
}

#[test]
fn packet_matches_generator_output() {
    let mode = SharedMode::new(GeneratorMode::On);
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();
    scheduler.on_stream_activated(&mut pipe);
    scheduler.on_transfer_complete(&mut pipe);

    let mut reference = SignalGenerator::new(&mode);
    let mut expected = vec![0i16; 2 * SAMPLES_PER_PACKET];
    reference.fill(&mut expected, 2 * FRAMES_PER_PACKET);

    let sent: Vec<i16> = pipe.packets.iter().flat_map(|p| samples(p)).collect();
    assert_eq!(sent, expected);
    assert_eq!(&sent[SAMPLES_PER_PACKET..], &scheduler.block()[..]);
}

#[test]
fn interleaving_is_i_then_q() {
    let mode = SharedMode::new(GeneratorMode::On);
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();
    scheduler.on_stream_activated(&mut pipe);

    let first = samples(&pipe.packets[0]);
    // Frame 0: I at cosine peak, Q near zero (plus one LSB of noise)
    assert!((72..=74).contains(&first[0]));
    assert!(first[1].abs() <= 1);
}

// =============================================================================
// Steady state
// =============================================================================

#[test]
fn one_packet_per_transfer() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    for _ in 0..9 {
        assert!(scheduler.on_transfer_complete(&mut pipe));
    }

    assert_eq!(pipe.packets.len(), 10);
    assert!(pipe.packets.iter().all(|p| p.len() == PACKET_BYTES));
    assert_eq!(
        scheduler.stats(),
        StreamStats {
            packets: 10,
            session_packets: 10,
            activations: 1,
        }
    );
}

#[test]
fn phase_continues_across_packets() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    scheduler.on_transfer_complete(&mut pipe);
    scheduler.on_transfer_complete(&mut pipe);

    // Three 48-frame packets on a 48-sample period
    assert_eq!(scheduler.generator().phase(), 0);
    scheduler.on_transfer_complete(&mut pipe);
    assert_eq!(scheduler.generator().phase(), 0);
}

#[test]
fn mode_change_reaches_next_packet() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    mode.store(GeneratorMode::On);
    scheduler.on_transfer_complete(&mut pipe);

    assert!(samples(&pipe.packets[0]).iter().all(|s| s.abs() == 1));
    assert!(samples(&pipe.packets[1]).iter().any(|s| s.abs() > 1));
}

// =============================================================================
// Deactivation
// =============================================================================

#[test]
fn deactivation_stops_production() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    scheduler.on_stream_deactivated();
    assert_eq!(scheduler.state(), StreamState::Idle);

    assert!(!scheduler.on_transfer_complete(&mut pipe));
    assert_eq!(pipe.packets.len(), 1);
}

#[test]
fn deactivation_while_idle_is_harmless() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    scheduler.on_stream_deactivated();
    scheduler.on_stream_deactivated();
    assert_eq!(scheduler.state(), StreamState::Idle);
}

#[test]
fn reactivation_primes_again() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    scheduler.on_transfer_complete(&mut pipe);
    scheduler.on_stream_deactivated();
    scheduler.on_stream_activated(&mut pipe);

    assert_eq!(pipe.packets.len(), 3);
    let stats = scheduler.stats();
    assert_eq!(stats.packets, 3);
    assert_eq!(stats.session_packets, 1);
    assert_eq!(stats.activations, 2);
}

#[test]
fn phase_survives_stream_restart() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_stream_activated(&mut pipe);
    scheduler.on_stream_deactivated();
    scheduler.on_stream_activated(&mut pipe);

    let mut reference = SignalGenerator::new(&mode);
    let mut expected = vec![0i16; 2 * SAMPLES_PER_PACKET];
    reference.fill(&mut expected, 2 * FRAMES_PER_PACKET);

    let sent: Vec<i16> = pipe.packets.iter().flat_map(|p| samples(p)).collect();
    assert_eq!(sent, expected);
}

// =============================================================================
// SET_INTERFACE routing
// =============================================================================

#[test]
fn set_interface_operational_alt_activates() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    assert!(scheduler.on_set_interface(AUDIO_STREAMING, ALT_STREAMING, &mut pipe));
    assert!(scheduler.is_active());
    assert_eq!(pipe.packets.len(), 1);
}

#[test]
fn set_interface_zero_bandwidth_deactivates() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_set_interface(AUDIO_STREAMING, ALT_STREAMING, &mut pipe);
    assert!(scheduler.on_set_interface(AUDIO_STREAMING, ALT_IDLE, &mut pipe));
    assert!(!scheduler.is_active());
}

#[test]
fn set_interface_other_interface_ignored() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    assert!(scheduler.on_set_interface(CDC_DATA, ALT_STREAMING, &mut pipe));
    assert!(!scheduler.is_active());
    assert!(pipe.packets.is_empty());

    scheduler.on_set_interface(AUDIO_STREAMING, ALT_STREAMING, &mut pipe);
    assert!(scheduler.on_set_interface(CDC_DATA, ALT_IDLE, &mut pipe));
    assert!(scheduler.is_active());
}

#[test]
fn set_interface_unknown_alt_deactivates() {
    let mode = SharedMode::default();
    let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
    let mut pipe = Recorder::default();

    scheduler.on_set_interface(AUDIO_STREAMING, ALT_STREAMING, &mut pipe);
    scheduler.on_set_interface(AUDIO_STREAMING, 7, &mut pipe);
    assert!(!scheduler.is_active());
}

// =============================================================================
// Console to stream
// =============================================================================

mod end_to_end {
    use super::*;
    use sdr_dev_firmware::console::session::ConsoleSession;
    use sdr_dev_firmware::console::transport::ConsoleTransport;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Terminal {
        rx: VecDeque<u8>,
    }

    impl ConsoleTransport for Terminal {
        fn is_peer_connected(&self) -> bool {
            true
        }
        fn bytes_available(&self) -> usize {
            self.rx.len()
        }
        fn read_byte(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
        fn write_byte(&mut self, _byte: u8) -> bool {
            true
        }
        fn flush(&mut self) {}
        fn now_ms(&self) -> u32 {
            0
        }
    }

    #[test]
    fn gen_on_turns_next_packet_on() {
        let mode = SharedMode::default();
        let mut session = ConsoleSession::new(&mode);
        let mut scheduler = StreamScheduler::new(SignalGenerator::new(&mode));
        let mut terminal = Terminal::default();
        let mut pipe = Recorder::default();

        session.poll(&mut terminal);
        session.poll(&mut terminal);
        scheduler.on_set_interface(AUDIO_STREAMING, ALT_STREAMING, &mut pipe);

        terminal.rx.extend(b"gen_on\r".iter().copied());
        session.poll(&mut terminal);
        scheduler.on_transfer_complete(&mut pipe);

        assert!(samples(&pipe.packets[0]).iter().all(|s| s.abs() == 1));
        let peak = samples(&pipe.packets[1])
            .iter()
            .map(|s| s.abs())
            .max()
            .unwrap();
        assert!((72..=74).contains(&peak));

        terminal.rx.extend(b"gen_off\r".iter().copied());
        session.poll(&mut terminal);
        scheduler.on_transfer_complete(&mut pipe);
        assert!(samples(&pipe.packets[2]).iter().all(|s| s.abs() == 1));
    }
}
