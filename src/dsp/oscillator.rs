//! Digital Oscillators
//!
//! Provides the quadrature test tone. The tone repeats exactly every
//! `period` samples, so one period is synthesized up front and playback is
//! a table walk driven by an integer phase index. That keeps the per-sample
//! cost constant inside the transfer-complete handler and makes the output
//! bit-exact across block boundaries.

use core::f32::consts::PI;
#[cfg(feature = "embedded")]
use micromath::F32Ext;

use heapless::Vec;

use crate::config::{AUDIO_SAMPLE_RATE, MAX_TONE_PERIOD, TONE_FREQUENCY_HZ};

/// Digital full scale for 16-bit signed samples
pub const FULL_SCALE: f32 = 32_767.0;

/// Convert a dBFS level to a peak amplitude in LSBs
#[must_use]
pub fn dbfs_to_amplitude(dbfs: f32) -> f32 {
    FULL_SCALE * 10.0_f32.powf(dbfs / 20.0)
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Exact repetition period of a tone at a given sample rate
///
/// A tone of `f` Hz sampled at `fs` Hz repeats after `fs / gcd(f, fs)`
/// samples, during which it completes `f / gcd(f, fs)` cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TonePeriod {
    /// Samples per repetition
    samples: usize,
    /// Whole tone cycles per repetition
    cycles: usize,
}

impl TonePeriod {
    /// Derive the period, returns None if the tone is zero, at or above
    /// Nyquist, or does not repeat within `MAX_TONE_PERIOD` samples
    #[must_use]
    pub const fn derive(frequency_hz: u32, sample_rate: u32) -> Option<Self> {
        if frequency_hz == 0 || sample_rate == 0 || frequency_hz >= sample_rate / 2 {
            return None;
        }
        let g = gcd(frequency_hz, sample_rate);
        let samples = (sample_rate / g) as usize;
        if samples > MAX_TONE_PERIOD {
            return None;
        }
        Some(Self {
            samples,
            cycles: (frequency_hz / g) as usize,
        })
    }

    /// Samples per repetition
    #[must_use]
    pub const fn samples(self) -> usize {
        self.samples
    }

    /// Tone cycles per repetition
    #[must_use]
    pub const fn cycles(self) -> usize {
        self.cycles
    }
}

/// Period of the default 1 kHz test tone
pub const DEFAULT_TONE_PERIOD: TonePeriod =
    match TonePeriod::derive(TONE_FREQUENCY_HZ, AUDIO_SAMPLE_RATE) {
        Some(period) => period,
        None => panic!("default tone does not fit the oscillator table"),
    };

/// Quadrature tone oscillator (I = cosine, Q = sine)
///
/// The phase index is the running sample count modulo the tone period.
#[derive(Clone, Debug)]
pub struct ToneOscillator {
    /// One period of (I, Q) samples
    table: Vec<(i16, i16), MAX_TONE_PERIOD>,
    /// Current phase index (0 to period - 1)
    phase: usize,
    /// Peak amplitude in LSBs
    amplitude: i16,
}

impl ToneOscillator {
    /// Create an oscillator for `period` at a peak `amplitude` (LSBs)
    #[must_use]
    pub fn new(period: TonePeriod, amplitude: f32) -> Self {
        let amplitude = amplitude.clamp(0.0, FULL_SCALE);
        let mut table = Vec::new();
        for k in 0..period.samples {
            // Reduce before converting so the angle stays within one turn
            let turn = ((k * period.cycles) % period.samples) as f32 / period.samples as f32;
            let radians = turn * 2.0 * PI;
            let i = (radians.cos() * amplitude).round() as i16;
            let q = (radians.sin() * amplitude).round() as i16;
            // Capacity is guaranteed by TonePeriod::derive
            let _ = table.push((i, q));
        }

        Self {
            table,
            phase: 0,
            amplitude: amplitude.round() as i16,
        }
    }

    /// Generate next I/Q sample pair
    pub fn next(&mut self) -> (i16, i16) {
        let sample = self.table[self.phase];
        self.phase += 1;
        if self.phase >= self.table.len() {
            self.phase = 0;
        }
        sample
    }

    /// Get current phase index
    #[must_use]
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Get period length in samples
    #[must_use]
    pub fn period(&self) -> usize {
        self.table.len()
    }

    /// Get peak amplitude in LSBs
    #[must_use]
    pub fn amplitude(&self) -> i16 {
        self.amplitude
    }
}
