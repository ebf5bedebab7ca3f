//! Test Signal Generator
//!
//! Fills interleaved I/Q blocks with a quadrature tone (when the shared mode
//! is ON) on top of a constant noise floor. The generator knows nothing
//! about USB or timing: it only maps a running sample index and a mode to
//! samples.

use crate::config::{
    AUDIO_CHANNELS, AUDIO_SAMPLE_RATE, FRAMES_PER_PACKET, NOISE_LEVEL_DBFS, NOISE_SEED,
    TONE_FREQUENCY_HZ, TONE_LEVEL_DBFS,
};
use crate::dsp::noise::NoiseFloor;
use crate::dsp::oscillator::{dbfs_to_amplitude, TonePeriod, ToneOscillator, DEFAULT_TONE_PERIOD};
use crate::types::{AudioBlock, GeneratorMode, SharedMode};

/// Tone parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneConfig {
    /// Tone frequency in Hz
    pub frequency_hz: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Peak level relative to full scale
    pub level_dbfs: f32,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            frequency_hz: TONE_FREQUENCY_HZ,
            sample_rate: AUDIO_SAMPLE_RATE,
            level_dbfs: TONE_LEVEL_DBFS,
        }
    }
}

/// Generator parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Test tone
    pub tone: ToneConfig,
    /// Noise floor level relative to full scale
    pub noise_level_dbfs: f32,
    /// Noise generator seed
    pub noise_seed: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tone: ToneConfig::default(),
            noise_level_dbfs: NOISE_LEVEL_DBFS,
            noise_seed: NOISE_SEED,
        }
    }
}

/// Saturate a widened sum to the 16-bit range
#[inline]
fn saturate(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Block signal generator
///
/// Owns the oscillator phase and the noise state; both advance on every
/// generated frame regardless of mode and are never reset after
/// construction.
pub struct SignalGenerator<'a> {
    /// Mode cell written by the console
    mode: &'a SharedMode,
    /// Quadrature tone
    tone: ToneOscillator,
    /// Noise floor
    noise: NoiseFloor,
}

impl<'a> SignalGenerator<'a> {
    /// Create a generator with the default 1 kHz / -53 dBFS / -96 dBFS setup
    #[must_use]
    pub fn new(mode: &'a SharedMode) -> Self {
        let config = GeneratorConfig::default();
        Self {
            mode,
            tone: ToneOscillator::new(DEFAULT_TONE_PERIOD, dbfs_to_amplitude(config.tone.level_dbfs)),
            noise: NoiseFloor::new(config.noise_level_dbfs, config.noise_seed),
        }
    }

    /// Create a generator from an explicit configuration
    ///
    /// Returns None if the tone does not have a usable period.
    #[must_use]
    pub fn with_config(mode: &'a SharedMode, config: &GeneratorConfig) -> Option<Self> {
        let period = TonePeriod::derive(config.tone.frequency_hz, config.tone.sample_rate)?;
        Some(Self {
            mode,
            tone: ToneOscillator::new(period, dbfs_to_amplitude(config.tone.level_dbfs)),
            noise: NoiseFloor::new(config.noise_level_dbfs, config.noise_seed),
        })
    }

    /// Write `frame_count` interleaved I/Q frames into `buffer`
    ///
    /// The mode is sampled once per call, so a concurrent change shows up
    /// on the next call. Frames that do not fit in `buffer` are not
    /// generated and do not advance state.
    pub fn fill(&mut self, buffer: &mut [i16], frame_count: usize) {
        let frames = frame_count.min(buffer.len() / AUDIO_CHANNELS);
        let tone_on = self.mode.load().is_on();

        for frame in buffer[..frames * AUDIO_CHANNELS].chunks_exact_mut(AUDIO_CHANNELS) {
            let (i, q) = self.tone.next();
            let (i, q) = if tone_on { (i, q) } else { (0, 0) };
            frame[0] = saturate(i32::from(i) + i32::from(self.noise.next()));
            frame[1] = saturate(i32::from(q) + i32::from(self.noise.next()));
        }
    }

    /// Fill one full isochronous packet
    pub fn fill_block(&mut self, block: &mut AudioBlock) {
        self.fill(block, FRAMES_PER_PACKET);
    }

    /// Get the mode the next block will be generated with
    #[must_use]
    pub fn mode(&self) -> GeneratorMode {
        self.mode.load()
    }

    /// Get the oscillator phase index
    #[must_use]
    pub fn phase(&self) -> usize {
        self.tone.phase()
    }

    /// Get the tone period in samples
    #[must_use]
    pub fn tone_period(&self) -> usize {
        self.tone.period()
    }

    /// Get the tone peak amplitude in LSBs
    #[must_use]
    pub fn tone_amplitude(&self) -> i16 {
        self.tone.amplitude()
    }

    /// Get the noise magnitude in LSBs
    #[must_use]
    pub fn noise_amplitude(&self) -> i16 {
        self.noise.amplitude()
    }

    /// Get the raw noise generator state
    #[must_use]
    pub fn noise_state(&self) -> u32 {
        self.noise.state()
    }
}
