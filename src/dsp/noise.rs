//! Noise Floor Generator
//!
//! A real receiver never outputs digital silence, so an idle stream of
//! zeros is an obvious tell. This generator adds a symmetric ±A LSB
//! pseudo-random term to every sample. It never yields zero.

use crate::dsp::oscillator::dbfs_to_amplitude;
#[cfg(feature = "embedded")]
use micromath::F32Ext;

/// LCG multiplier (Numerical Recipes)
const LCG_MUL: u32 = 1_664_525;
/// LCG increment (Numerical Recipes)
const LCG_INC: u32 = 1_013_904_223;

/// Pseudo-random noise floor
#[derive(Clone, Copy, Debug)]
pub struct NoiseFloor {
    /// LCG state
    state: u32,
    /// Noise magnitude in LSBs (at least 1)
    amplitude: i16,
}

impl NoiseFloor {
    /// Create a noise floor at `level_dbfs`, seeded with `seed`
    ///
    /// Levels below one LSB are raised to one LSB.
    #[must_use]
    pub fn new(level_dbfs: f32, seed: u32) -> Self {
        let amplitude = dbfs_to_amplitude(level_dbfs).round().clamp(1.0, 32_767.0) as i16;
        Self {
            state: seed,
            amplitude,
        }
    }

    /// Generate next noise sample (either +A or -A)
    pub fn next(&mut self) -> i16 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
        // Low LCG bits are poorly distributed; use the top one
        if self.state & 0x8000_0000 == 0 {
            self.amplitude
        } else {
            -self.amplitude
        }
    }

    /// Get the raw generator state
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Get the noise magnitude in LSBs
    #[must_use]
    pub const fn amplitude(&self) -> i16 {
        self.amplitude
    }
}
