//! Digital Signal Processing
//!
//! Provides the synthetic receive signal:
//! - Quadrature tone oscillator with an integer phase index
//! - Pseudo-random noise floor
//! - Block generator combining both into interleaved I/Q packets

pub mod oscillator;
pub mod noise;
pub mod generator;
