//! Audio Streaming
//!
//! Provides the device-to-host audio path:
//! - Isochronous packet scheduler driven by transfer-complete events
//! - Feature unit control-request table (mute / volume)

pub mod scheduler;
pub mod control;
