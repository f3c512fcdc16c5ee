//! Tone synthesis
//!
//! Architecture:
//! - `lut`: one period of a 7-bit sine, 128 entries
//! - `tones`: symbol → step widths, melodic control tunes
//! - `dds`: two phase accumulators advanced by the sample tick ISR
//! - `generator`: blocking, duration-bounded emission for the control loop

pub mod dds;
pub mod generator;
pub mod lut;
pub mod tones;

pub use dds::ToneEngine;
pub use generator::ToneGenerator;
pub use lut::{LUT_SIZE, SINE_LUT};
pub use tones::{ToneSpec, Voice};
