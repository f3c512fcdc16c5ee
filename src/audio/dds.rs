//! Dual-tone direct digital synthesizer
//!
//! Two phase accumulators driven once per sample tick, one table lookup each,
//! asymmetric mix (tone A full weight, tone B 3/4 weight).
//!
//! # Fixed-point format
//!
//! Phases are 16-bit, steps are in 1/8 of a table slot ("excess 8"). The
//! table index is `((phase + 4) >> 3) & (LUT_SIZE - 1)`: round to the nearest
//! slot, then wrap over the 128-entry period. 2^16 is a multiple of the
//! 1024-unit period, so native u16 wraparound keeps the phase continuous.
//!
//! # Concurrency
//!
//! `tick()` runs in the sample tick ISR and is the only writer of the phases.
//! The main loop only writes the step widths. All fields are single atomics,
//! so neither side ever observes a torn value.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use super::lut::{LUT_SIZE, SINE_LUT};
use super::tones::ToneSpec;

/// Phase units per table period (LUT_SIZE slots × 8).
pub const PHASE_PERIOD: u32 = (LUT_SIZE as u32) << 3;

/// Largest value `mix` can produce: 127 + (127 - 31).
pub const MAX_OUTPUT: u8 = 223;

/// Table index for a phase value.
#[inline]
pub const fn sample_index(phase: u16) -> usize {
    ((phase.wrapping_add(4) >> 3) as usize) & (LUT_SIZE - 1)
}

/// Combine the two table samples: `a + (b - b/4)`.
///
/// Inputs are table values (0..=127); the result stays within 0..=223.
#[inline]
pub const fn mix(sample_a: u8, sample_b: u8) -> u8 {
    sample_a + (sample_b - (sample_b >> 2))
}

/// The synthesizer state shared between the tick ISR and the main loop.
pub struct ToneEngine {
    step_a: AtomicU8,
    step_b: AtomicU8,
    phase_a: AtomicU16,
    phase_b: AtomicU16,
}

impl ToneEngine {
    pub const fn new() -> Self {
        Self {
            step_a: AtomicU8::new(0),
            step_b: AtomicU8::new(0),
            phase_a: AtomicU16::new(0),
            phase_b: AtomicU16::new(0),
        }
    }

    /// Zero both steps and both phases (synthesizer init).
    pub fn reset(&self) {
        self.step_a.store(0, Ordering::Relaxed);
        self.step_b.store(0, Ordering::Relaxed);
        self.phase_a.store(0, Ordering::Relaxed);
        self.phase_b.store(0, Ordering::Relaxed);
    }

    /// Select the tone pair produced by subsequent ticks.
    #[inline]
    pub fn set_tone(&self, spec: ToneSpec) {
        self.step_b.store(spec.step_b, Ordering::Release);
        self.step_a.store(spec.step_a, Ordering::Release);
    }

    /// Change tone A only (melody notes).
    #[inline]
    pub fn set_step_a(&self, step: u8) {
        self.step_a.store(step, Ordering::Release);
    }

    /// Currently selected steps.
    #[inline]
    pub fn tone(&self) -> ToneSpec {
        ToneSpec {
            step_a: self.step_a.load(Ordering::Acquire),
            step_b: self.step_b.load(Ordering::Acquire),
        }
    }

    /// Advance one sample tick and return the output amplitude.
    ///
    /// Tick ISR only.
    #[inline]
    pub fn tick(&self) -> u8 {
        let step_a = self.step_a.load(Ordering::Acquire);
        let step_b = self.step_b.load(Ordering::Acquire);

        let sample_a = Self::advance(&self.phase_a, step_a);
        let sample_b = if step_b > 0 {
            Self::advance(&self.phase_b, step_b)
        } else {
            0
        };

        mix(sample_a, sample_b)
    }

    #[inline]
    fn advance(phase: &AtomicU16, step: u8) -> u8 {
        let next = phase.load(Ordering::Relaxed).wrapping_add(step as u16);
        phase.store(next, Ordering::Relaxed);
        SINE_LUT[sample_index(next)]
    }
}

impl Default for ToneEngine {
    fn default() -> Self {
        Self::new()
    }
}
