//! Blocking tone emission on top of the DDS engine
//!
//! `generate_tone` selects the voice for a symbol, enables the sink, blocks
//! in low-power idle until the tick clock has counted the duration, then
//! disables the sink and zeroes both step widths. The per-sample math keeps
//! running in the tick ISR the whole time; this side only sets steps and
//! waits.

use super::dds::ToneEngine;
use super::tones::{self, ToneSpec, Voice};
use crate::digit::Digit;
use crate::hal::{AudioSink, LowPower};
use crate::timing::TickClock;

/// Front end of the synthesizer used by the control loop.
pub struct ToneGenerator<'a> {
    engine: &'a ToneEngine,
    clock: &'a TickClock,
}

impl<'a> ToneGenerator<'a> {
    pub const fn new(engine: &'a ToneEngine, clock: &'a TickClock) -> Self {
        Self { engine, clock }
    }

    /// Emit `digit` for `duration_ms`, blocking until done.
    ///
    /// OFF emits nothing and returns at once. Symbols with a fixed signalling
    /// length (the supervisory tone) ignore `duration_ms`.
    pub fn generate_tone<B>(&self, board: &mut B, digit: Digit, duration_ms: u16)
    where
        B: AudioSink + LowPower + ?Sized,
    {
        let duration_ms = tones::fixed_duration_ms(digit).unwrap_or(duration_ms);

        match tones::voice(digit) {
            Voice::Silent => return,
            Voice::Steady(spec) => {
                self.engine.set_tone(spec);
                board.start();
                self.clock.countdown_ms(duration_ms as u32).wait(board);
            }
            Voice::Melody(notes) => {
                self.engine.set_tone(ToneSpec::SILENT);
                board.start();
                for note in notes {
                    self.engine.set_step_a(note.step);
                    self.clock
                        .countdown_ms(note.duration_ms(duration_ms) as u32)
                        .wait(board);
                }
            }
        }

        board.stop();
        self.engine.set_tone(ToneSpec::SILENT);
    }

    /// Block with the output off for `duration_ms`.
    pub fn silence<B>(&self, board: &mut B, duration_ms: u16)
    where
        B: LowPower + ?Sized,
    {
        self.clock.countdown_ms(duration_ms as u32).wait(board);
    }
}
