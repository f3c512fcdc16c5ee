//! Frequency tables: symbol → phase step widths
//!
//! Step widths are in excess-8 format (units of 1/8 table slot per sample
//! tick), precomputed for the ~15.6 kHz sample tick:
//!
//! `step = round(8 * LUT_SIZE * f / SAMPLE_RATE)`
//!
//! ```text
//!       | 1209 | 1336 | 1477        MF   700  900 1100 1300 1500 1700
//!   697 |   1  |  2   |   3         step  46   59   72   85   98  111
//!   770 |   4  |  5   |   6
//!   852 |   7  |  8   |   9
//!   941 |   *  |  0   |   #
//! ```

use crate::digit::Digit;

/// Sample tick rate of the synthesizer in Hz (64 µs period).
pub const SAMPLE_RATE_HZ: u32 = 15_625;

/// Fixed duration of the 2600 Hz supervisory tone.
pub const SUPERVISORY_MS: u16 = 1000;

// DTMF high group (tone A, full weight)
const H1209: u8 = 79;
const H1336: u8 = 87;
const H1477: u8 = 96;

// DTMF low group (tone B, 3/4 weight)
const L697: u8 = 46;
const L770: u8 = 50;
const L852: u8 = 56;
const L941: u8 = 61;

// MF (R1) frequencies
const MF700: u8 = 46;
const MF900: u8 = 59;
const MF1100: u8 = 72;
const MF1300: u8 = 85;
const MF1500: u8 = 98;
const MF1700: u8 = 111;
const SF2600: u8 = 170;

// Acknowledgement beeps
const BEEP_1000: u8 = 66;
const BEEP_500: u8 = 33;

// Tune notes
const NOTE_C5: u8 = 34; // 523.25 Hz
const NOTE_E5: u8 = 43; // 659.26 Hz
const NOTE_G5: u8 = 51; // 784 Hz

/// A pair of phase increments. `step_b == 0` means single tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ToneSpec {
    pub step_a: u8,
    pub step_b: u8,
}

impl ToneSpec {
    /// Both accumulators stopped.
    pub const SILENT: Self = Self { step_a: 0, step_b: 0 };

    pub const fn dual(step_a: u8, step_b: u8) -> Self {
        Self { step_a, step_b }
    }

    pub const fn single(step: u8) -> Self {
        Self { step_a: step, step_b: 0 }
    }

    #[inline]
    pub const fn is_single(&self) -> bool {
        self.step_b == 0
    }
}

/// One note of a melodic control tone.
///
/// The note lasts `duration / divisor` of the requested duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub step: u8,
    pub divisor: u16,
}

impl Note {
    const fn third(step: u8) -> Self {
        Self { step, divisor: 3 }
    }

    const fn half(step: u8) -> Self {
        Self { step, divisor: 2 }
    }

    /// Length of this note within a tune of `duration_ms`.
    #[inline]
    pub const fn duration_ms(&self, duration_ms: u16) -> u16 {
        duration_ms / self.divisor
    }
}

pub static TUNE_ASC: [Note; 3] = [Note::third(NOTE_C5), Note::third(NOTE_E5), Note::third(NOTE_G5)];
pub static TUNE_DESC: [Note; 3] = [Note::third(NOTE_G5), Note::third(NOTE_E5), Note::third(NOTE_C5)];
pub static TUNE_ASC2: [Note; 2] = [Note::half(NOTE_C5), Note::half(NOTE_G5)];
pub static TUNE_DESC2: [Note; 2] = [Note::half(NOTE_G5), Note::half(NOTE_C5)];

/// How a symbol sounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Voice {
    /// Steady tone pair for the whole duration
    Steady(ToneSpec),
    /// Back-to-back single tones
    Melody(&'static [Note]),
    /// Nothing is emitted
    Silent,
}

/// Frequency table lookup.
pub const fn voice(digit: Digit) -> Voice {
    let spec = match digit {
        Digit::D1 => ToneSpec::dual(H1209, L697),
        Digit::D2 => ToneSpec::dual(H1336, L697),
        Digit::D3 => ToneSpec::dual(H1477, L697),
        Digit::D4 => ToneSpec::dual(H1209, L770),
        Digit::D5 => ToneSpec::dual(H1336, L770),
        Digit::D6 => ToneSpec::dual(H1477, L770),
        Digit::D7 => ToneSpec::dual(H1209, L852),
        Digit::D8 => ToneSpec::dual(H1336, L852),
        Digit::D9 => ToneSpec::dual(H1477, L852),
        Digit::Star => ToneSpec::dual(H1209, L941),
        Digit::D0 => ToneSpec::dual(H1336, L941),
        Digit::Pound => ToneSpec::dual(H1477, L941),

        Digit::Mf1 => ToneSpec::dual(MF900, MF700),
        Digit::Mf2 => ToneSpec::dual(MF1100, MF700),
        Digit::Mf3 => ToneSpec::dual(MF1100, MF900),
        Digit::Mf4 => ToneSpec::dual(MF1300, MF700),
        Digit::Mf5 => ToneSpec::dual(MF1300, MF900),
        Digit::Mf6 => ToneSpec::dual(MF1300, MF1100),
        Digit::Mf7 => ToneSpec::dual(MF1500, MF700),
        Digit::Mf8 => ToneSpec::dual(MF1500, MF900),
        Digit::Mf9 => ToneSpec::dual(MF1500, MF1100),
        Digit::Mf0 => ToneSpec::dual(MF1500, MF1300),
        Digit::MfKp => ToneSpec::dual(MF1700, MF1100),
        Digit::MfSt => ToneSpec::dual(MF1700, MF1500),
        Digit::MfStp => ToneSpec::dual(MF1700, MF900),
        Digit::MfSt2p => ToneSpec::dual(MF1700, MF1300),
        Digit::Supervisory => ToneSpec::single(SF2600),

        Digit::Beep => ToneSpec::single(BEEP_1000),
        Digit::BeepLow => ToneSpec::single(BEEP_500),

        Digit::TuneAsc => return Voice::Melody(&TUNE_ASC),
        Digit::TuneDesc => return Voice::Melody(&TUNE_DESC),
        Digit::TuneAsc2 => return Voice::Melody(&TUNE_ASC2),
        Digit::TuneDesc2 => return Voice::Melody(&TUNE_DESC2),

        Digit::Off => return Voice::Silent,
    };
    Voice::Steady(spec)
}

/// Duration override for symbols with a fixed signalling length.
pub const fn fixed_duration_ms(digit: Digit) -> Option<u16> {
    match digit {
        Digit::Supervisory => Some(SUPERVISORY_MS),
        _ => None,
    }
}
