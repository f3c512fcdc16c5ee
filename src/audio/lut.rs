//! Sine lookup table for the dual-tone synthesizer
//!
//! 128-entry table covering one full cycle, quantized to 7 bits.
//! Values are unsigned PWM levels around a midpoint of 64.

/// Number of entries in the sine LUT
pub const LUT_SIZE: usize = 128;

/// Midpoint (zero crossing) of the unsigned table.
pub const LUT_MIDPOINT: u8 = 64;

/// Largest value in the table.
pub const LUT_PEAK: u8 = 127;

/// Pre-computed sine wave lookup table
///
/// 128 samples covering 0 to 2π, `round(64 + 63.5 * sin(2π * i / 128))`
/// clamped to 0..=127.
/// Index 0 = 0°, 32 = 90°, 64 = 180°, 96 = 270°
pub static SINE_LUT: [u8; LUT_SIZE] = [
    64, 67, 70, 73, 76, 79, 82, 85,
    88, 91, 94, 96, 99, 102, 104, 106,
    109, 111, 113, 115, 117, 118, 120, 121,
    123, 124, 125, 126, 126, 127, 127, 127,
    127, 127, 127, 127, 126, 126, 125, 124,
    123, 121, 120, 118, 117, 115, 113, 111,
    109, 106, 104, 102, 99, 96, 94, 91,
    88, 85, 82, 79, 76, 73, 70, 67,
    64, 60, 57, 54, 51, 48, 45, 42,
    39, 36, 33, 31, 28, 25, 23, 21,
    18, 16, 14, 12, 10, 9, 7, 6,
    4, 3, 2, 1, 1, 0, 0, 0,
    0, 0, 0, 0, 1, 1, 2, 3,
    4, 6, 7, 9, 10, 12, 14, 16,
    18, 21, 23, 25, 28, 31, 33, 36,
    39, 42, 45, 48, 51, 54, 57, 60,
];
