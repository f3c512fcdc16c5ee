//! Speed-dial memory
//!
//! Eight fixed-length slots of persisted digits at the bottom of the store.
//! Unused positions hold OFF (erased byte), which replay skips.

use super::store::{ByteStore, StoreError};
use super::{SPEED_DIAL_COUNT, SPEED_DIAL_SIZE, TONE_UNIT_ADDR};
use crate::audio::tones;
use crate::audio::ToneGenerator;
use crate::digit::Digit;
use crate::hal::{AudioSink, LowPower};

/// One slot's worth of digits, OFF-padded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedDialSlot<const N: usize = SPEED_DIAL_SIZE> {
    digits: [Digit; N],
}

impl<const N: usize> SpeedDialSlot<N> {
    pub const CAPACITY: usize = N;

    /// All OFF.
    pub const fn empty() -> Self {
        Self {
            digits: [Digit::Off; N],
        }
    }

    /// Copy `digits` in, padding with OFF. Extra digits are ignored.
    pub fn from_digits(digits: &[Digit]) -> Self {
        let mut slot = Self::empty();
        for (dst, &src) in slot.digits.iter_mut().zip(digits) {
            *dst = src;
        }
        slot
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Digit> {
        self.digits.get(index).copied()
    }

    /// Set one position; out-of-range index is ignored.
    #[inline]
    pub fn set(&mut self, index: usize, digit: Digit) {
        if let Some(d) = self.digits.get_mut(index) {
            *d = digit;
        }
    }

    pub fn clear(&mut self) {
        self.digits = [Digit::Off; N];
    }

    #[inline]
    pub fn digits(&self) -> &[Digit; N] {
        &self.digits
    }

    /// Entries replay would actually dial.
    pub fn storable_count(&self) -> usize {
        self.digits.iter().filter(|d| d.is_storable()).count()
    }

    fn encode(&self) -> [u8; N] {
        let mut bytes = [0u8; N];
        for (b, d) in bytes.iter_mut().zip(self.digits.iter()) {
            *b = d.to_code();
        }
        bytes
    }

    fn decode(bytes: &[u8; N]) -> Self {
        let mut slot = Self::empty();
        for (d, &b) in slot.digits.iter_mut().zip(bytes.iter()) {
            *d = Digit::from_code(b);
        }
        slot
    }
}

impl<const N: usize> Default for SpeedDialSlot<N> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Bounds-checked access to the slots of a `ByteStore`.
pub struct SpeedDialStore<S, const N: usize = SPEED_DIAL_SIZE> {
    store: S,
}

impl<S: ByteStore, const N: usize> SpeedDialStore<S, N> {
    pub fn new(store: S) -> Self {
        const {
            assert!(N > 0, "Speed-dial slots must hold at least one digit");
            assert!(
                SPEED_DIAL_COUNT as usize * N <= TONE_UNIT_ADDR as usize,
                "Speed-dial slots overlap the config bytes"
            );
        }
        Self { store }
    }

    #[inline]
    fn addr(slot: u8) -> Option<u16> {
        if slot < SPEED_DIAL_COUNT {
            Some((slot as usize * N) as u16)
        } else {
            None
        }
    }

    /// Read a slot; `None` for an out-of-range index.
    pub fn read(&self, slot: u8) -> Result<Option<SpeedDialSlot<N>>, StoreError> {
        let Some(addr) = Self::addr(slot) else {
            return Ok(None);
        };
        let mut bytes = [0u8; N];
        self.store.read_block(addr, &mut bytes)?;
        Ok(Some(SpeedDialSlot::decode(&bytes)))
    }

    /// Write-through a slot. Returns false (no-op) for an out-of-range index.
    pub fn write(&mut self, slot: u8, digits: &SpeedDialSlot<N>) -> Result<bool, StoreError> {
        let Some(addr) = Self::addr(slot) else {
            return Ok(false);
        };
        self.store.update_block(addr, &digits.encode())?;
        Ok(true)
    }

    /// Dial a stored slot: each storable entry sounds for `tone_ms` (or its
    /// fixed length) followed by an equal silence. OFF entries cost nothing.
    ///
    /// Returns the number of entries dialed; out-of-range slots dial none.
    pub fn replay<B>(
        &self,
        slot: u8,
        generator: &ToneGenerator<'_>,
        board: &mut B,
        tone_ms: u16,
    ) -> Result<usize, StoreError>
    where
        B: AudioSink + LowPower + ?Sized,
    {
        let Some(digits) = self.read(slot)? else {
            return Ok(0);
        };

        let mut dialed = 0;
        for &digit in digits.digits() {
            if !digit.is_storable() {
                continue;
            }
            let duration = tones::fixed_duration_ms(digit).unwrap_or(tone_ms);
            generator.generate_tone(board, digit, duration);
            generator.silence(board, duration);
            dialed += 1;
        }
        Ok(dialed)
    }

    #[inline]
    pub fn backend(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
