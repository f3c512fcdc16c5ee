//! Module: config
//!
//! Purpose: Persisted feature configuration, storage layout and the
//! build/runtime dialer configuration.
//!
//! Layout of the 512-byte store:
//!
//! ```text
//! 0 .. 8*N        speed-dial slots, N bytes each (slot 7 = redial)
//! 509             tone-duration unit (1..=4 × 50 ms)
//! 510             hotline delay (1..=4 s)
//! 511             feature flags (bit 0 = hotline)
//! ```
//!
//! Every field is range-checked on load and rewritten with its default when
//! invalid; erased storage (0xFF) therefore self-initializes on first boot.
//!
//! Safety: Safe. Main loop only.

pub mod nvs;
pub mod speed_dial;
pub mod store;

pub use speed_dial::{SpeedDialSlot, SpeedDialStore};
pub use store::{ByteStore, MemStore, StoreError};

use crate::decoder::DialMapping;
use crate::digit::Digit;

/// Size of the persistent byte store.
pub const STORE_SIZE: usize = 512;

pub const FEATURE_ADDR: u16 = 511;
pub const HOTLINE_DELAY_ADDR: u16 = 510;
pub const TONE_UNIT_ADDR: u16 = 509;

/// Feature flag bit: auto-dial the hotline slot at boot.
pub const FEATURE_HOTLINE: u8 = 1 << 0;

/// Number of speed-dial slots, redial included.
pub const SPEED_DIAL_COUNT: u8 = 8;
/// Default digits per slot.
pub const SPEED_DIAL_SIZE: usize = 32;
/// Slot continuously rewritten by normal dialing.
pub const REDIAL_SLOT: u8 = SPEED_DIAL_COUNT - 1;
/// Slot replayed at boot when hotline is enabled.
pub const HOTLINE_SLOT: u8 = 0;

/// One step of the tone-duration setting.
pub const TONE_UNIT_MS: u16 = 50;

pub const MAX_HOTLINE_DELAY_S: u8 = 4;
pub const MAX_TONE_UNIT: u8 = 4;
pub const DEFAULT_HOTLINE_DELAY_S: u8 = 1;
pub const DEFAULT_TONE_UNIT: u8 = 2;

// SPECIAL_L1 keys
pub const KEY_STAR: Digit = Digit::D1;
pub const KEY_POUND: Digit = Digit::D2;
pub const KEY_REDIAL: Digit = Digit::D3;

// SPECIAL_L2 keys
pub const KEY_HOTLINE: Digit = Digit::D1;
pub const KEY_TONE_DURATION: Digit = Digit::D2;

/// Assignable speed-dial slot for a dialed digit.
///
/// 0 → slot 0, 4..9 → slots 1..6. Digits 1-3 are menu keys.
pub const fn slot_for_digit(digit: Digit) -> Option<u8> {
    match digit {
        Digit::D0 => Some(0),
        Digit::D4 => Some(1),
        Digit::D5 => Some(2),
        Digit::D6 => Some(3),
        Digit::D7 => Some(4),
        Digit::D8 => Some(5),
        Digit::D9 => Some(6),
        _ => None,
    }
}

/// Which persisted fields were found invalid and rewritten on load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigRepairs {
    pub features: bool,
    pub hotline_delay: bool,
    pub tone_unit: bool,
}

impl ConfigRepairs {
    #[inline]
    pub fn any(&self) -> bool {
        self.features || self.hotline_delay || self.tone_unit
    }

    pub fn count(&self) -> u32 {
        self.features as u32 + self.hotline_delay as u32 + self.tone_unit as u32
    }
}

/// Result of pressing the hotline key in SPECIAL_L2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotlineChange {
    /// Was off, now on with the kept delay
    Enabled { delay_s: u8 },
    /// Was on, delay stepped up
    Delay { delay_s: u8 },
    /// Delay wrapped past the maximum: off, delay back to 1
    Disabled,
}

/// Persisted feature settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureConfig {
    pub hotline: bool,
    pub hotline_delay_s: u8,
    pub tone_unit: u8,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            hotline: false,
            hotline_delay_s: DEFAULT_HOTLINE_DELAY_S,
            tone_unit: DEFAULT_TONE_UNIT,
        }
    }
}

impl FeatureConfig {
    /// Load and validate; invalid fields are reset and written back.
    pub fn load<S: ByteStore + ?Sized>(store: &mut S) -> Result<(Self, ConfigRepairs), StoreError> {
        let mut config = Self::default();
        let mut repairs = ConfigRepairs::default();

        let flags = store.read_byte(FEATURE_ADDR)?;
        if flags > FEATURE_HOTLINE {
            store.update_byte(FEATURE_ADDR, 0)?;
            repairs.features = true;
        } else {
            config.hotline = flags & FEATURE_HOTLINE != 0;
        }

        let delay = store.read_byte(HOTLINE_DELAY_ADDR)?;
        if (1..=MAX_HOTLINE_DELAY_S).contains(&delay) {
            config.hotline_delay_s = delay;
        } else {
            store.update_byte(HOTLINE_DELAY_ADDR, DEFAULT_HOTLINE_DELAY_S)?;
            repairs.hotline_delay = true;
        }

        let unit = store.read_byte(TONE_UNIT_ADDR)?;
        if (1..=MAX_TONE_UNIT).contains(&unit) {
            config.tone_unit = unit;
        } else {
            store.update_byte(TONE_UNIT_ADDR, DEFAULT_TONE_UNIT)?;
            repairs.tone_unit = true;
        }

        Ok((config, repairs))
    }

    /// Persist the hotline flag and delay.
    pub fn save_hotline<S: ByteStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let flags = if self.hotline { FEATURE_HOTLINE } else { 0 };
        store.update_byte(FEATURE_ADDR, flags)?;
        store.update_byte(HOTLINE_DELAY_ADDR, self.hotline_delay_s)
    }

    /// Persist the tone-duration unit.
    pub fn save_tone_unit<S: ByteStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.update_byte(TONE_UNIT_ADDR, self.tone_unit)
    }

    /// Off → on (delay kept); on → delay + 1; past the maximum → off, delay 1.
    pub fn toggle_hotline(&mut self) -> HotlineChange {
        if !self.hotline {
            self.hotline = true;
            return HotlineChange::Enabled {
                delay_s: self.hotline_delay_s,
            };
        }

        self.hotline_delay_s += 1;
        if self.hotline_delay_s > MAX_HOTLINE_DELAY_S {
            self.hotline_delay_s = DEFAULT_HOTLINE_DELAY_S;
            self.hotline = false;
            HotlineChange::Disabled
        } else {
            HotlineChange::Delay {
                delay_s: self.hotline_delay_s,
            }
        }
    }

    /// Step the tone duration 1 → 2 → 3 → 4 → 1 and return the new unit.
    pub fn advance_tone_unit(&mut self) -> u8 {
        self.tone_unit = if self.tone_unit >= MAX_TONE_UNIT {
            1
        } else {
            self.tone_unit + 1
        };
        self.tone_unit
    }

    /// Digit tone (and inter-digit gap) length.
    #[inline]
    pub fn tone_ms(&self) -> u16 {
        self.tone_unit as u16 * TONE_UNIT_MS
    }

    #[inline]
    pub fn hotline_delay_ms(&self) -> u16 {
        self.hotline_delay_s as u16 * 1000
    }
}

/// Build/runtime settings that are not persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialerConfig {
    pub mapping: DialMapping,
    /// Minimum spacing of counted pulse edges; 0 disables debouncing.
    pub pulse_debounce_ms: u32,
}

impl DialerConfig {
    pub const DEFAULT_DEBOUNCE_MS: u32 = 20;
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self {
            mapping: DialMapping::from_features(),
            pulse_debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
        }
    }
}
