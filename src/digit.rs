//! Module: digit
//!
//! Purpose: The closed tone vocabulary. Every symbol the dialer can emit,
//! store or queue is a `Digit` variant; lookups match on it exhaustively.
//!
//! Persisted form: one byte per entry. Dialable symbols have fixed codes,
//! everything else (OFF and the transient control symbols) persists as
//! `OFF_CODE`, which is also the erased state of flash/EEPROM.
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// Byte stored for an empty (or non-storable) speed-dial entry.
pub const OFF_CODE: u8 = 0xFF;

/// A symbol of the tone vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Digit {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    Star,
    Pound,

    /// MF (R1) digits
    Mf0,
    Mf1,
    Mf2,
    Mf3,
    Mf4,
    Mf5,
    Mf6,
    Mf7,
    Mf8,
    Mf9,
    /// MF key pulse (start of digits)
    MfKp,
    /// MF start (end of digits)
    MfSt,
    MfStp,
    MfSt2p,
    /// 2600 Hz single-tone supervisory signal
    Supervisory,

    /// No symbol: padding, dropped pulse train
    Off,
    /// ~1000 Hz acknowledgement beep
    Beep,
    /// ~500 Hz acknowledgement beep
    BeepLow,
    /// C-E-G
    TuneAsc,
    /// G-E-C
    TuneDesc,
    /// C-G
    TuneAsc2,
    /// G-C
    TuneDesc2,
}

impl Digit {
    /// Plain dial digit for a numeric value 0..=9.
    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Digit::D0),
            1 => Some(Digit::D1),
            2 => Some(Digit::D2),
            3 => Some(Digit::D3),
            4 => Some(Digit::D4),
            5 => Some(Digit::D5),
            6 => Some(Digit::D6),
            7 => Some(Digit::D7),
            8 => Some(Digit::D8),
            9 => Some(Digit::D9),
            _ => None,
        }
    }

    /// Numeric value of a plain dial digit.
    pub const fn value(self) -> Option<u8> {
        match self {
            Digit::D0 => Some(0),
            Digit::D1 => Some(1),
            Digit::D2 => Some(2),
            Digit::D3 => Some(3),
            Digit::D4 => Some(4),
            Digit::D5 => Some(5),
            Digit::D6 => Some(6),
            Digit::D7 => Some(7),
            Digit::D8 => Some(8),
            Digit::D9 => Some(9),
            _ => None,
        }
    }

    /// Whether this symbol may be written to speed-dial memory.
    pub const fn is_storable(self) -> bool {
        self.storage_code().is_some()
    }

    /// Transient UI symbols (beeps and tunes).
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Digit::Beep
                | Digit::BeepLow
                | Digit::TuneAsc
                | Digit::TuneDesc
                | Digit::TuneAsc2
                | Digit::TuneDesc2
        )
    }

    /// Code of a storable symbol, `None` for OFF and control symbols.
    pub const fn storage_code(self) -> Option<u8> {
        let code = match self {
            Digit::D0 => 0,
            Digit::D1 => 1,
            Digit::D2 => 2,
            Digit::D3 => 3,
            Digit::D4 => 4,
            Digit::D5 => 5,
            Digit::D6 => 6,
            Digit::D7 => 7,
            Digit::D8 => 8,
            Digit::D9 => 9,
            Digit::Star => 10,
            Digit::Pound => 11,
            Digit::Mf0 => 16,
            Digit::Mf1 => 17,
            Digit::Mf2 => 18,
            Digit::Mf3 => 19,
            Digit::Mf4 => 20,
            Digit::Mf5 => 21,
            Digit::Mf6 => 22,
            Digit::Mf7 => 23,
            Digit::Mf8 => 24,
            Digit::Mf9 => 25,
            Digit::MfKp => 26,
            Digit::MfSt => 27,
            Digit::MfStp => 28,
            Digit::MfSt2p => 29,
            Digit::Supervisory => 32,
            Digit::Off
            | Digit::Beep
            | Digit::BeepLow
            | Digit::TuneAsc
            | Digit::TuneDesc
            | Digit::TuneAsc2
            | Digit::TuneDesc2 => return None,
        };
        Some(code)
    }

    /// Byte written to persistent storage.
    #[inline]
    pub const fn to_code(self) -> u8 {
        match self.storage_code() {
            Some(code) => code,
            None => OFF_CODE,
        }
    }

    /// Decode a persisted byte. Unknown bytes read back as `Off`.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0..=9 => match Digit::from_value(code) {
                Some(d) => d,
                None => Digit::Off,
            },
            10 => Digit::Star,
            11 => Digit::Pound,
            16 => Digit::Mf0,
            17 => Digit::Mf1,
            18 => Digit::Mf2,
            19 => Digit::Mf3,
            20 => Digit::Mf4,
            21 => Digit::Mf5,
            22 => Digit::Mf6,
            23 => Digit::Mf7,
            24 => Digit::Mf8,
            25 => Digit::Mf9,
            26 => Digit::MfKp,
            27 => Digit::MfSt,
            28 => Digit::MfStp,
            29 => Digit::MfSt2p,
            32 => Digit::Supervisory,
            _ => Digit::Off,
        }
    }

    /// Short display name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Digit::D0 => "0",
            Digit::D1 => "1",
            Digit::D2 => "2",
            Digit::D3 => "3",
            Digit::D4 => "4",
            Digit::D5 => "5",
            Digit::D6 => "6",
            Digit::D7 => "7",
            Digit::D8 => "8",
            Digit::D9 => "9",
            Digit::Star => "*",
            Digit::Pound => "#",
            Digit::Mf0 => "MF0",
            Digit::Mf1 => "MF1",
            Digit::Mf2 => "MF2",
            Digit::Mf3 => "MF3",
            Digit::Mf4 => "MF4",
            Digit::Mf5 => "MF5",
            Digit::Mf6 => "MF6",
            Digit::Mf7 => "MF7",
            Digit::Mf8 => "MF8",
            Digit::Mf9 => "MF9",
            Digit::MfKp => "KP",
            Digit::MfSt => "ST",
            Digit::MfStp => "STP",
            Digit::MfSt2p => "ST2P",
            Digit::Supervisory => "2600",
            Digit::Off => "OFF",
            Digit::Beep => "BEEP",
            Digit::BeepLow => "BEEP_LOW",
            Digit::TuneAsc => "TUNE_ASC",
            Digit::TuneDesc => "TUNE_DESC",
            Digit::TuneAsc2 => "TUNE_ASC2",
            Digit::TuneDesc2 => "TUNE_DESC2",
        }
    }
}

impl Default for Digit {
    fn default() -> Self {
        Digit::Off
    }
}

impl core::fmt::Display for Digit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
