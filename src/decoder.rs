//! Module: decoder
//!
//! Purpose: Turn dial-line transitions and the raw pulse count into digits.
//! This is the only place a pulse count becomes a `Digit`; everything
//! downstream matches on the closed enumeration.
//!
//! Safety: Safe. Reads interrupt-shared counters through `DialSignals`.

use crate::digit::Digit;
use crate::signals::DialSignals;

/// Largest valid pulse train.
pub const MAX_PULSES: u8 = 10;

/// How a valid pulse count (1..=10) maps to a digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialMapping {
    /// 1..9 pulses → 1..9, 10 → 0
    Standard,
    /// New Zealand style: n pulses → 10 - n (10 → 0)
    Reversed,
    /// Swedish style: n pulses → n - 1
    Offset,
}

impl DialMapping {
    /// Build-time default selected by the `reverse-dial` / `offset-dial`
    /// features.
    pub const fn from_features() -> Self {
        if cfg!(feature = "reverse-dial") {
            DialMapping::Reversed
        } else if cfg!(feature = "offset-dial") {
            DialMapping::Offset
        } else {
            DialMapping::Standard
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DialMapping::Standard => "standard",
            DialMapping::Reversed => "reversed",
            DialMapping::Offset => "offset",
        }
    }
}

impl Default for DialMapping {
    fn default() -> Self {
        Self::from_features()
    }
}

/// Validate a raw pulse count and map it to a digit.
///
/// Counts outside 1..=10 decode to `Digit::Off`.
pub const fn decode_pulses(count: u8, mapping: DialMapping) -> Digit {
    if count == 0 || count > MAX_PULSES {
        return Digit::Off;
    }
    let value = match mapping {
        DialMapping::Standard => count % 10,
        DialMapping::Reversed => 10 - count,
        DialMapping::Offset => count - 1,
    };
    match Digit::from_value(value) {
        Some(digit) => digit,
        None => Digit::Off,
    }
}

/// Dial line transition seen by `DialDecoder::observe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialEvent {
    /// Dial left rest; counting and dwell detection are armed.
    Started,
    /// Dial returned to rest. `digit` is `Off` for a dropped train.
    Finished { pulses: u8, digit: Digit },
}

/// Edge detector on the dial-active line.
pub struct DialDecoder<'a> {
    signals: &'a DialSignals,
    mapping: DialMapping,
    was_dialing: bool,
}

impl<'a> DialDecoder<'a> {
    pub const fn new(signals: &'a DialSignals, mapping: DialMapping) -> Self {
        Self {
            signals,
            mapping,
            was_dialing: false,
        }
    }

    /// Feed the current dial-line level; reports a transition, if any.
    pub fn observe(&mut self, dialing: bool) -> Option<DialEvent> {
        if dialing == self.was_dialing {
            return None;
        }
        self.was_dialing = dialing;

        if dialing {
            self.signals.begin_dial();
            Some(DialEvent::Started)
        } else {
            let pulses = self.signals.end_dial();
            Some(DialEvent::Finished {
                pulses,
                digit: decode_pulses(pulses, self.mapping),
            })
        }
    }

    #[inline]
    pub fn mapping(&self) -> DialMapping {
        self.mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_reports_transitions_once() {
        let signals = DialSignals::new(0);
        let mut decoder = DialDecoder::new(&signals, DialMapping::Standard);

        assert_eq!(decoder.observe(false), None);
        assert_eq!(decoder.observe(true), Some(DialEvent::Started));
        assert_eq!(decoder.observe(true), None);

        for t in 0..3 {
            signals.on_pulse_edge(t * 100);
        }
        assert_eq!(
            decoder.observe(false),
            Some(DialEvent::Finished { pulses: 3, digit: Digit::D3 })
        );
        assert_eq!(decoder.observe(false), None);
    }

    #[test]
    fn test_reversed_and_offset() {
        assert_eq!(decode_pulses(1, DialMapping::Reversed), Digit::D9);
        assert_eq!(decode_pulses(10, DialMapping::Reversed), Digit::D0);
        assert_eq!(decode_pulses(1, DialMapping::Offset), Digit::D0);
        assert_eq!(decode_pulses(10, DialMapping::Offset), Digit::D9);
    }
}
